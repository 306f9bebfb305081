// =============================================================================
// Simulated realtime feed
// =============================================================================
//
// Produces a short run of bars ending "now", for dashboards that want a live
// looking series without a market-data subscription:
//
//   close_t = base + cumsum(N(0, 1))          base = 100 + 5 * N(0, 1)
//   open_t  = close_t + 0.2 * N(0, 1)
//   high_t  = max(open_t, close_t) + 0.3 * U[0, 1)
//   low_t   = min(open_t, close_t) - 0.3 * U[0, 1)
// =============================================================================

use std::f64::consts::TAU;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::BarSource;
use crate::error::ProviderError;
use crate::types::PriceBar;

/// Random-walk bar generator.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedFeed {
    bars: usize,
    interval: Duration,
}

impl SimulatedFeed {
    /// Longest accepted bar spacing (one day).
    pub const MAX_INTERVAL_SECS: i64 = 86_400;
    /// Longest accepted series.
    pub const MAX_BARS: usize = 10_000;

    pub fn new(bars: usize, interval_secs: i64) -> Self {
        let secs = interval_secs.clamp(1, Self::MAX_INTERVAL_SECS);
        Self {
            bars,
            interval: Duration::seconds(secs),
        }
    }

    /// Generate `self.bars` bars whose last timestamp is `end`.
    ///
    /// Fails when the first bar would fall outside the representable date
    /// range.
    pub fn generate_with<R: Rng>(
        &self,
        rng: &mut R,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let out_of_range = || ProviderError::TimeRange {
            bars: self.bars,
            interval_secs: self.interval.num_seconds(),
        };
        let steps = i32::try_from(self.bars.saturating_sub(1)).map_err(|_| out_of_range())?;
        let start = self
            .interval
            .checked_mul(steps)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(out_of_range)?;

        let base = 100.0 + standard_normal(rng) * 5.0;
        let mut close = base;

        let bars = (0..self.bars)
            .map(|i| {
                close += standard_normal(rng);
                let open = close + standard_normal(rng) * 0.2;
                let high = open.max(close) + rng.random::<f64>() * 0.3;
                let low = open.min(close) - rng.random::<f64>() * 0.3;
                PriceBar {
                    // i <= steps, so this stays within [start, end].
                    timestamp: start + self.interval * i as i32,
                    open,
                    high,
                    low,
                    close,
                    volume: 0.0,
                }
            })
            .collect();
        Ok(bars)
    }

    /// Generate a fresh series ending at the current time.
    pub fn generate(&self) -> Result<Vec<PriceBar>, ProviderError> {
        self.generate_with(&mut rand::rng(), Utc::now())
    }
}

impl Default for SimulatedFeed {
    fn default() -> Self {
        Self::new(30, 60)
    }
}

#[async_trait]
impl BarSource for SimulatedFeed {
    async fn fetch_history(&self, _symbol: &str) -> Result<Vec<PriceBar>, ProviderError> {
        self.generate()
    }
}

/// Box-Muller transform over two uniform draws.
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // 1 - U keeps the log argument in (0, 1].
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}
