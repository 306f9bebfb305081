// =============================================================================
// Shared types used across Stock Radar
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV observation for a fixed time interval.
///
/// Sequences of bars are ordered by strictly ascending `timestamp`.  The
/// market-data layer guarantees that ordering; the indicator engine neither
/// re-sorts nor de-duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// A [`PriceBar`] plus the rolling statistics computed up to (and including)
/// its own index.
///
/// Every computed field is `NaN` until its window has enough history.  NaN
/// serialises as JSON `null`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnnotatedBar {
    #[serde(flatten)]
    pub bar: PriceBar,
    pub sma_short: f64,
    pub sma_long: f64,
    pub atr: f64,
    pub rsi: f64,
    pub volatility: f64,
}

impl AnnotatedBar {
    /// Wrap a bar with every indicator undefined.
    pub fn undefined(bar: PriceBar) -> Self {
        Self {
            bar,
            sma_short: f64::NAN,
            sma_long: f64::NAN,
            atr: f64::NAN,
            rsi: f64::NAN,
            volatility: f64::NAN,
        }
    }

    #[inline]
    pub fn close(&self) -> f64 {
        self.bar.close
    }
}
