// =============================================================================
// Signals Module
// =============================================================================
//
// Turns annotated bars into a single discrete trading signal.  The classifier
// is stateless: it reads the last two bars and nothing else.

pub mod crossover;

pub use crossover::{
    classify_pair, classify_signal, classify_signal_with_min_history, SignalKind, SignalReport,
    DEFAULT_MIN_HISTORY,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::indicators::{compute_indicators, IndicatorConfig};
use crate::types::PriceBar;

fn default_short_window() -> usize {
    7
}

fn default_long_window() -> usize {
    21
}

fn default_min_history() -> usize {
    DEFAULT_MIN_HISTORY
}

/// Moving-average profile used for signal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    #[serde(default = "default_short_window")]
    pub short_window: usize,

    #[serde(default = "default_long_window")]
    pub long_window: usize,

    /// Bars required before any classification other than INSUFFICIENT_DATA.
    #[serde(default = "default_min_history")]
    pub min_history: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
            min_history: default_min_history(),
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_window == 0 {
            return Err(ConfigError::ZeroWindow { name: "signal short" });
        }
        if self.short_window >= self.long_window {
            return Err(ConfigError::InvertedWindows {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }

    /// Indicator settings that populate `sma_short` / `sma_long` with this
    /// profile's windows.
    pub fn indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig::with_sma_windows(self.short_window, self.long_window)
    }
}

/// Annotate `bars` with the signal profile's moving averages, then classify.
pub fn evaluate(bars: &[PriceBar], config: &SignalConfig) -> SignalReport {
    if bars.len() < config.min_history.max(2) {
        return SignalReport::insufficient();
    }
    let annotated = compute_indicators(bars, &config.indicator_config());
    classify_signal_with_min_history(&annotated, config.min_history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                timestamp: t0 + Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn five_bars_are_insufficient() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(
            evaluate(&bars, &SignalConfig::default()).kind,
            SignalKind::InsufficientData
        );
    }

    #[test]
    fn steady_rise_is_uptrend() {
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let report = evaluate(&bars_from_closes(&closes), &SignalConfig::default());
        assert_eq!(report.kind, SignalKind::Uptrend);
        assert!((report.price_change_pct.unwrap() - 100.0 / 39.0).abs() < 1e-9);
    }

    #[test]
    fn steady_fall_is_downtrend() {
        let closes: Vec<f64> = (1..=40).rev().map(|x| x as f64).collect();
        let report = evaluate(&bars_from_closes(&closes), &SignalConfig::default());
        assert_eq!(report.kind, SignalKind::Downtrend);
    }

    #[test]
    fn flat_market_is_neutral() {
        let report = evaluate(&bars_from_closes(&[50.0; 30]), &SignalConfig::default());
        assert_eq!(report.kind, SignalKind::Neutral);
        assert_eq!(report.price_change_pct, Some(0.0));
    }

    #[test]
    fn jump_then_crash_flips_buy_to_sell() {
        let mut closes = vec![100.0; 25];
        closes.push(110.0);
        let cfg = SignalConfig::default();

        // Flat averages are equal, the jump lifts the 7-bar average faster.
        assert_eq!(evaluate(&bars_from_closes(&closes), &cfg).kind, SignalKind::BuyCrossover);

        // 7-bar: 660/7 = 94.3,  21-bar: 2060/21 = 98.1
        closes.push(50.0);
        assert_eq!(evaluate(&bars_from_closes(&closes), &cfg).kind, SignalKind::SellCrossover);
    }

    #[test]
    fn validate_rejects_inverted_profile() {
        assert!(SignalConfig::default().validate().is_ok());
        let cfg = SignalConfig {
            short_window: 21,
            long_window: 7,
            min_history: 21,
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvertedWindows { short: 21, long: 7 })
        );
    }

    #[test]
    fn indicator_config_carries_signal_windows() {
        let cfg = SignalConfig::default().indicator_config();
        assert_eq!(cfg.sma_short_window, 7);
        assert_eq!(cfg.sma_long_window, 21);
        assert_eq!(cfg.atr_window, 14);
    }
}
