// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free rolling-window indicators over an ordered sequence
// of price bars.  Every series returned here is aligned one-to-one with its
// input; indices without enough history hold NaN instead of being dropped, so
// callers can zip the series straight back onto the bars.
//
// Nothing in this module holds state between calls, so it is safe to call
// from any number of threads on independently owned inputs.

pub mod atr;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod volatility;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ConfigError;
use crate::types::{AnnotatedBar, PriceBar};

fn default_sma_short_window() -> usize {
    20
}

fn default_sma_long_window() -> usize {
    50
}

fn default_atr_window() -> usize {
    14
}

fn default_rsi_window() -> usize {
    14
}

fn default_vol_window() -> usize {
    21
}

/// Window lengths for each indicator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_sma_short_window")]
    pub sma_short_window: usize,

    #[serde(default = "default_sma_long_window")]
    pub sma_long_window: usize,

    #[serde(default = "default_atr_window")]
    pub atr_window: usize,

    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    /// Number of returns in the volatility window (needs one extra bar).
    #[serde(default = "default_vol_window")]
    pub vol_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_short_window: default_sma_short_window(),
            sma_long_window: default_sma_long_window(),
            atr_window: default_atr_window(),
            rsi_window: default_rsi_window(),
            vol_window: default_vol_window(),
        }
    }
}

impl IndicatorConfig {
    /// Same as the default profile but with the moving averages replaced.
    pub fn with_sma_windows(short: usize, long: usize) -> Self {
        Self {
            sma_short_window: short,
            sma_long_window: long,
            ..Self::default()
        }
    }

    /// Reject zero-length windows.
    ///
    /// A zero window is not an error for [`compute_indicators`] itself (the
    /// field just stays NaN); this check is for configuration boundaries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("sma_short", self.sma_short_window),
            ("sma_long", self.sma_long_window),
            ("atr", self.atr_window),
            ("rsi", self.rsi_window),
            ("volatility", self.vol_window),
        ];
        for (name, w) in windows {
            if w == 0 {
                return Err(ConfigError::ZeroWindow { name });
            }
        }
        Ok(())
    }
}

/// Annotate `bars` with SMA (short and long), ATR, RSI and volatility.
///
/// The output has exactly one entry per input bar, in the same order.  An
/// empty input yields an empty output.  The input is never modified.
pub fn compute_indicators(bars: &[PriceBar], config: &IndicatorConfig) -> Vec<AnnotatedBar> {
    if bars.is_empty() {
        return Vec::new();
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let sma_short = sma::calculate_sma(&closes, config.sma_short_window);
    let sma_long = sma::calculate_sma(&closes, config.sma_long_window);
    let atr = atr::calculate_atr(bars, config.atr_window);
    let rsi = rsi::calculate_rsi(&closes, config.rsi_window);
    let volatility = volatility::calculate_volatility(&closes, config.vol_window);

    let out: Vec<AnnotatedBar> = bars
        .iter()
        .enumerate()
        .map(|(i, &bar)| AnnotatedBar {
            bar,
            sma_short: sma_short[i],
            sma_long: sma_long[i],
            atr: atr[i],
            rsi: rsi[i],
            volatility: volatility[i],
        })
        .collect();

    trace!(
        bars = out.len(),
        sma_short_window = config.sma_short_window,
        sma_long_window = config.sma_long_window,
        "indicators computed"
    );

    out
}
