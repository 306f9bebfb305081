// =============================================================================
// Average True Range (ATR) — simple rolling mean of True Range
// =============================================================================
//
// True Range (TR) for each bar:
//   TR_0 = H_0 - L_0                                   (no previous close)
//   TR_i = max(H_i - L_i, |H_i - C_{i-1}|, |L_i - C_{i-1}|)
//
// ATR_i is the plain mean of the last `window` TR values, so the first
// defined ATR sits at index `window - 1`.
//
// Default window: 14
// =============================================================================

use super::rolling::RollingMean;
use crate::types::PriceBar;

/// Compute the True Range series, one value per bar.
pub fn true_range(bars: &[PriceBar]) -> Vec<f64> {
    let mut prev_close: Option<f64> = None;
    bars.iter()
        .map(|bar| {
            let hl = bar.high - bar.low;
            let tr = match prev_close {
                Some(pc) => hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
                None => hl,
            };
            prev_close = Some(bar.close);
            tr
        })
        .collect()
}

/// Compute the ATR series over `window`, aligned one-to-one with `bars`.
pub fn calculate_atr(bars: &[PriceBar], window: usize) -> Vec<f64> {
    let mut mean = RollingMean::new(window);
    true_range(bars).into_iter().map(|tr| mean.push(tr)).collect()
}
