// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_i = mean(close[i - w + 1 ..= i])      for i >= w - 1
//
// Earlier indices are undefined (NaN).
// =============================================================================

use super::rolling::rolling_mean;

/// Compute the SMA series of `closes` over `window`, aligned one-to-one with
/// the input.
pub fn calculate_sma(closes: &[f64], window: usize) -> Vec<f64> {
    rolling_mean(closes, window)
}
