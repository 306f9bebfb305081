// =============================================================================
// Realized Volatility — annualised rolling std of simple returns
// =============================================================================
//
//   r_i   = close_i / close_{i-1} - 1          (undefined at i = 0)
//   vol_i = sample_std(r[i - w + 1 ..= i]) * sqrt(252)
//
// The first defined value needs `w` returns, i.e. `w + 1` bars.
// =============================================================================

use super::rolling::rolling_std;

/// Trading days per year used to annualise daily-bar volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simple one-bar returns, NaN at index 0.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(closes.windows(2).map(|w| w[1] / w[0] - 1.0));
    out
}

/// Compute annualised rolling volatility over `window` returns, aligned
/// one-to-one with `closes`.
pub fn calculate_volatility(closes: &[f64], window: usize) -> Vec<f64> {
    let annualise = TRADING_DAYS_PER_YEAR.sqrt();
    rolling_std(&simple_returns(closes), window)
        .into_iter()
        .map(|sd| sd * annualise)
        .collect()
}
