// =============================================================================
// Relative Strength Index (RSI) — unadjusted exponential smoothing
// =============================================================================
//
// Step 1 — Price deltas: d_i = close_i - close_{i-1}   (undefined at i = 0).
// Step 2 — Split into gain g_i = max(d_i, 0) and loss l_i = max(-d_i, 0).
// Step 3 — Smooth both with an EWMA, alpha = 1 / window, *not* bias-adjusted:
//            ewma_1 = x_1                       (seed = first defined value)
//            ewma_i = alpha * x_i + (1 - alpha) * ewma_{i-1}
// Step 4 — RS  = ewma_gain / ewma_loss
//          RSI = 100 - 100 / (1 + RS)
//
// A zero smoothed loss makes RS = +inf and RSI exactly 100.  That falls out
// of IEEE arithmetic and is kept as is.  A zero gain *and* zero loss (flat
// prices since the seed) is 0 / 0 and stays NaN.
// =============================================================================

/// Exponentially weighted moving average without bias adjustment.
#[derive(Debug, Clone, Copy)]
struct Ewma {
    alpha: f64,
    value: Option<f64>,
}

impl Ewma {
    fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    fn push(&mut self, x: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
            None => x,
        };
        self.value = Some(next);
        next
    }
}

/// Compute the RSI series for `closes` over `window`, aligned one-to-one with
/// the input.
///
/// # Edge cases
/// - `window == 0` => all NaN
/// - `closes.len() < window` => all NaN (not enough history for the window)
/// - index 0 is always NaN (no previous close)
///
/// The output is not prefix-stable below `window` bars: a series shorter than
/// the window is all NaN, while the same bars followed by enough history get
/// values from index 1 onward.  From `window` bars up, `out[i]` depends only on
/// `closes[..=i]`.
pub fn calculate_rsi(closes: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if window == 0 || closes.len() < window {
        return out;
    }

    let alpha = 1.0 / window as f64;
    let mut avg_gain = Ewma::new(alpha);
    let mut avg_loss = Ewma::new(alpha);

    for (i, pair) in closes.windows(2).enumerate() {
        let delta = pair[1] - pair[0];
        let gain = avg_gain.push(delta.max(0.0));
        let loss = avg_loss.push((-delta).max(0.0));
        out[i + 1] = rsi_from_averages(gain, loss);
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
