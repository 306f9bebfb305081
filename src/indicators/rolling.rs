// =============================================================================
// Rolling-window accumulators
// =============================================================================
//
// Single-pass building blocks shared by the indicator families.  Each
// accumulator owns a ring buffer of the last `window` inputs and updates its
// statistic in O(1) per step:
//
//   RollingMean     — Kahan-compensated running sum / window
//   RollingVariance — Welford add/remove update, sample variance (n - 1)
//
// A NaN input marks "not yet defined" (e.g. the first return of a series).
// It clears the window, so the statistic stays NaN until `window` consecutive
// defined values have been pushed again.
// =============================================================================

use std::collections::VecDeque;

/// Rolling arithmetic mean over a fixed window.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
    compensation: f64,
}

impl RollingMean {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::with_capacity(window),
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// Push the next value and return the mean of the trailing window, or
    /// NaN while fewer than `window` defined values are buffered.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.window == 0 {
            return f64::NAN;
        }
        if value.is_nan() {
            self.reset();
            return f64::NAN;
        }

        if self.buf.len() == self.window {
            if let Some(old) = self.buf.pop_front() {
                self.add(-old);
            }
        }
        self.buf.push_back(value);
        self.add(value);

        if self.buf.len() < self.window {
            f64::NAN
        } else {
            self.sum / self.window as f64
        }
    }

    fn add(&mut self, x: f64) {
        let y = x - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.sum = 0.0;
        self.compensation = 0.0;
    }
}

/// Rolling sample variance (Bessel-corrected) over a fixed window.
#[derive(Debug, Clone)]
pub struct RollingVariance {
    window: usize,
    buf: VecDeque<f64>,
    mean: f64,
    m2: f64,
}

impl RollingVariance {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::with_capacity(window),
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Push the next value and return the sample variance of the trailing
    /// window.  NaN while the window is not full, and always NaN for
    /// `window < 2` (one observation has no sample variance).
    pub fn push(&mut self, value: f64) -> f64 {
        if self.window == 0 {
            return f64::NAN;
        }
        if value.is_nan() {
            self.buf.clear();
            self.mean = 0.0;
            self.m2 = 0.0;
            return f64::NAN;
        }

        if self.buf.len() == self.window {
            if let Some(old) = self.buf.pop_front() {
                self.remove(old);
            }
        }
        self.buf.push_back(value);
        self.insert(value);

        let n = self.buf.len();
        if n < self.window || n < 2 {
            return f64::NAN;
        }
        // Cancellation can leave m2 a hair below zero on flat windows.
        self.m2.max(0.0) / (n - 1) as f64
    }

    fn insert(&mut self, x: f64) {
        let n = self.buf.len() as f64;
        let delta = x - self.mean;
        self.mean += delta / n;
        self.m2 += delta * (x - self.mean);
    }

    fn remove(&mut self, x: f64) {
        // Called after pop_front, so buf.len() is already the reduced count.
        let n = self.buf.len();
        if n == 0 {
            self.mean = 0.0;
            self.m2 = 0.0;
            return;
        }
        let delta = x - self.mean;
        self.mean -= delta / n as f64;
        self.m2 -= delta * (x - self.mean);
    }
}

/// Apply a fresh [`RollingMean`] over `values`, one output per input.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut acc = RollingMean::new(window);
    values.iter().map(|&v| acc.push(v)).collect()
}

/// Apply a fresh [`RollingVariance`] over `values` and take the square root.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut acc = RollingVariance::new(window);
    values.iter().map(|&v| acc.push(v).sqrt()).collect()
}
