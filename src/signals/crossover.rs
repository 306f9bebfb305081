// =============================================================================
// Moving-Average Crossover Classifier
// =============================================================================
//
// Looks only at the two most recent annotated bars (`prev`, `curr`).  The
// moving averages already summarise the longer history, so the rule is O(1)
// in the length of the sequence.  Rules are evaluated in priority order:
//
//   1. INSUFFICIENT_DATA  fewer than `min_history` bars (or fewer than 2)
//   2. BUY_CROSSOVER      prev.short <= prev.long  and  curr.short > curr.long
//   3. SELL_CROSSOVER     prev.short >= prev.long  and  curr.short < curr.long
//   4. UPTREND            curr.short > curr.long   and  curr.close > curr.short
//   5. DOWNTREND          curr.short < curr.long   and  curr.close < curr.short
//   6. NEUTRAL            anything else
//
// Comparisons against NaN are false, so a bar whose long average is still
// undefined can never take part in a crossover.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::AnnotatedBar;

/// History required by the default 7/21 profile.
pub const DEFAULT_MIN_HISTORY: usize = 21;

/// Discrete signal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    InsufficientData,
    BuyCrossover,
    SellCrossover,
    Uptrend,
    Downtrend,
    Neutral,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => write!(f, "INSUFFICIENT_DATA"),
            Self::BuyCrossover => write!(f, "BUY_CROSSOVER"),
            Self::SellCrossover => write!(f, "SELL_CROSSOVER"),
            Self::Uptrend => write!(f, "UPTREND"),
            Self::Downtrend => write!(f, "DOWNTREND"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Classifier output: the signal plus the last one-bar price change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub kind: SignalKind,
    /// `(curr.close - prev.close) / prev.close * 100`.  Informational only;
    /// `None` when there is no previous bar or its close is zero.
    pub price_change_pct: Option<f64>,
}

impl SignalReport {
    pub fn insufficient() -> Self {
        Self {
            kind: SignalKind::InsufficientData,
            price_change_pct: None,
        }
    }
}

impl fmt::Display for SignalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let change = match self.price_change_pct {
            Some(pct) => format!("{pct:+.2}%"),
            None => "n/a".to_string(),
        };
        match self.kind {
            SignalKind::InsufficientData => {
                write!(f, "Insufficient data for technical analysis")
            }
            SignalKind::BuyCrossover => {
                write!(f, "BUY signal: short MA crossed above long MA ({change})")
            }
            SignalKind::SellCrossover => {
                write!(f, "SELL signal: short MA crossed below long MA ({change})")
            }
            SignalKind::Uptrend => write!(f, "Uptrend: short MA above long MA ({change})"),
            SignalKind::Downtrend => write!(f, "Downtrend: short MA below long MA ({change})"),
            SignalKind::Neutral => write!(f, "No clear signal. Change: {change}"),
        }
    }
}

/// Classify `bars` (annotated with the 7/21 moving averages) using the
/// default history requirement of [`DEFAULT_MIN_HISTORY`] bars.
pub fn classify_signal(bars: &[AnnotatedBar]) -> SignalReport {
    classify_signal_with_min_history(bars, DEFAULT_MIN_HISTORY)
}

/// Classify `bars`, requiring at least `min_history` bars (never fewer
/// than two).
pub fn classify_signal_with_min_history(bars: &[AnnotatedBar], min_history: usize) -> SignalReport {
    let n = bars.len();
    if n < 2 || n < min_history {
        return SignalReport::insufficient();
    }
    let prev = &bars[n - 2];
    let curr = &bars[n - 1];

    SignalReport {
        kind: classify_pair(prev, curr),
        price_change_pct: price_change_pct(prev.close(), curr.close()),
    }
}

/// Apply rules 2-6 to a `(prev, curr)` pair.
pub fn classify_pair(prev: &AnnotatedBar, curr: &AnnotatedBar) -> SignalKind {
    if prev.sma_short <= prev.sma_long && curr.sma_short > curr.sma_long {
        SignalKind::BuyCrossover
    } else if prev.sma_short >= prev.sma_long && curr.sma_short < curr.sma_long {
        SignalKind::SellCrossover
    } else if curr.sma_short > curr.sma_long && curr.close() > curr.sma_short {
        SignalKind::Uptrend
    } else if curr.sma_short < curr.sma_long && curr.close() < curr.sma_short {
        SignalKind::Downtrend
    } else {
        SignalKind::Neutral
    }
}

fn price_change_pct(prev_close: f64, curr_close: f64) -> Option<f64> {
    if prev_close == 0.0 {
        return None;
    }
    Some((curr_close - prev_close) / prev_close * 100.0)
}
