// =============================================================================
// Error types
// =============================================================================

use thiserror::Error;

/// Errors raised while fetching or decoding bars from a market-data source.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, timeout, or an undecodable response body.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider reported an error in its payload (bad symbol, bad key).
    #[error("API error: {0}")]
    Api(String),

    /// The response body is not the JSON shape the provider documents.
    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A bar in the payload is missing a field or holds a non-numeric value.
    #[error("malformed bar at position {index}: {message}")]
    Parse { index: usize, message: String },

    /// The provider returned no bars for the symbol.
    #[error("no data for symbol {0}")]
    EmptySeries(String),

    /// A generated series would start outside the representable date range.
    #[error("{bars} bars at {interval_secs}s spacing do not fit the calendar")]
    TimeRange { bars: usize, interval_secs: i64 },
}

/// Invalid window settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} window must be at least 1")]
    ZeroWindow { name: &'static str },

    #[error("short moving-average window ({short}) must be below the long window ({long})")]
    InvertedWindows { short: usize, long: usize },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}
