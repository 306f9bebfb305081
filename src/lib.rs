// =============================================================================
// Stock Radar — price analytics library
// =============================================================================
//
// Raw bars -> annotated bars -> signal.  The analytics core (`indicators`,
// `signals`) is synchronous and pure; `market_data`, `app_state` and `api`
// are the service shell around it.

pub mod api;
pub mod app_state;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod runtime_config;
pub mod signals;
pub mod types;

pub use error::{ConfigError, ProviderError};
pub use indicators::{compute_indicators, IndicatorConfig};
pub use signals::{classify_signal, SignalConfig, SignalKind, SignalReport};
pub use types::{AnnotatedBar, PriceBar};
