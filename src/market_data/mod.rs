// =============================================================================
// Market Data Module
// =============================================================================
//
// Sources of ordered price bars.  Every implementation returns bars in
// strictly ascending timestamp order; the indicator engine relies on it.

pub mod simulated;
pub mod twelve_data;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::PriceBar;

pub use simulated::SimulatedFeed;
pub use twelve_data::TwelveDataProvider;

/// A provider of historical bars for a symbol.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Fetch the available history for `symbol`, oldest first.
    async fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceBar>, ProviderError>;
}
