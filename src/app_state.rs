// =============================================================================
// Central Application State
// =============================================================================
//
// Shared across request handlers via `Arc<AppState>`.
//
// Thread safety:
//   - parking_lot::RwLock for the per-symbol history cache.
//   - The bar source is an `Arc<dyn BarSource>` and manages its own state.
//   - Indicator and signal computation happen on owned copies; nothing in the
//     analytics path touches shared mutable state.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::ProviderError;
use crate::market_data::{BarSource, SimulatedFeed};
use crate::runtime_config::AppConfig;
use crate::types::PriceBar;

struct CachedHistory {
    bars: Arc<Vec<PriceBar>>,
    fetched_at: Instant,
}

/// Central application state shared across all handlers.
pub struct AppState {
    pub config: AppConfig,
    source: Arc<dyn BarSource>,
    realtime: SimulatedFeed,
    cache: RwLock<HashMap<String, CachedHistory>>,
    cache_ttl: Duration,
}

impl AppState {
    pub fn new(config: AppConfig, source: Arc<dyn BarSource>) -> Self {
        let realtime = SimulatedFeed::new(config.realtime_bars, config.realtime_interval_secs);
        let cache_ttl = Duration::from_secs(config.cache_ttl_secs);
        Self {
            config,
            source,
            realtime,
            cache: RwLock::new(HashMap::new()),
            cache_ttl,
        }
    }

    /// History for `symbol`, served from cache while it is younger than the
    /// configured TTL.
    pub async fn history(&self, symbol: &str) -> Result<Arc<Vec<PriceBar>>, ProviderError> {
        let key = symbol.trim().to_uppercase();

        if let Some(bars) = self.cached(&key) {
            debug!(symbol = %key, "history cache hit");
            return Ok(bars);
        }

        // Lock is not held across the fetch.
        let bars = Arc::new(self.source.fetch_history(&key).await?);
        if bars.is_empty() {
            return Err(ProviderError::EmptySeries(key));
        }

        if !self.cache_ttl.is_zero() {
            let ttl = self.cache_ttl;
            let mut cache = self.cache.write();
            cache.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
            cache.insert(
                key,
                CachedHistory {
                    bars: Arc::clone(&bars),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(bars)
    }

    /// A freshly simulated realtime series.
    pub fn realtime(&self) -> Result<Vec<PriceBar>, ProviderError> {
        self.realtime.generate()
    }

    fn cached(&self, key: &str) -> Option<Arc<Vec<PriceBar>>> {
        let cache = self.cache.read();
        let entry = cache.get(key)?;
        if entry.fetched_at.elapsed() < self.cache_ttl {
            Some(Arc::clone(&entry.bars))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        len: usize,
    }

    #[async_trait]
    impl BarSource for CountingSource {
        async fn fetch_history(&self, _symbol: &str) -> Result<Vec<PriceBar>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let t = Utc.timestamp_opt(0, 0).unwrap();
            Ok((0..self.len)
                .map(|i| PriceBar {
                    timestamp: t + chrono::Duration::days(i as i64),
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    volume: 0.0,
                })
                .collect())
        }
    }

    fn state(ttl: u64, len: usize) -> (AppState, Arc<CountingSource>) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            len,
        });
        let config = AppConfig {
            cache_ttl_secs: ttl,
            ..AppConfig::default()
        };
        (AppState::new(config, source.clone()), source)
    }

    #[tokio::test]
    async fn history_is_cached_within_ttl() {
        let (state, source) = state(60, 5);
        state.history("aapl").await.unwrap();
        let bars = state.history("AAPL").await.unwrap();
        assert_eq!(bars.len(), 5);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let (state, source) = state(0, 5);
        state.history("AAPL").await.unwrap();
        state.history("AAPL").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_history_is_an_error() {
        let (state, _) = state(60, 0);
        assert!(matches!(
            state.history("AAPL").await,
            Err(ProviderError::EmptySeries(_))
        ));
    }

    #[tokio::test]
    async fn expired_entries_are_pruned_on_insert() {
        let (mut state, _) = state(60, 5);
        state.cache_ttl = Duration::from_millis(20);

        state.history("AAPL").await.unwrap();
        std::thread::sleep(Duration::from_millis(40));
        state.history("MSFT").await.unwrap();

        let cache = state.cache.read();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("MSFT"));
    }

    #[test]
    fn realtime_uses_configured_length() {
        let (state, _) = state(60, 1);
        assert_eq!(state.realtime().unwrap().len(), 30);
    }
}
