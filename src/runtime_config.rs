// =============================================================================
// Runtime Configuration — JSON settings with atomic save
// =============================================================================
//
// Every tunable lives here: listen address, watch list, indicator windows,
// signal profile, provider endpoint and cache lifetime.  All fields carry
// `#[serde(default)]` so that adding new fields never breaks loading an older
// config file.
//
// Secrets (the provider API key) are read from the environment and are never
// part of this struct.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::indicators::IndicatorConfig;
use crate::market_data::SimulatedFeed;
use crate::signals::SignalConfig;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_symbols() -> Vec<String> {
    vec![
        "AAPL".to_string(),
        "MSFT".to_string(),
        "BTC".to_string(),
        "USD/BRL".to_string(),
    ]
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_realtime_bars() -> usize {
    30
}

fn default_realtime_interval_secs() -> i64 {
    60
}

fn default_base_url() -> String {
    "https://api.twelvedata.com".to_string()
}

fn default_interval() -> String {
    "1day".to_string()
}

fn default_outputsize() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    10
}

// =============================================================================
// ProviderSettings
// =============================================================================

/// Where and how historical bars are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bar interval, in the provider's notation (`1min`, `1h`, `1day`, ...).
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Number of bars requested per symbol.
    #[serde(default = "default_outputsize")]
    pub outputsize: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            interval: default_interval(),
            outputsize: default_outputsize(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration for the Stock Radar service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Symbols offered on the dashboard watch list.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Windows for the indicator endpoints.
    #[serde(default)]
    pub indicators: IndicatorConfig,

    /// Moving-average profile for signal classification.
    #[serde(default)]
    pub signal: SignalConfig,

    #[serde(default)]
    pub provider: ProviderSettings,

    /// How long a fetched history is reused before hitting the provider again.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Length of the simulated realtime series.
    #[serde(default = "default_realtime_bars")]
    pub realtime_bars: usize,

    /// Spacing of the simulated realtime bars.
    #[serde(default = "default_realtime_interval_secs")]
    pub realtime_interval_secs: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            symbols: default_symbols(),
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::default(),
            provider: ProviderSettings::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            realtime_bars: default_realtime_bars(),
            realtime_interval_secs: default_realtime_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path` and validate its windows.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid settings in {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            "config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write (write to
    /// `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.indicators.validate()?;
        self.signal.validate()?;

        if self.realtime_bars > SimulatedFeed::MAX_BARS {
            return Err(ConfigError::OutOfRange {
                name: "realtime_bars",
                value: i64::try_from(self.realtime_bars).unwrap_or(i64::MAX),
                min: 0,
                max: SimulatedFeed::MAX_BARS as i64,
            }
            .into());
        }
        if !(1..=SimulatedFeed::MAX_INTERVAL_SECS).contains(&self.realtime_interval_secs) {
            return Err(ConfigError::OutOfRange {
                name: "realtime_interval_secs",
                value: self.realtime_interval_secs,
                min: 1,
                max: SimulatedFeed::MAX_INTERVAL_SECS,
            }
            .into());
        }
        Ok(())
    }

    /// Apply `STOCK_RADAR_BIND` and `STOCK_RADAR_SYMBOLS` overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("STOCK_RADAR_BIND") {
            if !addr.trim().is_empty() {
                self.bind_addr = addr.trim().to_string();
            }
        }
        if let Ok(syms) = std::env::var("STOCK_RADAR_SYMBOLS") {
            self.set_symbols_from_csv(&syms);
        }
    }

    /// Replace the watch list from a comma-separated string.  Blank input
    /// leaves the current list untouched.
    pub fn set_symbols_from_csv(&mut self, csv: &str) {
        let symbols: Vec<String> = csv
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !symbols.is_empty() {
            self.symbols = symbols;
        }
    }
}
