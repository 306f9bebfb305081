// =============================================================================
// Twelve Data REST client — historical time series
// =============================================================================
//
// GET {base}/time_series?symbol=..&interval=..&outputsize=..&apikey=..
//
// The payload lists bars newest-first with every number encoded as a string.
// Bars are parsed to f64 and reversed to ascending time before they leave
// this module.  Forex pairs carry no `volume`; it is reported as 0.
//
// SECURITY: the API key is never logged.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::BarSource;
use crate::error::ProviderError;
use crate::runtime_config::ProviderSettings;
use crate::types::PriceBar;

/// Map user-facing tickers to the symbol Twelve Data expects.
pub fn resolve_symbol(symbol: &str) -> String {
    match symbol.trim().to_uppercase().as_str() {
        "BTC" => "BTC/USD".to_string(),
        "ETH" => "ETH/USD".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Option<Vec<RawBar>>,
}

#[derive(Debug, Deserialize)]
struct RawBar {
    datetime: Option<String>,
    open: Option<String>,
    high: Option<String>,
    low: Option<String>,
    close: Option<String>,
    #[serde(default)]
    volume: Option<String>,
}

/// Decode a `time_series` response body into ascending bars.
pub fn parse_time_series(symbol: &str, body: &str) -> Result<Vec<PriceBar>, ProviderError> {
    let resp: TimeSeriesResponse = serde_json::from_str(body)?;

    if resp.status.as_deref() == Some("error") {
        return Err(ProviderError::Api(
            resp.message.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    let values = match resp.values {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ProviderError::EmptySeries(symbol.to_string())),
    };

    // Positions in errors refer to the provider's newest-first order.
    let mut bars = values
        .into_iter()
        .enumerate()
        .map(|(index, raw)| raw.into_bar(index))
        .collect::<Result<Vec<_>, _>>()?;
    bars.reverse();
    Ok(bars)
}

impl RawBar {
    fn into_bar(self, index: usize) -> Result<PriceBar, ProviderError> {
        let datetime = required(self.datetime, "datetime", index)?;
        Ok(PriceBar {
            timestamp: parse_datetime(&datetime).ok_or_else(|| ProviderError::Parse {
                index,
                message: format!("unrecognised datetime {datetime:?}"),
            })?,
            open: number(self.open, "open", index)?,
            high: number(self.high, "high", index)?,
            low: number(self.low, "low", index)?,
            close: number(self.close, "close", index)?,
            volume: match self.volume {
                Some(v) => parse_number(&v, "volume", index)?,
                None => 0.0,
            },
        })
    }
}

fn required(value: Option<String>, field: &str, index: usize) -> Result<String, ProviderError> {
    value.ok_or_else(|| ProviderError::Parse {
        index,
        message: format!("missing field `{field}`"),
    })
}

fn number(value: Option<String>, field: &str, index: usize) -> Result<f64, ProviderError> {
    parse_number(&required(value, field, index)?, field, index)
}

fn parse_number(raw: &str, field: &str, index: usize) -> Result<f64, ProviderError> {
    raw.trim().parse::<f64>().map_err(|_| ProviderError::Parse {
        index,
        message: format!("field `{field}` is not a number: {raw:?}"),
    })
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Historical bar source backed by the Twelve Data REST API.
#[derive(Clone)]
pub struct TwelveDataProvider {
    api_key: String,
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl TwelveDataProvider {
    pub fn new(api_key: impl Into<String>, settings: ProviderSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        debug!(base_url = %settings.base_url, "TwelveDataProvider initialised");

        Ok(Self {
            api_key: api_key.into(),
            settings,
            client,
        })
    }
}

#[async_trait]
impl BarSource for TwelveDataProvider {
    #[instrument(skip(self), name = "twelve_data::fetch_history")]
    async fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceBar>, ProviderError> {
        let resolved = resolve_symbol(symbol);
        let url = format!("{}/time_series", self.settings.base_url.trim_end_matches('/'));
        let outputsize = self.settings.outputsize.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", resolved.as_str()),
                ("interval", self.settings.interval.as_str()),
                ("outputsize", outputsize.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bars = parse_time_series(&resolved, &body)?;
        debug!(symbol = %resolved, bars = bars.len(), "time series retrieved");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DAILY: &str = r#"{
        "meta": {"symbol": "AAPL", "interval": "1day"},
        "values": [
            {"datetime": "2024-01-04", "open": "182.15", "high": "183.09", "low": "180.88", "close": "181.91", "volume": "71983600"},
            {"datetime": "2024-01-03", "open": "184.22", "high": "185.88", "low": "183.43", "close": "184.25", "volume": "58414500"},
            {"datetime": "2024-01-02", "open": "187.15", "high": "188.44", "low": "183.89", "close": "185.64", "volume": "82488700"}
        ],
        "status": "ok"
    }"#;

    #[test]
    fn parses_and_reverses_to_ascending() {
        let bars = parse_time_series("AAPL", DAILY).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(
            bars[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(bars[0].close, 185.64);
        assert_eq!(bars[2].close, 181.91);
        assert_eq!(bars[2].volume, 71_983_600.0);
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn intraday_datetimes_and_missing_volume() {
        let body = r#"{"values": [
            {"datetime": "2024-05-10 15:31:00", "open": "5.10", "high": "5.12", "low": "5.09", "close": "5.11"},
            {"datetime": "2024-05-10 15:30:00", "open": "5.08", "high": "5.11", "low": "5.07", "close": "5.10"}
        ], "status": "ok"}"#;
        let bars = parse_time_series("USD/BRL", body).unwrap();
        assert_eq!(
            bars[0].timestamp,
            Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap()
        );
        assert!(bars.iter().all(|b| b.volume == 0.0));
    }

    #[test]
    fn api_error_payload() {
        let body = r#"{"code": 400, "message": "**symbol** not found: FOO", "status": "error"}"#;
        match parse_time_series("FOO", body) {
            Err(ProviderError::Api(msg)) => assert!(msg.contains("not found")),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn empty_values_is_empty_series() {
        let body = r#"{"values": [], "status": "ok"}"#;
        assert!(matches!(
            parse_time_series("AAPL", body),
            Err(ProviderError::EmptySeries(s)) if s == "AAPL"
        ));
        assert!(matches!(
            parse_time_series("AAPL", r#"{"status": "ok"}"#),
            Err(ProviderError::EmptySeries(_))
        ));
    }

    #[test]
    fn missing_close_is_reported_with_position() {
        let body = r#"{"values": [
            {"datetime": "2024-01-02", "open": "1", "high": "2", "low": "0.5"}
        ]}"#;
        match parse_time_series("AAPL", body) {
            Err(ProviderError::Parse { index, message }) => {
                assert_eq!(index, 0);
                assert!(message.contains("close"));
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let body = r#"{"values": [
            {"datetime": "2024-01-02", "open": "1", "high": "abc", "low": "0.5", "close": "1"}
        ]}"#;
        assert!(matches!(
            parse_time_series("AAPL", body),
            Err(ProviderError::Parse { .. })
        ));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        assert!(matches!(
            parse_time_series("AAPL", "<html>"),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn symbol_aliases() {
        assert_eq!(resolve_symbol("BTC"), "BTC/USD");
        assert_eq!(resolve_symbol(" eth "), "ETH/USD");
        assert_eq!(resolve_symbol("aapl"), "AAPL");
        assert_eq!(resolve_symbol("USD/BRL"), "USD/BRL");
    }
}
