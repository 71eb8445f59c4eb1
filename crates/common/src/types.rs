//! Domain types shared across the client.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Suggestion engine types ───────────────────────────────────────────

/// Trade direction of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

/// One point of a forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }
}

/// A single recommended trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub action: Action,
    /// Calendar date of the triggering point, `M/D/YYYY` (UTC).
    pub date: String,
    pub price: f64,
    /// Whole shares bought, echoed on the matching sell.
    pub shares: f64,
}

/// Output of one suggestion run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub actions: Vec<Suggestion>,
    /// Final capital minus initial capital for the greedy policy.
    pub max_profit: f64,
}

// ── Backend types ─────────────────────────────────────────────────────

/// Autocomplete hit from the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMatch {
    pub ticker: String,
    #[serde(default)]
    pub name: String,
}

/// Company metadata from the stock details endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetails {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exchange_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
}

/// Latest quote block from the summary endpoint.
///
/// The backend sends prices either as numbers or as numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub prev_close: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub high_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub low_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub open_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mid_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ask_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ask_size: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bid_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bid_size: f64,
    #[serde(default)]
    pub market_status: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub current_time_stamp: Option<String>,
}

impl StockSummary {
    pub fn change(&self) -> f64 {
        self.last_price - self.prev_close
    }

    /// Percent change against the previous close; 0 when there is no close.
    pub fn change_percent(&self) -> f64 {
        if self.prev_close == 0.0 {
            return 0.0;
        }
        self.change() / self.prev_close * 100.0
    }

    /// `"-1.23 (-0.45%)"`
    pub fn change_string(&self) -> String {
        format!("{:.2} ({:.2}%)", self.change(), self.change_percent())
    }

    pub fn arrow_up(&self) -> bool {
        self.last_price > self.prev_close
    }
}

/// A date field that arrives either as epoch millis or as a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Millis(i64),
    Text(String),
}

impl DateValue {
    pub fn timestamp_ms(&self) -> Option<i64> {
        match self {
            DateValue::Millis(ms) => Some(*ms),
            DateValue::Text(s) => parse_date_ms(s),
        }
    }
}

/// Intraday close from the daily chart endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntradayPoint {
    pub date: DateValue,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub close: f64,
}

/// Daily OHLCV bar from the history chart endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalBar {
    pub date: DateValue,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub open: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub high: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub low: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub close: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: f64,
}

/// News article from the news endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub source_name: String,
}

impl NewsArticle {
    /// `"March 5, 2024"`, or the raw value when it does not parse.
    pub fn published_date(&self) -> String {
        parse_date_ms(&self.published_at)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| self.published_at.clone())
    }
}

/// Peer comparison document for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerGroup {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub peers: Vec<Peer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub ticker: String,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub ps_ratio: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
}

// ── Prediction types ──────────────────────────────────────────────────

/// Response from `POST /predict/next_month`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub ticker: String,
    /// ISO date → predicted price (number or numeric string).
    #[serde(default)]
    pub predictions: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────

/// Interpret a JSON number or numeric string as f64.
pub fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` (UTC midnight).
pub fn parse_date_ms(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}
