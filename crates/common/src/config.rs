//! Application configuration types.

use serde::{Deserialize, Serialize};

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the stocks backend (search, summary, charts, news, peers).
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Base URL of the prediction service.
    #[serde(default = "default_prediction_url")]
    pub prediction_url: String,

    /// Capital used for forecast suggestions when none is given.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Poll interval for `daily --follow`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Where the watchlist is persisted.
    #[serde(default = "default_watchlist_path")]
    pub watchlist_path: String,

    /// Backend route table.
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Backend routes, relative to `backend_url`.
///
/// Routes ending in `/` take the ticker as a path suffix; the others take
/// it as the `keyword` query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_autocomplete")]
    pub autocomplete: String,
    #[serde(default = "default_stock_details")]
    pub stock_details: String,
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_daily_chart")]
    pub daily_chart: String,
    #[serde(default = "default_news")]
    pub news: String,
    #[serde(default = "default_history_chart")]
    pub history_chart: String,
    #[serde(default = "default_peers")]
    pub peers: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_backend_url() -> String {
    "http://127.0.0.1:8080".into()
}
fn default_prediction_url() -> String {
    "http://127.0.0.1:5000".into()
}
fn default_initial_capital() -> f64 {
    1000.0
}
fn default_http_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    15
}
fn default_watchlist_path() -> String {
    "watchlist.json".into()
}

fn default_autocomplete() -> String {
    "/api/autocomplete".into()
}
fn default_stock_details() -> String {
    "/api/stockdetails/".into()
}
fn default_summary() -> String {
    "/api/summary/".into()
}
fn default_daily_chart() -> String {
    "/api/dailychart/".into()
}
fn default_news() -> String {
    "/api/news/".into()
}
fn default_history_chart() -> String {
    "/api/historychart/".into()
}
fn default_peers() -> String {
    "/api/peers".into()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            autocomplete: default_autocomplete(),
            stock_details: default_stock_details(),
            summary: default_summary(),
            daily_chart: default_daily_chart(),
            news: default_news(),
            history_chart: default_history_chart(),
            peers: default_peers(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            prediction_url: default_prediction_url(),
            initial_capital: default_initial_capital(),
            http_timeout_secs: default_http_timeout(),
            refresh_interval_secs: default_refresh_interval(),
            watchlist_path: default_watchlist_path(),
            routes: RoutesConfig::default(),
        }
    }
}
