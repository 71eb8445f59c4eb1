//! Stocks backend API client.
//!
//! Thin async wrappers over the backend's search, details, summary, chart,
//! news and peers routes. Responses are decoded into the shared types in
//! `common`; nothing is cached.

use std::time::Duration;

use common::config::RoutesConfig;
use common::{
    AppConfig, Error, HistoricalBar, IntradayPoint, NewsArticle, PeerGroup, StockDetails,
    StockMatch, StockSummary,
};
use serde::de::DeserializeOwned;
use tracing::debug;

const BODY_EXCERPT_CHARS: usize = 500;

/// Backend client with connection pooling.
#[derive(Debug, Clone)]
pub struct StocksClient {
    client: reqwest::Client,
    base_url: String,
    routes: RoutesConfig,
}

impl StocksClient {
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("stock-forecast/0.1")
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build backend HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            routes: config.routes.clone(),
        })
    }

    /// Autocomplete search by keyword.
    pub async fn search_stocks(&self, keyword: &str) -> Result<Vec<StockMatch>, Error> {
        let url = self.route_url(&self.routes.autocomplete);
        self.get_json(&url, &[("keyword", keyword.trim())], "stocks")
            .await
    }

    /// Company metadata. The backend answers with an array; an empty one
    /// means the ticker is unknown.
    pub async fn get_stock_details(&self, ticker: &str) -> Result<StockDetails, Error> {
        let url = self.ticker_url(&self.routes.stock_details, ticker);
        let rows: Vec<StockDetails> = self.get_json(&url, &[], "stock details").await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("stock details for {}", normalize_ticker(ticker))))
    }

    pub async fn get_summary(&self, ticker: &str) -> Result<StockSummary, Error> {
        let url = self.ticker_url(&self.routes.summary, ticker);
        let mut summary: StockSummary = self.get_json(&url, &[], "summary").await?;
        if summary.ticker.is_empty() {
            summary.ticker = normalize_ticker(ticker);
        }
        Ok(summary)
    }

    /// Intraday closes for the latest session.
    pub async fn get_daily_data(&self, ticker: &str) -> Result<Vec<IntradayPoint>, Error> {
        let url = self.ticker_url(&self.routes.daily_chart, ticker);
        self.get_json(&url, &[], "daily data").await
    }

    pub async fn get_top_news(&self, ticker: &str) -> Result<Vec<NewsArticle>, Error> {
        let url = self.ticker_url(&self.routes.news, ticker);
        self.get_json(&url, &[], "top news").await
    }

    /// Daily OHLCV history.
    pub async fn get_historical_data(&self, ticker: &str) -> Result<Vec<HistoricalBar>, Error> {
        let url = self.ticker_url(&self.routes.history_chart, ticker);
        self.get_json(&url, &[], "historical data").await
    }

    pub async fn get_peers(&self, ticker: &str) -> Result<Vec<PeerGroup>, Error> {
        let url = self.route_url(&self.routes.peers);
        let ticker = normalize_ticker(ticker);
        let groups: Vec<PeerGroup> = self
            .get_json(&url, &[("keyword", ticker.as_str())], "peers")
            .await?;
        if groups.is_empty() {
            return Err(Error::NotFound(format!("peer data for {}", ticker)));
        }
        Ok(groups)
    }

    fn route_url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn ticker_url(&self, route: &str, ticker: &str) -> String {
        format!("{}{}{}", self.base_url, route, normalize_ticker(ticker))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, Error> {
        debug!("Fetching {}: {} {:?}", what, url, query);

        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(format!("error fetching {}: {}", what, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = backend_message(&body);
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!("{}: {}", what, message)));
            }
            return Err(Error::Backend {
                status: status.as_u16(),
                message: format!("error fetching {}: {}", what, message),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Http(format!("error reading {}: {}", what, e)))?;
        serde_json::from_str(&body).map_err(Error::from)
    }
}

/// Tickers are matched upper-case by the backend.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_ascii_uppercase()
}

/// Prefer the backend's `{"error": "..."}` message, else a body excerpt.
fn backend_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(serde_json::Value::String(msg)) = obj.get("error") {
            return msg.clone();
        }
    }
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> StocksClient {
        let config = AppConfig {
            backend_url: base.into(),
            ..AppConfig::default()
        };
        StocksClient::new(&config).expect("client should build")
    }

    #[test]
    fn test_urls_join_base_route_and_ticker() {
        let client = client_for("http://stocks.local/");
        assert_eq!(
            client.ticker_url(&client.routes.summary, " aapl "),
            "http://stocks.local/api/summary/AAPL"
        );
        assert_eq!(
            client.route_url(&client.routes.autocomplete),
            "http://stocks.local/api/autocomplete"
        );
    }

    #[test]
    fn test_backend_message_prefers_error_field() {
        assert_eq!(
            backend_message(r#"{"error": "No peer data found for this ticker"}"#),
            "No peer data found for this ticker"
        );
        assert_eq!(backend_message("gateway down"), "gateway down");
        assert_eq!(backend_message(&"x".repeat(900)).len(), BODY_EXCERPT_CHARS);
    }

    #[test]
    fn test_peer_payload_deserializes() {
        let groups: Vec<PeerGroup> = serde_json::from_str(
            r#"[{"ticker": "AAPL", "peers": [
                {"ticker": "MSFT", "marketCap": 3.1e12, "peRatio": 35.2},
                {"ticker": "GOOGL"}
            ]}]"#,
        )
        .expect("peers should deserialize");

        assert_eq!(groups[0].peers.len(), 2);
        assert_eq!(groups[0].peers[0].pe_ratio, Some(35.2));
        assert!(groups[0].peers[1].market_cap.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let client = client_for("http://127.0.0.1:1");
        let err = client.get_summary("AAPL").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)), "got {:?}", err);
    }

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind local listener");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            let Ok((mut sock, _)) = listener.accept().await else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match sock.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = sock.write_all(response.as_bytes()).await;
            let _ = sock.shutdown().await;
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_not_found_status_maps_to_not_found() {
        let base = serve_once("404 Not Found", r#"{"error":"Unknown ticker"}"#).await;
        let err = client_for(&base).get_summary("ZZZZ").await.unwrap_err();
        match err {
            Error::NotFound(msg) => assert!(msg.contains("Unknown ticker"), "got {}", msg),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_backend_error() {
        let base = serve_once(
            "500 Internal Server Error",
            r#"{"error":"Upstream quote service unavailable"}"#,
        )
        .await;
        let err = client_for(&base).get_daily_data("AAPL").await.unwrap_err();
        match err {
            Error::Backend { status, message } => {
                assert_eq!(status, 500);
                assert!(
                    message.contains("Upstream quote service unavailable"),
                    "got {}",
                    message
                );
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_details_is_not_found() {
        let base = serve_once("200 OK", "[]").await;
        let err = client_for(&base).get_stock_details("zzzz").await.unwrap_err();
        match err {
            Error::NotFound(msg) => assert!(msg.contains("ZZZZ"), "got {}", msg),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_peers_is_not_found() {
        let base = serve_once("200 OK", "[]").await;
        let err = client_for(&base).get_peers("aapl").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_summary_fills_missing_ticker() {
        let base = serve_once("200 OK", r#"{"lastPrice": 190.5, "prevClose": 189.0}"#).await;
        let summary = client_for(&base)
            .get_summary(" msft ")
            .await
            .expect("summary should load");
        assert_eq!(summary.ticker, "MSFT");
        assert!((summary.last_price - 190.5).abs() < 1e-9);
    }
}
