//! Prediction service client.
//!
//! Requests a next-month price forecast for a ticker and converts the
//! returned `{date: price}` map into an ordered `PricePoint` series for the
//! suggestion engine.

use std::path::Path;
use std::time::Duration;

use common::{parse_date_ms, value_as_f64, AppConfig, Error, PredictionResponse, PricePoint};
use serde::Serialize;
use tracing::{debug, warn};

const NEXT_MONTH_PATH: &str = "/predict/next_month";
const BODY_EXCERPT_CHARS: usize = 500;

/// Prediction API client.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    ticker: &'a str,
}

impl PredictionClient {
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("stock-forecast/0.1")
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build prediction HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.prediction_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the service for the next month of predicted prices.
    pub async fn predict_next_month(&self, ticker: &str) -> Result<PredictionResponse, Error> {
        let url = format!("{}{}", self.base_url, NEXT_MONTH_PATH);
        let ticker = ticker.trim().to_ascii_uppercase();

        debug!("Requesting prediction for {}: {}", ticker, url);

        let resp = self
            .client
            .post(&url)
            .json(&PredictRequest { ticker: &ticker })
            .send()
            .await
            .map_err(|e| Error::Http(format!("prediction request for {} failed: {}", ticker, e)))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Http(format!("reading prediction for {}: {}", ticker, e)))?;

        if !(200..300).contains(&status) {
            // Model failures may still carry `{"error": ...}`.
            if let Ok(parsed) = serde_json::from_str::<PredictionResponse>(&body) {
                check_response(parsed)?;
            }
            return Err(Error::Prediction(format!(
                "service returned {} for {}: {}",
                status,
                ticker,
                body.chars().take(BODY_EXCERPT_CHARS).collect::<String>()
            )));
        }

        check_response(serde_json::from_str(&body)?)
    }
}

/// Load a previously saved prediction response from disk.
pub fn load_prediction_file(path: &Path) -> Result<PredictionResponse, Error> {
    let contents = std::fs::read_to_string(path)?;
    let parsed: PredictionResponse = serde_json::from_str(&contents)?;
    check_response(parsed)
}

fn check_response(resp: PredictionResponse) -> Result<PredictionResponse, Error> {
    match resp.error.as_deref().map(str::trim) {
        Some(msg) if !msg.is_empty() => Err(Error::Prediction(msg.to_string())),
        _ => Ok(resp),
    }
}

/// Convert the date→price map into a chronologically ordered series.
pub fn forecast_series(resp: &PredictionResponse) -> Result<Vec<PricePoint>, Error> {
    let mut points = Vec::with_capacity(resp.predictions.len());

    for (date, raw_price) in &resp.predictions {
        let timestamp_ms = parse_date_ms(date).ok_or_else(|| {
            Error::Prediction(format!("unparsable forecast date {:?}", date))
        })?;
        let price = value_as_f64(raw_price)
            .filter(|p| p.is_finite())
            .ok_or_else(|| {
                Error::Prediction(format!("unparsable forecast price {} on {}", raw_price, date))
            })?;
        points.push(PricePoint::new(timestamp_ms, price));
    }

    points.sort_by_key(|p| p.timestamp_ms);

    if points.is_empty() {
        warn!("Prediction for {} contained no points", resp.ticker);
    }

    Ok(points)
}
