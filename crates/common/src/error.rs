//! Unified error type for stock-forecast.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Backend API error (status={status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Prediction API error: {0}")]
    Prediction(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid price {price} at index {index}: buy price must be > 0")]
    InvalidPrice { index: usize, price: f64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
