//! Shared types, config, and error definitions for stock-forecast.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::Error;
pub use types::*;
