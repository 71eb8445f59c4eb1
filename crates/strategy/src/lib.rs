//! Suggestion engine crate.
//!
//! Turns a forecast price series into buy/sell suggestions.

pub mod portfolio;
pub mod suggestion;

pub use portfolio::{OpenPosition, Portfolio};
pub use suggestion::{compute_suggestions, format_trade_date, SuggestionEngine};
