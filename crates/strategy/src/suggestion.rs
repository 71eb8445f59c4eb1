//! Greedy buy/sell suggestions over a forecast series.
//!
//! The engine walks consecutive point pairs once. Whenever the next price is
//! higher it buys at the earlier point and sells at the later one, so every
//! position lives for exactly one step. With unlimited transactions, no fees
//! and fractional shares this collects every upward move and is the optimal
//! profit for the series (the "buy and sell stock II" result). Shares here are
//! whole, so `max_profit` is the profit of this greedy policy and nothing more.

use chrono::{DateTime, Utc};
use common::{Action, Error, PricePoint, Suggestion, SuggestionReport};
use tracing::debug;

use crate::portfolio::Portfolio;

/// Stateless suggestion engine bound to a starting capital.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionEngine {
    initial_capital: f64,
}

impl SuggestionEngine {
    /// Capital must be finite and non-negative.
    pub fn new(initial_capital: f64) -> Result<Self, Error> {
        if !initial_capital.is_finite() || initial_capital < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "initial capital must be a finite number >= 0, got {}",
                initial_capital
            )));
        }
        Ok(Self { initial_capital })
    }

    /// Run the greedy scan over `series`.
    ///
    /// Fails with `InvalidPrice` when a rise starts from a price <= 0 or a
    /// position would be valued at a non-finite price.
    pub fn evaluate(&self, series: &[PricePoint]) -> Result<SuggestionReport, Error> {
        let mut portfolio = Portfolio::new(self.initial_capital);
        let mut actions = Vec::new();

        for (i, pair) in series.windows(2).enumerate() {
            let (prev, curr) = (pair[0], pair[1]);
            // NaN never counts as a rise.
            if !(curr.price > prev.price) {
                continue;
            }

            if portfolio.is_flat() {
                let shares = portfolio.open(i, prev.price)?;
                actions.push(Suggestion {
                    action: Action::Buy,
                    date: format_trade_date(prev.timestamp_ms)?,
                    price: prev.price,
                    shares,
                });
            }

            if let Some(pos) = portfolio.close(i + 1, curr.price)? {
                actions.push(Suggestion {
                    action: Action::Sell,
                    date: format_trade_date(curr.timestamp_ms)?,
                    price: curr.price,
                    shares: pos.shares,
                });
            }
        }

        if let Some(last) = series.last() {
            if let Some(pos) = portfolio.close(series.len() - 1, last.price)? {
                debug!(
                    "Force-closing {} shares bought at {:.2} (index {})",
                    pos.shares, pos.entry_price, pos.entry_index
                );
                actions.push(Suggestion {
                    action: Action::Sell,
                    date: format_trade_date(last.timestamp_ms)?,
                    price: last.price,
                    shares: pos.shares,
                });
            }
        }

        debug!(
            "Suggestion run: {} points, {} actions, profit {:.2}",
            series.len(),
            actions.len(),
            portfolio.profit()
        );

        Ok(SuggestionReport {
            actions,
            max_profit: portfolio.profit(),
        })
    }
}

/// Compute greedy buy/sell suggestions for `series` starting from
/// `initial_capital`.
pub fn compute_suggestions(
    series: &[PricePoint],
    initial_capital: f64,
) -> Result<SuggestionReport, Error> {
    SuggestionEngine::new(initial_capital)?.evaluate(series)
}

/// Render epoch millis as `M/D/YYYY` in UTC.
pub fn format_trade_date(timestamp_ms: i64) -> Result<String, Error> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .ok_or_else(|| {
            Error::InvalidArgument(format!("timestamp {} is out of range", timestamp_ms))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    // 2024-03-04T00:00:00Z
    const START_MS: i64 = 1_709_510_400_000;

    fn series(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(START_MS + i as i64 * DAY_MS, *p))
            .collect()
    }

    fn pair_profit(report: &SuggestionReport) -> f64 {
        report
            .actions
            .chunks(2)
            .map(|pair| {
                assert_eq!(pair[0].action, Action::Buy);
                assert_eq!(pair[1].action, Action::Sell);
                assert_eq!(pair[0].shares, pair[1].shares);
                pair[0].shares * (pair[1].price - pair[0].price)
            })
            .sum()
    }

    #[test]
    fn test_empty_and_singleton_series() {
        for capital in [0.0, 100.0, 1e6] {
            let empty = compute_suggestions(&[], capital).expect("empty run");
            assert!(empty.actions.is_empty());
            assert_eq!(empty.max_profit, 0.0);

            let single = compute_suggestions(&series(&[42.0]), capital).expect("single run");
            assert!(single.actions.is_empty());
            assert_eq!(single.max_profit, 0.0);
        }
    }

    #[test]
    fn test_single_spike() {
        let report = compute_suggestions(&series(&[10.0, 20.0, 5.0]), 100.0).expect("run");

        assert_eq!(
            report.actions,
            vec![
                Suggestion {
                    action: Action::Buy,
                    date: "3/4/2024".into(),
                    price: 10.0,
                    shares: 10.0,
                },
                Suggestion {
                    action: Action::Sell,
                    date: "3/5/2024".into(),
                    price: 20.0,
                    shares: 10.0,
                },
            ]
        );
        assert_eq!(report.max_profit, 100.0);
    }

    #[test]
    fn test_increasing_series_trades_every_step() {
        let report = compute_suggestions(&series(&[10.0, 20.0, 40.0]), 100.0).expect("run");

        assert_eq!(report.actions.len(), 4);
        // 10 shares 10→20, then the reinvested 200 buys 10 shares 20→40.
        assert_eq!(report.actions[2].shares, 10.0);
        assert_eq!(report.actions[2].price, 20.0);
        assert_eq!(report.max_profit, 300.0);
    }

    #[test]
    fn test_decreasing_and_flat_series_do_nothing() {
        for prices in [vec![50.0, 40.0, 30.0, 30.0], vec![7.0, 7.0, 7.0]] {
            let report = compute_suggestions(&series(&prices), 100.0).expect("run");
            assert!(report.actions.is_empty());
            assert_eq!(report.max_profit, 0.0);
        }
    }

    #[test]
    fn test_leftover_cash_is_kept() {
        // 3 shares at 3 leaves 1 in cash.
        let report = compute_suggestions(&series(&[3.0, 4.0]), 10.0).expect("run");
        assert_eq!(report.actions[0].shares, 3.0);
        assert_eq!(report.max_profit, 3.0);
    }

    #[test]
    fn test_capital_below_price_emits_zero_share_pairs() {
        let report = compute_suggestions(&series(&[50.0, 60.0]), 10.0).expect("run");
        assert_eq!(report.actions.len(), 2);
        assert_eq!(report.actions[0].shares, 0.0);
        assert_eq!(report.max_profit, 0.0);
    }

    #[test]
    fn test_profit_matches_sum_of_pairs() {
        let prices = [12.5, 11.0, 13.25, 13.0, 15.5, 15.75, 9.0, 10.5, 10.25, 14.0];
        let capital = 1000.0;
        let report = compute_suggestions(&series(&prices), capital).expect("run");

        assert_eq!(report.actions.len() % 2, 0);
        assert!((report.max_profit - pair_profit(&report)).abs() < 1e-9);
        for a in &report.actions {
            assert_eq!(a.shares.fract(), 0.0);
        }
    }

    #[test]
    fn test_idempotent() {
        let s = series(&[5.0, 6.0, 4.0, 8.0, 8.5]);
        let first = compute_suggestions(&s, 250.0).expect("run");
        let second = compute_suggestions(&s, 250.0).expect("run");
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_price_at_buy_point_is_rejected() {
        let err = compute_suggestions(&series(&[0.0, 5.0]), 100.0).unwrap_err();
        assert!(matches!(err, Error::InvalidPrice { index: 0, price } if price == 0.0));
    }

    #[test]
    fn test_non_positive_price_without_rise_is_ignored() {
        let report = compute_suggestions(&series(&[5.0, 0.0, -1.0]), 100.0).expect("run");
        assert!(report.actions.is_empty());
    }

    #[test]
    fn test_infinite_sell_price_is_rejected() {
        // Capital below the buy price makes a zero-share position.
        let err = compute_suggestions(&series(&[50.0, f64::INFINITY]), 10.0).unwrap_err();
        assert!(matches!(err, Error::InvalidPrice { index: 1, price } if price.is_infinite()));

        let err = compute_suggestions(&series(&[5.0, 6.0, f64::INFINITY]), 100.0).unwrap_err();
        assert!(matches!(err, Error::InvalidPrice { index: 2, .. }));
    }

    #[test]
    fn test_negative_or_non_finite_capital_is_rejected() {
        for capital in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                compute_suggestions(&series(&[1.0, 2.0]), capital),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_format_trade_date() {
        assert_eq!(format_trade_date(START_MS).expect("date"), "3/4/2024");
        assert_eq!(format_trade_date(0).expect("date"), "1/1/1970");
        assert!(format_trade_date(i64::MAX).is_err());
    }
}
