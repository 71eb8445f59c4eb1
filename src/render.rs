//! Plain-text views for the CLI.

use chrono::{DateTime, Utc};
use common::{
    Action, DateValue, HistoricalBar, IntradayPoint, NewsArticle, PeerGroup, PricePoint,
    StockDetails, StockMatch, StockSummary, Suggestion, SuggestionReport,
};

fn format_ms(ms: i64, fmt: &str) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.format(fmt).to_string())
}

fn format_date_value(date: &DateValue, fmt: &str) -> String {
    date.timestamp_ms()
        .and_then(|ms| format_ms(ms, fmt))
        .unwrap_or_else(|| match date {
            DateValue::Millis(ms) => ms.to_string(),
            DateValue::Text(s) => s.clone(),
        })
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into())
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

pub fn matches(matches: &[StockMatch]) -> String {
    if matches.is_empty() {
        return "No matching stocks found.".into();
    }
    matches
        .iter()
        .map(|m| format!("{} | {}", m.ticker, m.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn summary(summary: &StockSummary) -> String {
    let arrow = if summary.arrow_up() { "▲" } else { "▼" };
    let mut lines = vec![
        format!(
            "Last Price: {:.2} {} {}",
            summary.last_price,
            arrow,
            summary.change_string()
        ),
        format!("High Price: {}", summary.high_price),
        format!("Low Price: {}", summary.low_price),
        format!("Open Price: {}", summary.open_price),
        format!("Prev. Close: {}", summary.prev_close),
        format!("Volume: {}", summary.volume),
    ];
    if !summary.market_status {
        lines.push(format!("Mid Price: {}", summary.mid_price));
        lines.push(format!("Ask Price: {}", summary.ask_price));
        lines.push(format!("Ask Size: {}", summary.ask_size));
        lines.push(format!("Bid Price: {}", summary.bid_price));
        lines.push(format!("Bid Size: {}", summary.bid_size));
    }
    match (summary.market_status, summary.timestamp.as_deref()) {
        (true, _) => lines.push("Market is Open".into()),
        (false, Some(ts)) if !ts.is_empty() => lines.push(format!("Market Closed on {}", ts)),
        (false, _) => lines.push("Market is Closed".into()),
    }
    lines.join("\n")
}

pub fn details(
    ticker: &str,
    details: &StockDetails,
    quote: Option<&StockSummary>,
    favorite: bool,
) -> String {
    let star = if favorite { "★" } else { "☆" };
    let mut lines = vec![
        format!("{} {}", ticker, star),
        or_na(&details.name).to_string(),
        or_na(&details.exchange_code).to_uppercase(),
    ];
    if let Some(quote) = quote {
        lines.push(String::new());
        lines.push(summary(quote));
    }
    lines.push(String::new());
    lines.push("Company's Description".into());
    lines.push(format!("Start Date: {}", or_na(&details.start_date)));
    lines.push(details.description.clone());
    lines.join("\n")
}

pub fn intraday(ticker: &str, points: &[IntradayPoint]) -> String {
    if points.is_empty() {
        return format!("No intraday data for {}.", ticker);
    }
    let mut lines = vec![format!("{} intraday", ticker)];
    lines.extend(
        points
            .iter()
            .map(|p| format!("{}  {:.2}", format_date_value(&p.date, "%b %e %H:%M"), p.close)),
    );
    lines.join("\n")
}

/// The most recent `limit` bars, oldest first.
pub fn history(ticker: &str, bars: &[HistoricalBar], limit: usize) -> String {
    if bars.is_empty() {
        return format!("No historical data for {}.", ticker);
    }
    let start = bars.len().saturating_sub(limit);
    let mut lines = vec![
        format!("Historical Chart for {}", ticker),
        format!(
            "{:<10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>12}",
            "Date", "Open", "High", "Low", "Close", "Volume"
        ),
    ];
    lines.extend(bars[start..].iter().map(|b| {
        format!(
            "{:<10}  {:>10.2}  {:>10.2}  {:>10.2}  {:>10.2}  {:>12.0}",
            format_date_value(&b.date, "%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        )
    }));
    lines.join("\n")
}

pub fn news(articles: &[NewsArticle], limit: usize) -> String {
    if articles.is_empty() {
        return "No news available.".into();
    }
    articles
        .iter()
        .take(limit)
        .map(|a| {
            format!(
                "{}\n  {} · {}\n  {}",
                a.title,
                or_na(&a.source_name),
                a.published_date(),
                a.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn peers(groups: &[PeerGroup]) -> String {
    let mut lines = vec![format!(
        "{:<8}  {:>16}  {:>8}  {:>8}  {:>8}  {:>16}",
        "Ticker", "Market Cap", "P/E", "P/S", "Div %", "Revenue"
    )];
    for peer in groups.iter().flat_map(|g| g.peers.iter()) {
        lines.push(format!(
            "{:<8}  {:>16}  {:>8}  {:>8}  {:>8}  {:>16}",
            peer.ticker,
            opt_num(peer.market_cap),
            opt_num(peer.pe_ratio),
            opt_num(peer.ps_ratio),
            opt_num(peer.dividend_yield),
            opt_num(peer.revenue)
        ));
    }
    lines.join("\n")
}

pub fn suggestion(s: &Suggestion) -> String {
    match s.action {
        Action::Buy => format!(
            "Buy on {} at ${:.2}. Buy shares: {:.2}",
            s.date, s.price, s.shares
        ),
        Action::Sell => format!("Sell on {} at ${:.2}.", s.date, s.price),
    }
}

pub fn forecast(
    ticker: &str,
    series: &[PricePoint],
    report: &SuggestionReport,
    initial_capital: f64,
) -> String {
    let mut lines = vec![format!("Stock Price Forecast for {}", ticker)];
    lines.extend(series.iter().map(|p| {
        format!(
            "{}  {:.2}",
            format_ms(p.timestamp_ms, "%Y-%m-%d").unwrap_or_else(|| p.timestamp_ms.to_string()),
            p.price
        )
    }));

    lines.push(String::new());
    lines.push(format!(
        "Buy/Sell Suggestions (initial capital ${:.2})",
        initial_capital
    ));
    if report.actions.is_empty() {
        lines.push("No suggestions available.".into());
    } else {
        lines.extend(report.actions.iter().map(suggestion));
    }
    lines.push(format!("Max Profit: ${:.2}", report.max_profit));
    lines.join("\n")
}

pub fn watchlist_row(ticker: &str, quote: &StockSummary) -> String {
    let arrow = if quote.arrow_up() { "▲" } else { "▼" };
    format!(
        "{:<8} {:<30} {:>10.2} {} {}",
        ticker,
        quote.company_name,
        quote.last_price,
        arrow,
        quote.change_string()
    )
}
