//! stock-forecast: command-line stock market client.
//!
//! Single-binary Tokio application that:
//! 1. Searches tickers and shows company details and quotes
//! 2. Prints intraday, historical, news and peer data from the backend
//! 3. Fetches next-month price predictions
//! 4. Turns the prediction into buy/sell suggestions
//! 5. Keeps a local watchlist of favorite tickers

mod config;
mod render;
mod watchlist;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::future::join_all;
use tracing::{error, info, warn};

use common::{AppConfig, Error};
use prediction_client::{forecast_series, load_prediction_file, PredictionClient};
use stocks_client::{normalize_ticker, StocksClient};
use strategy::SuggestionEngine;
use watchlist::Watchlist;

/// Stock market information and forecast client
#[derive(Parser)]
#[command(name = "stock-forecast", about = "Stock search, quotes, news and forecast suggestions")]
struct Cli {
    /// Config file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Autocomplete search for tickers.
    Search { keyword: String },
    /// Company details with the latest quote.
    Details { ticker: String },
    /// Intraday closes for the latest session.
    Daily {
        ticker: String,
        /// Keep refreshing until Ctrl-C.
        #[arg(long)]
        follow: bool,
    },
    /// Daily OHLCV history.
    History {
        ticker: String,
        #[arg(long, default_value_t = 30)]
        limit: usize,
    },
    /// Top news for a ticker.
    News {
        ticker: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Peer companies.
    Peers { ticker: String },
    /// Next-month forecast with buy/sell suggestions.
    Forecast {
        ticker: String,
        /// Starting capital (defaults to the configured value).
        #[arg(long)]
        capital: Option<f64>,
        /// Read a saved prediction response instead of calling the service.
        #[arg(long)]
        from_file: Option<PathBuf>,
        /// Print the suggestion report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Manage the local watchlist.
    Watchlist {
        #[command(subcommand)]
        action: WatchlistCommand,
    },
}

#[derive(Subcommand)]
enum WatchlistCommand {
    /// Show quotes for every favorite.
    List,
    Add { ticker: String },
    Remove { ticker: String },
    Toggle { ticker: String },
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stock_forecast=info,stocks_client=info,prediction_client=info,strategy=info"
                    .into()
            }),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, cfg).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, cfg: AppConfig) -> Result<(), Error> {
    match command {
        Command::Search { keyword } => {
            let stocks = StocksClient::new(&cfg)?;
            let hits = stocks.search_stocks(&keyword).await?;
            println!("{}", render::matches(&hits));
        }
        Command::Details { ticker } => {
            let ticker = normalize_ticker(&ticker);
            let stocks = StocksClient::new(&cfg)?;
            let watchlist = Watchlist::load(&cfg.watchlist_path)?;

            let (details, quote) =
                tokio::join!(stocks.get_stock_details(&ticker), stocks.get_summary(&ticker));
            let details = details?;
            let quote = match quote {
                Ok(q) => Some(q),
                Err(e) => {
                    warn!("Error loading stock summary for {}: {}", ticker, e);
                    None
                }
            };
            println!(
                "{}",
                render::details(&ticker, &details, quote.as_ref(), watchlist.contains(&ticker))
            );
        }
        Command::Daily { ticker, follow } => {
            let ticker = normalize_ticker(&ticker);
            let stocks = StocksClient::new(&cfg)?;
            if follow {
                follow_daily(
                    &stocks,
                    &ticker,
                    cfg.refresh_interval_secs,
                    tokio::signal::ctrl_c(),
                )
                .await?;
            } else {
                let points = stocks.get_daily_data(&ticker).await?;
                println!("{}", render::intraday(&ticker, &points));
            }
        }
        Command::History { ticker, limit } => {
            let ticker = normalize_ticker(&ticker);
            let stocks = StocksClient::new(&cfg)?;
            let bars = stocks.get_historical_data(&ticker).await?;
            println!("{}", render::history(&ticker, &bars, limit));
        }
        Command::News { ticker, limit } => {
            let stocks = StocksClient::new(&cfg)?;
            let articles = stocks.get_top_news(&ticker).await?;
            println!("{}", render::news(&articles, limit));
        }
        Command::Peers { ticker } => {
            let stocks = StocksClient::new(&cfg)?;
            let groups = stocks.get_peers(&ticker).await?;
            println!("{}", render::peers(&groups));
        }
        Command::Forecast {
            ticker,
            capital,
            from_file,
            json,
        } => {
            let ticker = normalize_ticker(&ticker);
            let capital = capital.unwrap_or(cfg.initial_capital);
            let engine = SuggestionEngine::new(capital)?;

            let prediction = match from_file {
                Some(path) => load_prediction_file(&path)?,
                None => {
                    PredictionClient::new(&cfg)?
                        .predict_next_month(&ticker)
                        .await?
                }
            };
            let series = forecast_series(&prediction)?;
            let report = engine.evaluate(&series)?;
            info!(
                "{}: {} forecast points, {} suggestions, max profit {:.2}",
                ticker,
                series.len(),
                report.actions.len(),
                report.max_profit
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render::forecast(&ticker, &series, &report, capital));
            }
        }
        Command::Watchlist { action } => {
            let mut watchlist = Watchlist::load(&cfg.watchlist_path)?;
            tracing::debug!("Watchlist file: {}", watchlist.path().display());
            match action {
                WatchlistCommand::List => list_watchlist(&cfg, &watchlist).await?,
                WatchlistCommand::Add { ticker } => {
                    if watchlist.add_favorite(&ticker)? {
                        watchlist.save()?;
                        println!("Added {} to watchlist.", normalize_ticker(&ticker));
                    } else {
                        println!("{} is already in the watchlist.", normalize_ticker(&ticker));
                    }
                }
                WatchlistCommand::Remove { ticker } => {
                    if watchlist.remove_favorite(&ticker) {
                        watchlist.save()?;
                        println!("Removed {} from watchlist.", normalize_ticker(&ticker));
                    } else {
                        println!("{} is not in the watchlist.", normalize_ticker(&ticker));
                    }
                }
                WatchlistCommand::Toggle { ticker } => {
                    let now_favorite = watchlist.toggle(&ticker)?;
                    watchlist.save()?;
                    let verb = if now_favorite { "Added" } else { "Removed" };
                    println!("{} {}.", verb, normalize_ticker(&ticker));
                }
            }
        }
    }
    Ok(())
}

/// Fetch every favorite's summary concurrently; failures are skipped.
async fn list_watchlist(cfg: &AppConfig, watchlist: &Watchlist) -> Result<(), Error> {
    if watchlist.favorites().is_empty() {
        println!("Your Watchlist is empty!");
        return Ok(());
    }

    let stocks = StocksClient::new(cfg)?;
    let quotes = join_all(watchlist.favorites().iter().map(|ticker| {
        let stocks = &stocks;
        async move { (ticker, stocks.get_summary(ticker).await) }
    }))
    .await;

    let mut shown = 0usize;
    for (ticker, quote) in quotes {
        match quote {
            Ok(q) => {
                println!("{}", render::watchlist_row(ticker, &q));
                shown += 1;
            }
            Err(e) => warn!("Error fetching data for {}: {}", ticker, e),
        }
    }
    if shown == 0 {
        println!("No watchlist quotes could be loaded.");
    }
    Ok(())
}

/// Re-fetch intraday data on a fixed interval until `shutdown` resolves.
///
/// `shutdown` is polled for the whole run, including while a fetch is in
/// flight.
async fn follow_daily<F>(
    stocks: &StocksClient,
    ticker: &str,
    interval_secs: u64,
    shutdown: F,
) -> Result<(), Error>
where
    F: Future<Output = std::io::Result<()>>,
{
    let mut ticker_interval = tokio::time::interval(Duration::from_secs(interval_secs));
    info!("Refreshing {} every {}s (Ctrl-C to stop)", ticker, interval_secs);
    tokio::pin!(shutdown);

    loop {
        let fetched = tokio::select! {
            res = &mut shutdown => {
                res?;
                break;
            }
            fetched = async {
                ticker_interval.tick().await;
                stocks.get_daily_data(ticker).await
            } => fetched,
        };
        match fetched {
            Ok(points) => println!("{}\n", render::intraday(ticker, &points)),
            Err(e) => warn!("Error fetching stock data for {}: {}", ticker, e),
        }
    }

    info!("Stopping refresh for {}", ticker);
    Ok(())
}
