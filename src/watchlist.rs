//! Persistent watchlist of favorite tickers.

use std::fs;
use std::path::{Path, PathBuf};

use common::Error;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct WatchlistFile {
    #[serde(default)]
    favorites: Vec<String>,
}

/// Favorite tickers in insertion order, backed by a JSON file.
#[derive(Debug)]
pub struct Watchlist {
    path: PathBuf,
    favorites: Vec<String>,
}

impl Watchlist {
    /// Load from `path`; a missing file is an empty watchlist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let favorites = match fs::read_to_string(&path) {
            Ok(contents) => {
                let file: WatchlistFile = serde_json::from_str(&contents)?;
                let mut favorites: Vec<String> = Vec::with_capacity(file.favorites.len());
                for ticker in file.favorites.iter().map(|t| normalize(t)) {
                    if !ticker.is_empty() && !favorites.contains(&ticker) {
                        favorites.push(ticker);
                    }
                }
                favorites
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No watchlist at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, favorites })
    }

    /// Write to disk via a temp file and rename.
    pub fn save(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&WatchlistFile {
            favorites: self.favorites.clone(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Saved {} favorites to {}", self.favorites.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn contains(&self, ticker: &str) -> bool {
        let ticker = normalize(ticker);
        self.favorites.iter().any(|t| *t == ticker)
    }

    /// Returns false when the ticker was already present.
    pub fn add_favorite(&mut self, ticker: &str) -> Result<bool, Error> {
        let ticker = normalize(ticker);
        if ticker.is_empty() {
            return Err(Error::InvalidArgument("ticker must not be empty".into()));
        }
        if self.favorites.contains(&ticker) {
            return Ok(false);
        }
        self.favorites.push(ticker);
        Ok(true)
    }

    /// Returns false when the ticker was not present.
    pub fn remove_favorite(&mut self, ticker: &str) -> bool {
        let ticker = normalize(ticker);
        let before = self.favorites.len();
        self.favorites.retain(|t| *t != ticker);
        self.favorites.len() != before
    }

    /// Add if absent, remove if present. Returns whether it is now a favorite.
    pub fn toggle(&mut self, ticker: &str) -> Result<bool, Error> {
        if self.remove_favorite(ticker) {
            Ok(false)
        } else {
            self.add_favorite(ticker)
        }
    }
}

fn normalize(ticker: &str) -> String {
    ticker.trim().to_ascii_uppercase()
}
