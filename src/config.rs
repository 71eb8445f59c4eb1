//! Configuration loader — merges config.toml, .env file, and env vars.

use common::{AppConfig, Error};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn parse_non_negative_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number >= 0")))?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number >= 0")));
    }
    Ok(parsed)
}

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn is_http_url(raw: &str) -> bool {
    let raw = raw.trim();
    raw.starts_with("http://") || raw.starts_with("https://")
}

pub fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if !is_http_url(&config.backend_url) {
        issues.push("backend_url must start with http:// or https://".into());
    }
    if !is_http_url(&config.prediction_url) {
        issues.push("prediction_url must start with http:// or https://".into());
    }
    if !config.initial_capital.is_finite() || config.initial_capital < 0.0 {
        issues.push("initial_capital must be a number >= 0".into());
    }
    if config.http_timeout_secs == 0 {
        issues.push("http_timeout_secs must be > 0".into());
    }
    if config.refresh_interval_secs == 0 {
        issues.push("refresh_interval_secs must be > 0".into());
    }
    if config.watchlist_path.trim().is_empty() {
        issues.push("watchlist_path must not be empty".into());
    }

    let routes = [
        ("routes.autocomplete", &config.routes.autocomplete),
        ("routes.stock_details", &config.routes.stock_details),
        ("routes.summary", &config.routes.summary),
        ("routes.daily_chart", &config.routes.daily_chart),
        ("routes.news", &config.routes.news),
        ("routes.history_chart", &config.routes.history_chart),
        ("routes.peers", &config.routes.peers),
    ];
    for (name, route) in routes {
        if !route.starts_with('/') {
            issues.push(format!("{name} must start with '/'"));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply overrides from a variable lookup (the process environment in
/// production).
fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("STOCK_BACKEND_URL") {
        config.backend_url = url.trim().to_string();
    }
    if let Some(url) = lookup("PREDICTION_API_URL") {
        config.prediction_url = url.trim().to_string();
    }
    if let Some(raw) = lookup("STOCK_INITIAL_CAPITAL") {
        config.initial_capital = parse_non_negative_f64(&raw, "STOCK_INITIAL_CAPITAL")?;
    }
    if let Some(path) = lookup("WATCHLIST_PATH") {
        config.watchlist_path = path.trim().to_string();
    }
    if let Some(raw) = lookup("HTTP_TIMEOUT_SECS") {
        config.http_timeout_secs = parse_positive_u64(&raw, "HTTP_TIMEOUT_SECS")?;
    }
    if let Some(raw) = lookup("REFRESH_INTERVAL_SECS") {
        config.refresh_interval_secs = parse_positive_u64(&raw, "REFRESH_INTERVAL_SECS")?;
    }
    Ok(())
}

/// Load configuration from an optional config file and the environment.
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, Error> {
    // 1. Load .env file from the working directory or its parents.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Read the config file. An explicit path must exist.
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        tracing::debug!("Loaded config from {}", path.display());
    } else if config_path.is_some() {
        return Err(Error::Config(format!(
            "Config file {} does not exist",
            path.display()
        )));
    }

    // 4. Environment variables win.
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut cfg = AppConfig::default();
        apply_env_overrides(
            &mut cfg,
            lookup_from(&[
                ("STOCK_BACKEND_URL", " https://api.example.com "),
                ("STOCK_INITIAL_CAPITAL", "2500.5"),
                ("REFRESH_INTERVAL_SECS", "60"),
            ]),
        )
        .expect("overrides should apply");

        assert_eq!(cfg.backend_url, "https://api.example.com");
        assert!((cfg.initial_capital - 2500.5).abs() < 1e-9);
        assert_eq!(cfg.refresh_interval_secs, 60);
        assert_eq!(cfg.prediction_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        let mut cfg = AppConfig::default();
        assert!(apply_env_overrides(&mut cfg, lookup_from(&[("STOCK_INITIAL_CAPITAL", "-5")])).is_err());
        assert!(apply_env_overrides(&mut cfg, lookup_from(&[("HTTP_TIMEOUT_SECS", "0")])).is_err());
        assert!(apply_env_overrides(&mut cfg, lookup_from(&[("HTTP_TIMEOUT_SECS", "soon")])).is_err());
    }

    #[test]
    fn test_validation_collects_all_issues() {
        let mut cfg = AppConfig::default();
        cfg.backend_url = "stocks.local".into();
        cfg.refresh_interval_secs = 0;
        cfg.routes.news = "news/".into();

        let msg = validate_config(&cfg).unwrap_err().to_string();
        assert!(msg.contains("backend_url"));
        assert!(msg.contains("refresh_interval_secs"));
        assert!(msg.contains("routes.news"));
    }

    #[test]
    fn test_toml_file_parses_partial_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
                prediction_url = "http://models:5000"
                initial_capital = 5000

                [routes]
                peers = "/v2/peers"
            "#,
        )
        .expect("toml should parse");

        assert_eq!(cfg.prediction_url, "http://models:5000");
        assert!((cfg.initial_capital - 5000.0).abs() < 1e-9);
        assert_eq!(cfg.routes.peers, "/v2/peers");
        assert_eq!(cfg.routes.news, "/api/news/");
    }
}
