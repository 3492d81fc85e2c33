use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_RESULT_LIMIT: usize = 5;
pub const DEFAULT_PACING_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(String),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub google_cse_id: String,
    pub search_endpoint: String,
    pub result_limit: usize,
    pub pacing: Duration,
    pub search_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is the usual entry point.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            google_api_key: get_env(&lookup, "GOOGLE_API_KEY")?,
            google_cse_id: get_env(&lookup, "GOOGLE_CSE_ID")?,
            search_endpoint: get_env_or_default(&lookup, "SEARCH_ENDPOINT", DEFAULT_SEARCH_ENDPOINT),
            result_limit: parse_env_or(&lookup, "SEARCH_RESULT_LIMIT", DEFAULT_RESULT_LIMIT)?,
            pacing: Duration::from_millis(parse_env_or(
                &lookup,
                "RELAY_PACING_MS",
                DEFAULT_PACING_MS,
            )?),
            search_timeout: Duration::from_secs(parse_env_or(
                &lookup,
                "SEARCH_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            bind_addr: parse_value(
                "BIND_ADDR",
                get_env_or_default(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR),
            )?,
        })
    }
}

fn get_env<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_env_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => parse_value(key, value),
    }
}

fn parse_value<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value,
    })
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
    fn test_defaults_applied() {
        let config =
            Config::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "k"), ("GOOGLE_CSE_ID", "cx")]))
                .unwrap();

        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert_eq!(config.result_limit, 5);
        assert_eq!(config.pacing, Duration::from_millis(1000));
        assert_eq!(config.search_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup_from(&[("GOOGLE_CSE_ID", "cx")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref k) if k == "GOOGLE_API_KEY"));
    }

    #[test]
    fn test_blank_required_value_is_missing() {
        let err = Config::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "k"), ("GOOGLE_CSE_ID", "  ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref k) if k == "GOOGLE_CSE_ID"));
    }

    #[test]
    fn test_overrides_and_invalid_numbers() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("GOOGLE_CSE_ID", "cx"),
            ("RELAY_PACING_MS", "250"),
            ("SEARCH_RESULT_LIMIT", "8"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();
        assert_eq!(config.pacing, Duration::from_millis(250));
        assert_eq!(config.result_limit, 8);
        assert_eq!(config.bind_addr.port(), 8080);

        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("GOOGLE_CSE_ID", "cx"),
            ("RELAY_PACING_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "RELAY_PACING_MS"));

        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("GOOGLE_CSE_ID", "cx"),
            ("BIND_ADDR", "localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "BIND_ADDR"));
    }
}
