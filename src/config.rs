//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// OMDb endpoint
    pub omdb_url: String,
    /// OMDb API key; lookups fail upstream without one
    pub omdb_api_key: Option<String>,
    /// Idle time in seconds before a cached movie is evicted
    pub cache_ttl: u64,
    /// Seconds between cache sweeps
    pub cache_sweep_interval: u64,
    /// Requests admitted per client per window
    pub rate_limit: u32,
    /// Rate limit window in seconds
    pub rate_window: u64,
    /// Seconds between purges of idle rate-limit clients
    pub rate_purge_interval: u64,
    /// Identify clients by the first `X-Forwarded-For` hop. Only safe behind
    /// a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `OMDB_URL` - OMDb endpoint (default: http://www.omdbapi.com/)
    /// - `OMDB_KEY` - OMDb API key (no default)
    /// - `CACHE_TTL` - Cache idle TTL in seconds (default: 3600)
    /// - `CACHE_SWEEP_INTERVAL` - Cache sweep frequency in seconds (default: 15)
    /// - `RATE_LIMIT` - Requests per window per client (default: 100)
    /// - `RATE_WINDOW` - Rate limit window in seconds (default: 60)
    /// - `RATE_PURGE_INTERVAL` - Idle client purge frequency in seconds (default: 60)
    /// - `TRUST_FORWARDED_FOR` - Key rate limits on `X-Forwarded-For` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            omdb_url: env::var("OMDB_URL").unwrap_or(defaults.omdb_url),
            omdb_api_key: env::var("OMDB_KEY").ok().filter(|key| !key.is_empty()),
            cache_ttl: parse_env("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            cache_sweep_interval: parse_env("CACHE_SWEEP_INTERVAL")
                .unwrap_or(defaults.cache_sweep_interval),
            rate_limit: parse_env("RATE_LIMIT").unwrap_or(defaults.rate_limit),
            rate_window: parse_env("RATE_WINDOW").unwrap_or(defaults.rate_window),
            rate_purge_interval: parse_env("RATE_PURGE_INTERVAL")
                .unwrap_or(defaults.rate_purge_interval),
            trust_forwarded_for: parse_env("TRUST_FORWARDED_FOR")
                .unwrap_or(defaults.trust_forwarded_for),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn rate_purge_interval(&self) -> Duration {
        Duration::from_secs(self.rate_purge_interval)
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            omdb_url: "http://www.omdbapi.com/".to_string(),
            omdb_api_key: None,
            cache_ttl: 3600,
            cache_sweep_interval: 15,
            rate_limit: 100,
            rate_window: 60,
            rate_purge_interval: 60,
            trust_forwarded_for: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.cache_sweep_interval(), Duration::from_secs(15));
        assert_eq!(config.rate_limit, 100);
        assert_eq!(config.rate_window(), Duration::from_secs(60));
        assert_eq!(config.rate_purge_interval(), Duration::from_secs(60));
        assert!(config.omdb_api_key.is_none());
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn test_config_from_env() {
        env::remove_var("SERVER_PORT");
        env::remove_var("OMDB_KEY");
        env::set_var("CACHE_TTL", "120");
        env::set_var("RATE_LIMIT", "not-a-number");
        env::set_var("TRUST_FORWARDED_FOR", "true");

        let config = Config::from_env();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cache_ttl, 120);
        assert_eq!(config.rate_limit, 100, "Unparseable values fall back to defaults");
        assert!(config.omdb_api_key.is_none());
        assert!(config.trust_forwarded_for);

        env::remove_var("CACHE_TTL");
        env::remove_var("RATE_LIMIT");
        env::remove_var("TRUST_FORWARDED_FOR");
    }
}
