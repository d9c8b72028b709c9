//! Runtime configuration for the fetch client and the cache store
//!
//! Built once at startup, from the environment and/or CLI flags, and handed to
//! each component's constructor.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the default request timeout in milliseconds
pub const TIMEOUT_ENV: &str = "API_TIMEOUT_MS";

/// Environment variable holding the cache time-to-live in minutes
pub const TTL_ENV: &str = "CACHE_TTL_MINUTES";

/// Default request timeout (10 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default cache time-to-live (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default upstream API
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Settings for the resilient fetch client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Per-attempt time bound unless a request overrides it
    pub timeout: Duration,
    /// Total attempts per logical call unless a request overrides it
    pub max_retries: u32,
    /// Wait after the first failed attempt; doubles after each further one
    pub backoff_base: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// Settings for the on-disk cache store
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Directory holding one JSON file per cache key
    pub dir: PathBuf,
    /// How long an entry stays visible after it was written
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            ttl: DEFAULT_TTL,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Upstream REST API base URL
    pub base_url: String,
    /// Fetch client settings
    pub client: ClientConfig,
    /// Cache store settings
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client: ClientConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Builds a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration using `lookup` to resolve variable names
    ///
    /// Missing, unparseable or zero values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = positive_number(lookup(TIMEOUT_ENV)) {
            config.client.timeout = Duration::from_millis(ms);
        }
        if let Some(minutes) = positive_number(lookup(TTL_ENV)) {
            config.cache.ttl = Duration::from_secs(minutes.saturating_mul(60));
        }

        config
    }
}

/// Parses a strictly positive integer, ignoring surrounding whitespace
fn positive_number(raw: Option<String>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

/// XDG cache directory (`~/.cache/fetchcache` on Linux), or `./cache`
fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "fetchcache")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("cache"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.client.timeout, Duration::from_millis(10_000));
        assert_eq!(config.client.max_retries, 3);
        assert_eq!(config.client.backoff_base, Duration::from_secs(1));
        assert_eq!(config.cache.ttl, Duration::from_secs(300));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_lookup_reads_timeout_and_ttl() {
        let config = Config::from_lookup(lookup_from(&[
            (TIMEOUT_ENV, "2500"),
            (TTL_ENV, "15"),
        ]));
        assert_eq!(config.client.timeout, Duration::from_millis(2500));
        assert_eq!(config.cache.ttl, Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_from_lookup_falls_back_on_missing_values() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_lookup_falls_back_on_garbage_and_zero() {
        let config = Config::from_lookup(lookup_from(&[
            (TIMEOUT_ENV, "soon"),
            (TTL_ENV, "0"),
        ]));
        assert_eq!(config.client.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.cache.ttl, DEFAULT_TTL);
    }

    #[test]
    fn test_default_cache_dir_mentions_project() {
        let dir = default_cache_dir();
        let path_str = dir.to_string_lossy();
        assert!(
            path_str.contains("fetchcache") || path_str == "cache",
            "Unexpected cache dir: {}",
            path_str
        );
    }
}
