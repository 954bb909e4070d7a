//! Runtime configuration.
//!
//! Everything has a default; environment variables override individual
//! values.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::smrt::SmrtConfig;
use crate::tracker::{FetchStrategy, TrackerConfig};

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {key}={value:?}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port`, for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Everything the binary needs.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub smrt: SmrtConfig,
    pub tracker: TrackerConfig,
    /// Build revision reported by the status endpoint; empty if unknown.
    pub version: String,
}

impl AppConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    ///
    /// Recognized keys: `HOST`, `PORT`, `REFRESH_INTERVAL_SECS`,
    /// `FETCH_CONCURRENCY`, `FETCH_MAX_TRIES`, `FETCH_STRATEGY`
    /// (`station` or `platform`), `SMRT_BASE_URL` and `GIT_REV`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.server.port = parse("PORT", port)?;
        }

        if let Some(secs) = lookup("REFRESH_INTERVAL_SECS") {
            let secs: u64 = parse("REFRESH_INTERVAL_SECS", secs)?;
            if secs == 0 {
                return Err(invalid("REFRESH_INTERVAL_SECS", "0", "must be at least 1"));
            }
            config.tracker.interval = Duration::from_secs(secs);
        }
        if let Some(concurrency) = lookup("FETCH_CONCURRENCY") {
            config.tracker.batch.concurrency = parse("FETCH_CONCURRENCY", concurrency)?;
        }
        if let Some(tries) = lookup("FETCH_MAX_TRIES") {
            let tries: u32 = parse("FETCH_MAX_TRIES", tries)?;
            if tries == 0 {
                return Err(invalid("FETCH_MAX_TRIES", "0", "must be at least 1"));
            }
            config.tracker.batch.max_tries = tries;
        }
        if let Some(strategy) = lookup("FETCH_STRATEGY") {
            config.tracker.strategy = match strategy.as_str() {
                "station" => FetchStrategy::Station,
                "platform" => FetchStrategy::Platform,
                _ => {
                    return Err(invalid(
                        "FETCH_STRATEGY",
                        &strategy,
                        "expected station or platform",
                    ));
                }
            };
        }

        if let Some(url) = lookup("SMRT_BASE_URL") {
            config.smrt = config.smrt.with_base_url(url);
        }
        if let Some(rev) = lookup("GIT_REV") {
            config.version = rev;
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Display) -> ConfigError {
    ConfigError {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e| invalid(key, &value, e))
}
