//! Arrival-time HTTP client.
//!
//! One request per attempt, retried on transport failures, undecodable
//! bodies, the upstream's spurious 404s, and records missing a platform id.
//! Any other non-200 status aborts straight away.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::network::PlatformId;

use super::error::FetchError;
use super::types::{PlatformResponse, RawArrival, StationResponse};

/// Default base URL for the arrival-time API.
const DEFAULT_BASE_URL: &str = "https://connectv3.smrt.wwprojects.com/smrt/api";

/// The upstream only answers its own mobile app.
const DEFAULT_USER_AGENT: &str = "SMRT Connect/3.3.3 Android/9.0";

const STATION_PATH: &str = "train_arrival_time_by_id/";
const PLATFORM_PATH: &str = "train_arrival_time_by_platform/";

/// Pause before each retry.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Configuration for the arrival-time client.
#[derive(Debug, Clone)]
pub struct SmrtConfig {
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Delay before each retry
    pub retry_delay: Duration,
}

impl SmrtConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the delay before each retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl Default for SmrtConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Client for the station- and platform-keyed arrival endpoints.
#[derive(Debug, Clone)]
pub struct SmrtClient {
    http: reqwest::Client,
    base_url: String,
    retry_delay: Duration,
}

impl SmrtClient {
    pub fn new(config: SmrtConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_delay: config.retry_delay,
        })
    }

    /// All platform records for one station, by display name.
    ///
    /// `max_tries` must be at least 1. Returns the last error once tries run
    /// out.
    pub async fn fetch_station(
        &self,
        max_tries: u32,
        station: &str,
    ) -> Result<Vec<RawArrival>, FetchError> {
        self.with_retries(max_tries, station, || self.try_station(station))
            .await
    }

    /// Like [`SmrtClient::fetch_station`], abandoning the attempt at `deadline`.
    pub async fn fetch_station_until(
        &self,
        deadline: Instant,
        max_tries: u32,
        station: &str,
    ) -> Result<Vec<RawArrival>, FetchError> {
        tokio::time::timeout_at(deadline, self.fetch_station(max_tries, station))
            .await
            .map_err(|_| FetchError::DeadlineExceeded)?
    }

    /// The record for one platform.
    pub async fn fetch_platform(
        &self,
        max_tries: u32,
        platform: &PlatformId,
    ) -> Result<RawArrival, FetchError> {
        self.with_retries(max_tries, platform.as_str(), || self.try_platform(platform))
            .await
    }

    async fn with_retries<T, F, Fut>(
        &self,
        max_tries: u32,
        unit: &str,
        mut attempt: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut last = FetchError::NoTries;

        for tries in 1..=max_tries {
            if tries > 1 {
                tokio::time::sleep(self.retry_delay).await;
            }

            match attempt().await {
                Ok(value) => {
                    if tries > 1 {
                        debug!(unit, tries, "fetched after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() => {
                    debug!(unit, attempt = tries, error = %e, "retryable fetch error");
                    last = e;
                }
                Err(e) => {
                    warn!(unit, attempt = tries, error = %e, "unrecoverable fetch error");
                    return Err(e);
                }
            }
        }

        if max_tries > 0 {
            warn!(unit, tries = max_tries, error = %last, "fetch retries exhausted");
        }
        Err(last)
    }

    async fn try_station(&self, station: &str) -> Result<Vec<RawArrival>, FetchError> {
        let body = self.get(STATION_PATH, "station", station).await?;
        let response: StationResponse = decode(&body)?;

        if let Some(index) = response.results.iter().position(|r| !r.is_valid()) {
            return Err(FetchError::InvalidRecord {
                unit: station.to_string(),
                index,
            });
        }

        Ok(response.results)
    }

    async fn try_platform(&self, platform: &PlatformId) -> Result<RawArrival, FetchError> {
        let body = self.get(PLATFORM_PATH, "platform", platform.as_str()).await?;
        let response: PlatformResponse = decode(&body)?;

        if !response.results.is_valid() {
            return Err(FetchError::InvalidRecord {
                unit: platform.to_string(),
                index: 0,
            });
        }

        Ok(response.results)
    }

    async fn get(&self, path: &str, param: &str, unit: &str) -> Result<String, FetchError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self.http.get(&url).query(&[(param, unit)]).send().await?;
        let status = response.status();

        // Seen when the load balancer routes to a stale instance; the next
        // request usually succeeds.
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::Transient {
                status: status.as_u16(),
                unit: unit.to_string(),
            });
        }

        if status != StatusCode::OK {
            return Err(FetchError::Unrecoverable {
                status: status.as_u16(),
                unit: unit.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}
