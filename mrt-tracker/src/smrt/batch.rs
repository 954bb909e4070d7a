//! Batch fetching across many stations or platforms.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::network::PlatformId;
use crate::pool::TaskPool;

use super::client::SmrtClient;
use super::error::FetchError;
use super::types::RawArrival;

/// Default attempts per unit.
const DEFAULT_MAX_TRIES: u32 = 10;

/// Trait for fetching a single unit of arrival data.
///
/// This abstraction allows the fetcher and tracker to be tested with mock
/// data.
pub trait ArrivalSource: Send + Sync + 'static {
    /// All platform records at one station, by display name.
    fn fetch_station(
        &self,
        max_tries: u32,
        station: &str,
    ) -> impl Future<Output = Result<Vec<RawArrival>, FetchError>> + Send;

    /// The record for one platform.
    fn fetch_platform(
        &self,
        max_tries: u32,
        platform: &PlatformId,
    ) -> impl Future<Output = Result<RawArrival, FetchError>> + Send;
}

impl ArrivalSource for SmrtClient {
    fn fetch_station(
        &self,
        max_tries: u32,
        station: &str,
    ) -> impl Future<Output = Result<Vec<RawArrival>, FetchError>> + Send {
        SmrtClient::fetch_station(self, max_tries, station)
    }

    fn fetch_platform(
        &self,
        max_tries: u32,
        platform: &PlatformId,
    ) -> impl Future<Output = Result<RawArrival, FetchError>> + Send {
        SmrtClient::fetch_platform(self, max_tries, platform)
    }
}

/// Batch fetch parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of concurrent workers; 0 runs every unit at once.
    pub concurrency: usize,
    /// Attempts per unit, at least 1.
    pub max_tries: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 0,
            max_tries: DEFAULT_MAX_TRIES,
        }
    }
}

/// Fans unit fetches out over a bounded pool.
///
/// The first unit to fail terminally cancels the rest of the batch, and
/// only that error is returned. Partial results are never surfaced.
pub struct Fetcher<S> {
    source: Arc<S>,
    config: BatchConfig,
}

impl<S: ArrivalSource> Fetcher<S> {
    pub fn new(source: Arc<S>, config: BatchConfig) -> Self {
        Self { source, config }
    }

    /// Fetch every station, keyed by the name each response reports.
    ///
    /// Responses are keyed by their own `mrt` field rather than the name
    /// requested. If the upstream ever echoes a different name, two stations
    /// can collide and one is lost; that is logged but not corrected. An
    /// empty record set has nothing to report and is keyed by the request.
    pub async fn fetch_stations(
        &self,
        cancel: &CancelToken,
        deadline: Instant,
        stations: &[String],
    ) -> Result<HashMap<String, Vec<RawArrival>>, FetchError> {
        let source = Arc::clone(&self.source);
        let max_tries = self.config.max_tries;

        let responses = TaskPool::new(self.config.concurrency)
            .run(stations.to_vec(), cancel, deadline, move |station: String| {
                let source = Arc::clone(&source);
                async move {
                    let records = source.fetch_station(max_tries, &station).await?;
                    Ok::<_, FetchError>((station, records))
                }
            })
            .await?;

        let mut out = HashMap::with_capacity(responses.len());
        for (requested, records) in responses {
            let key = match records.first() {
                Some(first) => {
                    if first.mrt != requested {
                        warn!(requested = %requested, reported = %first.mrt, "station response reports a different name");
                    }
                    first.mrt.clone()
                }
                None => requested,
            };
            out.insert(key, records);
        }

        debug!(requested = stations.len(), received = out.len(), "station batch complete");
        Ok(out)
    }

    /// Fetch every platform, keyed by the platform id each response reports.
    pub async fn fetch_platforms(
        &self,
        cancel: &CancelToken,
        deadline: Instant,
        platforms: &[PlatformId],
    ) -> Result<HashMap<PlatformId, RawArrival>, FetchError> {
        let source = Arc::clone(&self.source);
        let max_tries = self.config.max_tries;

        let responses = TaskPool::new(self.config.concurrency)
            .run(platforms.to_vec(), cancel, deadline, move |platform: PlatformId| {
                let source = Arc::clone(&source);
                async move {
                    let record = source.fetch_platform(max_tries, &platform).await?;
                    Ok::<_, FetchError>((platform, record))
                }
            })
            .await?;

        let mut out = HashMap::with_capacity(responses.len());
        for (requested, record) in responses {
            if record.platform_id != requested.as_str() {
                warn!(requested = %requested, reported = %record.platform_id, "platform response reports a different id");
            }
            out.insert(PlatformId::from_reported(record.platform_id.clone()), record);
        }

        debug!(requested = platforms.len(), received = out.len(), "platform batch complete");
        Ok(out)
    }
}
