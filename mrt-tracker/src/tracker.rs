//! Background refresh of the position cache.
//!
//! A single task polls the upstream on a fixed interval, infers positions
//! for every line, and publishes them along with the packed board frame.
//! Iterations never overlap: each one publishes before the next tick is
//! awaited. A failed iteration leaves the previous snapshot in place.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::board::{PackError, WiringTable, pack};
use crate::cache::{CacheError, PositionCache};
use crate::cancel::CancelToken;
use crate::model::{Arrival, Position};
use crate::network::{LineId, Network};
use crate::smrt::{
    ArrivalSource, BatchConfig, FetchError, Fetcher, platform_arrivals, station_arrivals,
};

/// Default time between refreshes.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Which upstream endpoint a refresh polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStrategy {
    /// One request per station, covering all its platforms.
    #[default]
    Station,
    /// One request per platform.
    Platform,
}

/// Configuration for the refresher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Time between refreshes; also the deadline for each one.
    pub interval: Duration,
    pub strategy: FetchStrategy,
    pub batch: BatchConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            strategy: FetchStrategy::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl TrackerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }
}

/// Errors from setting up a tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("refresh interval must be non-zero")]
    ZeroInterval,

    /// The wiring table does not fit the network
    #[error("wiring table does not fit the network: {0}")]
    Wiring(#[from] PackError),
}

/// Why one refresh iteration published nothing, or only some of it.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("publish failed: {0}")]
    Publish(#[from] CacheError),

    #[error("packing failed: {0}")]
    Pack(#[from] PackError),
}

/// Lifecycle of a [`Tracker`]. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// One refresh's worth of work, owned by the background task.
struct Refresher<S> {
    network: Network,
    wiring: WiringTable,
    fetcher: Fetcher<S>,
    strategy: FetchStrategy,
    cache: Arc<PositionCache>,
    station_names: Vec<String>,
}

impl<S: ArrivalSource> Refresher<S> {
    async fn arrivals(
        &self,
        cancel: &CancelToken,
        deadline: Instant,
    ) -> Result<HashMap<LineId, Vec<Arrival>>, FetchError> {
        let arrivals = match self.strategy {
            FetchStrategy::Station => {
                let raw = self
                    .fetcher
                    .fetch_stations(cancel, deadline, &self.station_names)
                    .await?;
                self.network
                    .lines()
                    .map(|(id, line)| (id, station_arrivals(&raw, line)))
                    .collect()
            }
            FetchStrategy::Platform => {
                let raw = self
                    .fetcher
                    .fetch_platforms(cancel, deadline, &self.network.platform_ids())
                    .await?;
                self.network
                    .lines()
                    .map(|(id, line)| (id, platform_arrivals(&raw, line)))
                    .collect()
            }
        };
        Ok(arrivals)
    }

    async fn refresh(&self, cancel: &CancelToken, deadline: Instant) -> Result<(), RefreshError> {
        let arrivals = self.arrivals(cancel, deadline).await?;
        let positions: HashMap<LineId, Position> = arrivals
            .iter()
            .map(|(id, arrivals)| (*id, Position::infer(arrivals)))
            .collect();

        let now = Utc::now();
        let published = join_all(
            positions
                .iter()
                .map(|(id, position)| self.cache.publish_line(*id, position.clone(), now)),
        )
        .await;
        for result in published {
            result?;
        }

        let frame = pack(&positions, &self.wiring)?;
        self.cache.publish_board(frame, now).await;
        Ok(())
    }

    async fn run(self, cancel: CancelToken, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let started = Instant::now();
            match self.refresh(&cancel, started + interval).await {
                Ok(()) => debug!(elapsed_ms = started.elapsed().as_millis() as u64, "refresh complete"),
                Err(RefreshError::Fetch(FetchError::Cancelled)) => break,
                Err(e) => error!(error = %e, "refresh failed, keeping previous positions"),
            }
        }
    }
}

/// Owns the refresh task and the cache it writes.
pub struct Tracker<S> {
    interval: Duration,
    refresher: Option<Refresher<S>>,
    cache: Arc<PositionCache>,
    cancel: CancelToken,
    task: Option<JoinHandle<()>>,
    state: TrackerState,
}

impl<S: ArrivalSource> Tracker<S> {
    /// Build an idle tracker.
    ///
    /// The cache starts with empty bitmaps for every line. The wiring table
    /// is checked against the network up front so that packing cannot fail
    /// on length alone at refresh time.
    pub fn new(
        config: TrackerConfig,
        network: Network,
        wiring: WiringTable,
        source: Arc<S>,
    ) -> Result<Self, TrackerError> {
        if config.interval.is_zero() {
            return Err(TrackerError::ZeroInterval);
        }

        let blank: HashMap<LineId, Position> = network
            .lines()
            .map(|(id, line)| (id, Position::empty(line.position_len())))
            .collect();
        pack(&blank, &wiring)?;

        let cache = Arc::new(PositionCache::new(&network));
        let refresher = Refresher {
            station_names: network.station_names(),
            network,
            wiring,
            fetcher: Fetcher::new(source, config.batch),
            strategy: config.strategy,
            cache: Arc::clone(&cache),
        };

        Ok(Self {
            interval: config.interval,
            refresher: Some(refresher),
            cache,
            cancel: CancelToken::new(),
            task: None,
            state: TrackerState::Idle,
        })
    }

    /// Spawn the refresh task. The first refresh starts immediately.
    pub fn start(&mut self) {
        let Some(refresher) = self.refresher.take() else {
            warn!(state = ?self.state, "tracker already started");
            return;
        };

        info!(interval_secs = self.interval.as_secs_f64(), strategy = ?refresher.strategy, "tracker starting");
        self.task = Some(tokio::spawn(refresher.run(self.cancel.clone(), self.interval)));
        self.state = TrackerState::Running;
    }

    /// Cancel the refresh task and wait for it to exit.
    ///
    /// An in-flight fetch is abandoned; anything it would have published is
    /// dropped. Calling this more than once is harmless.
    pub async fn stop(&mut self) {
        if self.state == TrackerState::Stopped {
            return;
        }

        self.state = TrackerState::Stopping;
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            error!(error = %e, "refresh task ended abnormally");
        }

        self.refresher = None;
        self.state = TrackerState::Stopped;
        info!("tracker stopped");
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// The cache this tracker publishes to, for readers.
    pub fn cache(&self) -> Arc<PositionCache> {
        Arc::clone(&self.cache)
    }
}
