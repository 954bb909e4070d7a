//! Bounded fan-out/fan-in over a fixed set of work units.
//!
//! A fixed number of workers pull units from a shared queue and push tagged
//! results onto a result queue. The first failure cancels the batch: queued
//! units are never started, and in-flight units are dropped at their next
//! await point. A request already on the wire may still complete upstream;
//! its response is simply never read.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::cancel::CancelToken;

/// Why a batch failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError<E> {
    /// A unit failed terminally
    #[error("{0}")]
    Unit(E),

    /// The governing token was cancelled
    #[error("batch cancelled")]
    Cancelled,

    /// The batch deadline passed
    #[error("batch deadline exceeded")]
    DeadlineExceeded,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Copy)]
pub struct TaskPool {
    concurrency: usize,
}

enum Interrupt {
    /// Another worker failed; exit quietly
    Aborted,
    Cancelled,
    DeadlineExceeded,
}

impl TaskPool {
    /// A pool of `concurrency` workers. Zero means one worker per unit.
    pub fn new(concurrency: usize) -> Self {
        Self { concurrency }
    }

    fn workers_for(&self, units: usize) -> usize {
        if self.concurrency == 0 {
            units
        } else {
            self.concurrency.min(units)
        }
    }

    /// Apply `work` to every unit, at most `concurrency` at a time.
    ///
    /// Blocks until every worker has exited. On success the results are
    /// returned in completion order. On failure only the first error is
    /// returned; whatever else completed is discarded.
    pub async fn run<U, T, E, F, Fut>(
        &self,
        units: Vec<U>,
        cancel: &CancelToken,
        deadline: Instant,
        work: F,
    ) -> Result<Vec<T>, PoolError<E>>
    where
        U: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        F: Fn(U) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if units.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.workers_for(units.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(units)));
        let (tx, mut rx) = mpsc::unbounded_channel::<Result<T, PoolError<E>>>();
        let batch = CancelToken::new();
        let work = Arc::new(work);

        let mut set = JoinSet::new();
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let batch = batch.clone();
            let cancel = cancel.clone();
            let work = Arc::clone(&work);

            set.spawn(async move {
                while let Some(unit) = next_unit(&queue, &batch) {
                    let outcome = tokio::select! {
                        biased;
                        interrupt = interrupted(&cancel, &batch, deadline) => match interrupt {
                            Interrupt::Aborted => return,
                            Interrupt::Cancelled => Err(PoolError::Cancelled),
                            Interrupt::DeadlineExceeded => Err(PoolError::DeadlineExceeded),
                        },
                        result = work(unit) => result.map_err(PoolError::Unit),
                    };

                    let failed = outcome.is_err();
                    if failed {
                        batch.cancel();
                    }
                    // The receiver outlives every worker.
                    let _ = tx.send(outcome);
                    if failed {
                        return;
                    }
                }
            });
        }
        drop(tx);

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined
                && e.is_panic()
            {
                std::panic::resume_unwind(e.into_panic());
            }
        }

        let mut results = Vec::new();
        let mut first_error = None;
        while let Some(outcome) = rx.recv().await {
            match outcome {
                Ok(value) => results.push(value),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}

fn next_unit<U>(queue: &Mutex<VecDeque<U>>, batch: &CancelToken) -> Option<U> {
    if batch.is_cancelled() {
        return None;
    }
    // A poisoned queue only means another worker panicked; that panic is
    // re-raised after the join.
    let mut queue = queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    queue.pop_front()
}

async fn interrupted(cancel: &CancelToken, batch: &CancelToken, deadline: Instant) -> Interrupt {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Interrupt::Cancelled,
        _ = batch.cancelled() => Interrupt::Aborted,
        _ = tokio::time::sleep_until(deadline) => Interrupt::DeadlineExceeded,
    }
}
