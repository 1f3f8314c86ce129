//! Run watcher
//!
//! Polls a run at a fixed cadence until it reaches a terminal state or an
//! absolute deadline passes.
//!
//! The loop is a single `select!` over two timers: a poll [`Interval`] and a
//! one-shot deadline [`Sleep`]. The select is biased toward the deadline, so
//! when both are ready at the same instant the watch times out and no
//! further status query is issued. A status query in flight also races the
//! deadline, so a hung request cannot outlive the watch. Queries never
//! overlap: the next tick is only considered once the previous one returns.
//!
//! [`Interval`]: tokio::time::Interval
//! [`Sleep`]: tokio::time::Sleep

use async_trait::async_trait;
use kfp_core::domain::run::RunSnapshot;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::KfpClient;
use crate::error::{ClientError, Result};

/// Source of run observations
///
/// [`KfpClient`] implements this over HTTP.
#[async_trait]
pub trait RunStatusSource: Send + Sync {
    /// Observe the current state of a run
    async fn run_snapshot(&self, run_id: &str) -> Result<RunSnapshot>;
}

#[async_trait]
impl RunStatusSource for KfpClient {
    async fn run_snapshot(&self, run_id: &str) -> Result<RunSnapshot> {
        self.get_run(run_id).await
    }
}

#[async_trait]
impl<T: RunStatusSource + ?Sized> RunStatusSource for &T {
    async fn run_snapshot(&self, run_id: &str) -> Result<RunSnapshot> {
        (**self).run_snapshot(run_id).await
    }
}

/// Polling cadence and deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Time between status queries; the first query happens one interval in
    pub poll_interval: Duration,

    /// Absolute limit on the whole watch, measured from its start
    pub timeout: Duration,
}

impl WatchConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60 + 10 * 60);

    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject settings the poll loop cannot run with
    ///
    /// Both durations must be non-zero. Durations too large to add to the
    /// current instant are accepted and behave as "never".
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(ClientError::InvalidWatchConfig(
                "poll_interval must be greater than 0",
            ));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::InvalidWatchConfig(
                "timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_POLL_INTERVAL, Self::DEFAULT_TIMEOUT)
    }
}

/// Stand-in deadline for timeouts that overflow `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Outcome of a watch that ended in `SUCCEEDED`
#[derive(Debug, Clone)]
pub struct WatchReport {
    pub run_id: String,
    /// The observation that ended the watch
    pub snapshot: RunSnapshot,
    /// Number of status queries issued, including the last one
    pub polls: u32,
    pub elapsed: Duration,
}

/// Watches a run until it finishes
pub struct RunWatcher<S> {
    source: S,
    config: WatchConfig,
}

impl<S: RunStatusSource> RunWatcher<S> {
    pub fn new(source: S, config: WatchConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Poll until the run succeeds
    ///
    /// # Errors
    /// - [`ClientError::RunFailed`] when the run reaches `SKIPPED`, `FAILED`,
    ///   `CANCELING`, `CANCELED` or `PAUSED`
    /// - [`ClientError::TimedOut`] when the deadline passes first, including
    ///   while a status query is still in flight
    /// - [`ClientError::InvalidWatchConfig`] for a zero interval or timeout
    /// - any error from a status query, unchanged and without retry
    pub async fn wait_for_success(&self, run_id: &str) -> Result<WatchReport> {
        self.config.validate()?;

        let started = Instant::now();
        let WatchConfig {
            poll_interval,
            timeout,
        } = self.config;

        let deadline_at = started
            .checked_add(timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);
        let deadline = time::sleep_until(deadline_at);
        tokio::pin!(deadline);

        // A first tick at or past the deadline always loses to it.
        let first_poll = started
            .checked_add(poll_interval)
            .map_or(deadline_at, |at| at.min(deadline_at));
        let mut ticker = time::interval_at(first_poll, poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Watching run {} (poll interval: {:?}, timeout: {:?})",
            run_id, poll_interval, timeout
        );

        let timed_out = |polls: u32| {
            warn!("Run {} did not finish within {:?} ({} polls)", run_id, timeout, polls);
            ClientError::TimedOut {
                run_id: run_id.to_string(),
                timeout,
            }
        };

        let mut polls = 0u32;
        loop {
            tokio::select! {
                biased;

                _ = &mut deadline => return Err(timed_out(polls)),
                _ = ticker.tick() => {}
            }

            polls += 1;
            let snapshot = tokio::select! {
                biased;

                _ = &mut deadline => return Err(timed_out(polls)),
                snapshot = self.source.run_snapshot(run_id) => snapshot?,
            };
            debug!("Run {} poll #{}: {}", run_id, polls, snapshot.status);

            if snapshot.status.is_success() {
                let elapsed = started.elapsed();
                info!("Run {} succeeded after {} polls ({:?})", run_id, polls, elapsed);
                return Ok(WatchReport {
                    run_id: run_id.to_string(),
                    snapshot,
                    polls,
                    elapsed,
                });
            }

            if snapshot.status.is_failure() {
                warn!("Run {} reached terminal state {}", run_id, snapshot.status);
                return Err(ClientError::RunFailed {
                    run_id: run_id.to_string(),
                    state: snapshot.status,
                    message: snapshot.error_message,
                });
            }
        }
    }
}

impl KfpClient {
    /// Watch a run with this client until it succeeds
    ///
    /// Shorthand for `RunWatcher::new(self, config).wait_for_success(run_id)`.
    pub async fn wait_for_run(&self, run_id: &str, config: WatchConfig) -> Result<WatchReport> {
        RunWatcher::new(self, config).wait_for_success(run_id).await
    }
}
