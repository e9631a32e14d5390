//! Long-running operation tracking.
//!
//! Library refreshes, monitor scans and symlink rebuilds finish long
//! after the request that started them. An [`OperationTracker`] owns
//! one such operation: it polls a caller-supplied status check on a
//! [`Poller`], advances a monotonic progress value, and settles into a
//! terminal state exactly once. The [`OperationRegistry`] is the active
//! set the console reads progress from, with a grace period before
//! finished entries are swept out.
//!
//! State machine: `Pending -> Running -> {Succeeded, Failed}`. Once
//! terminal, nothing mutates the handle again - a stray tick that was
//! already in flight when the operation settled is discarded.

use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::poller::Poller;

/// Lifecycle of one long-running server operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl OperationState {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Pending,
            1 => Self::Running,
            2 => Self::Succeeded,
            _ => Self::Failed,
        }
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Minimal contract a status-check endpoint must return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatus {
    pub state: OperationState,
    pub progress: u8,
}

/// Tuning for one tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Gap between status checks.
    pub poll_interval: Duration,
    /// Consecutive check failures tolerated before the operation fails.
    pub max_check_failures: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_check_failures: 3,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

struct TrackerInner {
    state: AtomicU8,
    progress: AtomicU8,
    consecutive_failures: AtomicU32,
    last_error: Mutex<Option<ApiError>>,
    started_at: DateTime<Utc>,
    last_polled_at: Mutex<Option<DateTime<Utc>>>,
    terminal_at: Mutex<Option<Instant>>,
}

impl TrackerInner {
    fn state(&self) -> OperationState {
        OperationState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Raise progress to `reported`, never lowering it. Out-of-order
    /// poll responses therefore cannot walk the bar backwards.
    fn advance_progress(&self, reported: u8) {
        self.progress.fetch_max(reported.min(100), Ordering::SeqCst);
    }

    /// Transition into a terminal state; returns false when already
    /// terminal, in which case nothing is mutated.
    fn try_complete(&self, next: OperationState, failure: Option<ApiError>) -> bool {
        loop {
            let current = self.state.load(Ordering::SeqCst);
            if OperationState::from_u8(current).is_terminal() {
                return false;
            }
            if self
                .state
                .compare_exchange(current, next as u8, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                if let Some(err) = failure {
                    *lock(&self.last_error) = Some(err);
                }
                *lock(&self.terminal_at) = Some(Instant::now());
                return true;
            }
        }
    }

    fn terminal_elapsed(&self) -> Option<Duration> {
        lock(&self.terminal_at).map(|at| at.elapsed())
    }
}

/// Tracks one named long-running server operation.
pub struct OperationTracker {
    id: String,
    config: TrackerConfig,
    inner: Arc<TrackerInner>,
    poller: Arc<Poller>,
}

impl OperationTracker {
    /// Create a tracker in `Pending`. Nothing happens until
    /// [`start`](Self::start).
    pub fn new(id: impl Into<String>, config: TrackerConfig) -> Self {
        let poller = Arc::new(Poller::new(config.poll_interval));
        Self {
            id: id.into(),
            config,
            inner: Arc::new(TrackerInner {
                state: AtomicU8::new(OperationState::Pending as u8),
                progress: AtomicU8::new(0),
                consecutive_failures: AtomicU32::new(0),
                last_error: Mutex::new(None),
                started_at: Utc::now(),
                last_polled_at: Mutex::new(None),
                terminal_at: Mutex::new(None),
            }),
            poller,
        }
    }

    /// Transition to `Running` and begin polling `check`.
    pub fn start<F, Fut>(&self, check: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<OperationStatus>> + Send + 'static,
    {
        if self
            .inner
            .state
            .compare_exchange(
                OperationState::Pending as u8,
                OperationState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
        {
            info!(id = %self.id, "operation tracking started");
        }

        let id = self.id.clone();
        let inner = Arc::clone(&self.inner);
        let poller = Arc::clone(&self.poller);
        let check = Arc::new(check);
        let max_failures = self.config.max_check_failures;
        self.poller.start(move || {
            let id = id.clone();
            let inner = Arc::clone(&inner);
            let poller = Arc::clone(&poller);
            let check = Arc::clone(&check);
            async move {
                poll_once(&id, &inner, &poller, check.as_ref(), max_failures).await;
            }
        });
    }

    /// Stop polling and mark the operation failed with a cancellation
    /// marker. Usable from any non-terminal state; a no-op afterwards.
    pub fn cancel(&self) {
        if self
            .inner
            .try_complete(OperationState::Failed, Some(ApiError::Cancelled))
        {
            info!(id = %self.id, "operation cancelled");
        }
        self.poller.pause();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> OperationState {
        self.inner.state()
    }

    /// Last-known-maximum progress, 0..=100.
    pub fn progress(&self) -> u8 {
        self.inner.progress.load(Ordering::SeqCst)
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Whether the status-check loop is still scheduled.
    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// The failure that settled this operation, when there was one.
    pub fn last_error(&self) -> Option<ApiError> {
        lock(&self.inner.last_error).clone()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    pub fn last_polled_at(&self) -> Option<DateTime<Utc>> {
        *lock(&self.inner.last_polled_at)
    }

    /// Time since the operation settled, when it has.
    pub fn terminal_elapsed(&self) -> Option<Duration> {
        self.inner.terminal_elapsed()
    }
}

impl std::fmt::Debug for OperationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationTracker")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("progress", &self.progress())
            .finish()
    }
}

/// One poll tick. Terminal checks bracket the await so a response that
/// raced with cancellation cannot mutate a settled handle.
async fn poll_once<F, Fut>(
    id: &str,
    inner: &Arc<TrackerInner>,
    poller: &Poller,
    check: &F,
    max_failures: u32,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = ApiResult<OperationStatus>>,
{
    if inner.state().is_terminal() {
        poller.pause();
        return;
    }
    *lock(&inner.last_polled_at) = Some(Utc::now());

    match check().await {
        Ok(status) => {
            if inner.state().is_terminal() {
                debug!(id, "discarding stray status after terminal state");
                return;
            }
            inner.consecutive_failures.store(0, Ordering::SeqCst);
            inner.advance_progress(status.progress);
            match status.state {
                OperationState::Succeeded => {
                    inner.advance_progress(100);
                    if inner.try_complete(OperationState::Succeeded, None) {
                        info!(id, "operation succeeded");
                    }
                    poller.pause();
                }
                OperationState::Failed => {
                    if inner.try_complete(OperationState::Failed, None) {
                        warn!(id, "operation reported failure");
                    }
                    poller.pause();
                }
                _ => {
                    debug!(id, progress = inner.progress.load(Ordering::SeqCst), "operation running");
                }
            }
        }
        Err(err) => {
            if inner.state().is_terminal() {
                return;
            }
            let failures = inner.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
            warn!(id, failures, max_failures, error = %err, "status check failed");
            if failures >= max_failures {
                if inner.try_complete(OperationState::Failed, Some(err)) {
                    error!(id, "operation failed after repeated status check errors");
                }
                poller.pause();
            }
        }
    }
}

/// Default time a settled operation stays visible in the registry.
const DEFAULT_GRACE: Duration = Duration::from_secs(30);

/// Active set of trackers, keyed by operation id.
pub struct OperationRegistry {
    trackers: DashMap<String, Arc<OperationTracker>>,
    grace: Duration,
}

impl OperationRegistry {
    /// Create a registry with a custom terminal grace period.
    pub fn new(grace: Duration) -> Self {
        Self {
            trackers: DashMap::new(),
            grace,
        }
    }

    /// Create, start and register a tracker for `id`.
    ///
    /// An existing tracker under the same id is cancelled and replaced,
    /// so restarting an operation never races two pollers for it.
    pub fn begin<F, Fut>(
        &self,
        id: impl Into<String>,
        config: TrackerConfig,
        check: F,
    ) -> Arc<OperationTracker>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<OperationStatus>> + Send + 'static,
    {
        let id = id.into();
        if let Some((_, previous)) = self.trackers.remove(&id) {
            previous.cancel();
            debug!(id, "replaced existing tracker");
        }
        let tracker = Arc::new(OperationTracker::new(id.clone(), config));
        tracker.start(check);
        self.trackers.insert(id, Arc::clone(&tracker));
        tracker
    }

    /// Look up the tracker for an operation id.
    pub fn get(&self, id: &str) -> Option<Arc<OperationTracker>> {
        self.trackers.get(id).map(|entry| Arc::clone(&entry))
    }

    /// Progress of an operation, if it is in the active set.
    pub fn progress_of(&self, id: &str) -> Option<u8> {
        self.get(id).map(|t| t.progress())
    }

    /// Drop entries that have been terminal for longer than the grace
    /// period.
    pub fn sweep(&self) {
        self.trackers.retain(|_, tracker| {
            match tracker.terminal_elapsed() {
                Some(elapsed) => elapsed < self.grace,
                None => true,
            }
        });
    }

    /// Cancel every active tracker. For context teardown.
    pub fn cancel_all(&self) {
        for entry in self.trackers.iter() {
            entry.value().cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}
