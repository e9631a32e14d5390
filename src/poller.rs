//! Reusable interval-driven polling loop.
//!
//! A [`Poller`] owns at most one background task. Ticks never overlap:
//! the tick future is awaited inside the loop, so a slow status check
//! delays the next tick instead of stacking concurrent requests.
//! Calling [`start`](Poller::start) while active aborts the previous
//! task before spawning the new one, so a timer is never leaked by
//! restarting.
//!
//! The owning context must call [`pause`](Poller::pause) when it goes
//! away, otherwise polling continues indefinitely. Dropping the poller
//! pauses it as a backstop, but an `Arc`-shared poller kept alive by a
//! forgotten clone will keep ticking.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Interval loop with start/pause/is-active semantics.
pub struct Poller {
    interval: Duration,
    active: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    /// Create an inactive poller with the given tick interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    /// Tick interval this poller was created with.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking. The first tick fires one interval from now.
    ///
    /// Restart is idempotent: an already-active poller is paused first,
    /// so exactly one timer exists afterwards.
    pub fn start<F, Fut>(&self, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.pause();
        self.active.store(true, Ordering::SeqCst);

        let active = Arc::clone(&self.active);
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // tokio intervals fire immediately; swallow that tick so the
            // first real one lands a full interval after start.
            ticker.tick().await;

            while active.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !active.load(Ordering::SeqCst) {
                    break;
                }
                tick().await;
            }
            debug!("poller loop ended");
        });

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        *task = Some(handle);
    }

    /// Stop ticking and abort the background task.
    pub fn pause(&self) {
        self.active.store(false, Ordering::SeqCst);
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }

    /// Whether a polling loop is currently scheduled.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.pause();
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("interval", &self.interval)
            .field("active", &self.is_active())
            .finish()
    }
}
