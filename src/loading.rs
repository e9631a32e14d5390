//! Debounced busy-indicator policy.
//!
//! Every transport call holds a [`LoadingGuard`] for its lifetime, so
//! the shared pending counter is incremented and decremented exactly
//! once per request on every exit path, including early returns and
//! panics. The indicator only becomes visible after the counter has
//! stayed above zero for a full debounce window (300 ms by default),
//! which keeps fast calls from flickering it; it hides the moment the
//! counter returns to zero.
//!
//! The coordinator schedules its debounce timer on the current tokio
//! runtime, so `show` must be called from within one.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// How long the counter must stay positive before the indicator shows.
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

type ChangeListener = Box<dyn Fn(bool) + Send + Sync>;

struct LoadingInner {
    pending: AtomicI32,
    visible: AtomicBool,
    debounce: Duration,
    show_timer: Mutex<Option<JoinHandle<()>>>,
    on_change: RwLock<Option<ChangeListener>>,
}

impl LoadingInner {
    fn clear_timer(&self) {
        let mut timer = self
            .show_timer
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = timer.take() {
            handle.abort();
        }
    }

    /// Decrement the counter, floored at zero; settle when it reaches zero.
    fn release(&self) {
        let previous = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                if count > 0 {
                    Some(count - 1)
                } else {
                    None
                }
            });
        if previous == Ok(1) {
            self.settle();
        }
    }

    fn settle(&self) {
        self.clear_timer();
        if self.visible.swap(false, Ordering::SeqCst) {
            debug!("loading indicator hidden");
            self.notify(false);
        }
    }

    fn notify(&self, visible: bool) {
        let listener = self
            .on_change
            .read()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(f) = listener.as_ref() {
            f(visible);
        }
    }
}

fn acquire(inner: &Arc<LoadingInner>) {
    let previous = inner.pending.fetch_add(1, Ordering::SeqCst);
    if previous == 0 {
        arm_timer(inner);
    }
}

/// Arm the one-shot debounce timer, replacing any armed one.
fn arm_timer(inner: &Arc<LoadingInner>) {
    let mut timer = inner
        .show_timer
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    if let Some(handle) = timer.take() {
        handle.abort();
    }
    let inner = Arc::clone(inner);
    *timer = Some(tokio::spawn(async move {
        tokio::time::sleep(inner.debounce).await;
        if inner.pending.load(Ordering::SeqCst) > 0
            && !inner.visible.swap(true, Ordering::SeqCst)
        {
            debug!("loading indicator shown");
            inner.notify(true);
        }
    }));
}

/// Reference-counted, debounced visibility policy for the global busy
/// indicator.
#[derive(Clone)]
pub struct LoadingCoordinator {
    inner: Arc<LoadingInner>,
}

impl LoadingCoordinator {
    /// Create a coordinator with a custom debounce window.
    pub fn new(debounce: Duration) -> Self {
        Self {
            inner: Arc::new(LoadingInner {
                pending: AtomicI32::new(0),
                visible: AtomicBool::new(false),
                debounce,
                show_timer: Mutex::new(None),
                on_change: RwLock::new(None),
            }),
        }
    }

    /// Register the UI callback invoked on visibility transitions.
    pub fn set_on_change(&self, f: impl Fn(bool) + Send + Sync + 'static) {
        let mut listener = self
            .inner
            .on_change
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *listener = Some(Box::new(f));
    }

    /// Increment the pending counter and return a guard that decrements
    /// it on drop.
    pub fn begin(&self) -> LoadingGuard {
        acquire(&self.inner);
        LoadingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Increment the pending counter. Prefer [`begin`](Self::begin),
    /// which cannot leak the matching `hide`.
    pub fn show(&self) {
        acquire(&self.inner);
    }

    /// Decrement the pending counter, floored at zero.
    pub fn hide(&self) {
        self.inner.release();
    }

    /// Forcibly zero the counter, cancel timers, and hide the indicator.
    ///
    /// Recovery hatch for inconsistent state after an uncaught failure.
    pub fn reset(&self) {
        self.inner.pending.store(0, Ordering::SeqCst);
        self.inner.settle();
    }

    /// Number of requests currently in flight.
    pub fn pending_count(&self) -> i32 {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Whether the indicator is currently visible.
    pub fn is_visible(&self) -> bool {
        self.inner.visible.load(Ordering::SeqCst)
    }
}

impl Default for LoadingCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl std::fmt::Debug for LoadingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingCoordinator")
            .field("pending", &self.pending_count())
            .field("visible", &self.is_visible())
            .finish()
    }
}

/// RAII pairing for one transport call: created by
/// [`LoadingCoordinator::begin`], decrements the counter when dropped.
pub struct LoadingGuard {
    inner: Arc<LoadingInner>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.inner.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use tokio::time::{advance, sleep};

    #[tokio::test(start_paused = true)]
    async fn test_fast_calls_never_show() {
        let loading = LoadingCoordinator::default();

        // Five overlapping calls, all settled well inside the window.
        for _ in 0..5 {
            loading.show();
        }
        sleep(Duration::from_millis(50)).await;
        for _ in 0..5 {
            loading.hide();
        }
        sleep(Duration::from_millis(100)).await;

        advance(Duration::from_millis(500)).await;
        assert_eq!(loading.pending_count(), 0);
        assert!(!loading.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_shows_then_hides() {
        let shows = Arc::new(AtomicU32::new(0));
        let hides = Arc::new(AtomicU32::new(0));
        let loading = LoadingCoordinator::default();
        {
            let shows = Arc::clone(&shows);
            let hides = Arc::clone(&hides);
            loading.set_on_change(move |visible| {
                if visible {
                    shows.fetch_add(1, Ordering::SeqCst);
                } else {
                    hides.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        let guard = loading.begin();
        sleep(Duration::from_millis(350)).await;
        assert!(loading.is_visible());
        assert_eq!(shows.load(Ordering::SeqCst), 1);

        drop(guard);
        sleep(Duration::from_millis(10)).await;
        assert!(!loading.is_visible());
        assert_eq!(loading.pending_count(), 0);
        assert_eq!(hides.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_to_zero_cancels_armed_timer() {
        let loading = LoadingCoordinator::default();
        loading.show();
        sleep(Duration::from_millis(100)).await;
        loading.hide();

        // The armed timer must not fire later.
        sleep(Duration::from_millis(400)).await;
        assert!(!loading.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_everything() {
        let loading = LoadingCoordinator::default();
        loading.show();
        loading.show();
        sleep(Duration::from_millis(350)).await;
        assert!(loading.is_visible());

        loading.reset();
        assert_eq!(loading.pending_count(), 0);
        assert!(!loading.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbalanced_hide_floors_at_zero() {
        let loading = LoadingCoordinator::default();
        loading.hide();
        loading.hide();
        assert_eq!(loading.pending_count(), 0);

        // The floor must not absorb a later legitimate show.
        loading.show();
        assert_eq!(loading.pending_count(), 1);
        loading.hide();
        assert_eq!(loading.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_releases_on_early_exit() {
        let loading = LoadingCoordinator::default();

        fn bails_out(loading: &LoadingCoordinator) -> Result<(), ()> {
            let _guard = loading.begin();
            Err(())
        }

        let _ = bails_out(&loading);
        assert_eq!(loading.pending_count(), 0);
    }
}
