//! Bounded-duration guard for a store's `loading` flag.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Default time a load may run before the UI is unstuck.
pub const DEFAULT_LOADING_TIMEOUT: Duration = Duration::from_secs(30);

/// At most one pending timer per guard. Arming replaces (and cancels) the
/// previous timer; disarming cancels it. Expiry runs the callback once and
/// never touches the request that is still in flight.
#[derive(Clone)]
pub struct LoadingGuard {
    timeout: Duration,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl LoadingGuard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            timer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&self, on_expiry: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            on_expiry();
        });
        if let Some(previous) = self.timer.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn disarm(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for LoadingGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LOADING_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let hook = {
            let fired = Arc::clone(&fired);
            move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }
        };
        (fired, hook)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_timeout() {
        let guard = LoadingGuard::new(Duration::from_secs(30));
        let (fired, hook) = counter();
        guard.arm(hook);
        assert!(guard.is_armed());

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!guard.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_cancels() {
        let guard = LoadingGuard::new(Duration::from_secs(30));
        let (fired, hook) = counter();
        guard.arm(hook);
        guard.disarm();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!guard.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_previous_timer() {
        let guard = LoadingGuard::new(Duration::from_secs(30));
        let (first, first_hook) = counter();
        let (second, second_hook) = counter();
        guard.arm(first_hook);
        tokio::time::sleep(Duration::from_secs(10)).await;
        guard.arm(second_hook);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
