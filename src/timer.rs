use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A one-shot timer cancellable from another task.
///
/// `cancel` both flips an atomic flag (checked right before the callback
/// would run, closing the race where cancellation arrives mid-sleep) and
/// aborts the underlying task (closing the race where cancellation arrives
/// after the sleep has already elapsed but before the callback polled).
pub struct Timer {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Timer {
    pub fn start<F, Fut>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_in_task = Arc::clone(&cancelled);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !cancelled_in_task.load(Ordering::Acquire) {
                callback().await;
            }
        });

        Timer { cancelled, handle }
    }

    /// Cancel the timer. A no-op if it has already fired.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn fires_after_delay_when_not_cancelled() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_cb = Arc::clone(&fired);
        let _timer = Timer::start(Duration::from_millis(10), move || async move {
            fired_cb.fetch_add(1, Ordering::Relaxed);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn cancel_before_fire_suppresses_callback() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_cb = Arc::clone(&fired);
        let timer = Timer::start(Duration::from_millis(50), move || async move {
            fired_cb.fetch_add(1, Ordering::Relaxed);
        });

        timer.cancel();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(fired.load(Ordering::Relaxed), 0);
    }
}
