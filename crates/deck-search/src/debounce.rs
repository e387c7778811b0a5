//! Single-slot debounce timer.
//!
//! At most one action is pending. Scheduling a new action aborts the previous
//! timer. A generation counter guards against a timer task that was already
//! woken when it got superseded: only the newest generation may run.

use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub struct Debouncer {
    quiet: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Run `action` once the quiet period elapses without another call to
    /// `schedule` or `cancel`.
    ///
    /// Outside a tokio runtime there is no timer to wait on, so the action
    /// runs immediately.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.abort_pending();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No tokio runtime available, running debounced action immediately");
                action();
                return;
            }
        };

        let current = Arc::clone(&self.generation);
        let quiet = self.quiet;
        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep(quiet).await;
            if current.load(Ordering::SeqCst) == generation {
                action();
            } else {
                debug!("Debounced action generation {} superseded", generation);
            }
        }));
    }

    /// Cancel the pending action, if any. Safe to call repeatedly.
    /// Returns true if an action was still waiting.
    pub fn cancel(&mut self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_pending()
    }

    /// Whether an action is waiting for its quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn abort_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(task) => {
                let was_waiting = !task.is_finished();
                task.abort();
                was_waiting
            }
            None => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (c.clone(), c)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_fire_once() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let (count, seen) = counter();

        for _ in 0..5 {
            let c = count.clone();
            debouncer.schedule(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            sleep(Duration::from_millis(100)).await;
        }
        assert!(debouncer.is_pending());
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(400)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let (count, seen) = counter();

        let c = count.clone();
        debouncer.schedule(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        sleep(Duration::from_secs(1)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_action() {
        let (count, seen) = counter();
        {
            let mut debouncer = Debouncer::new(Duration::from_millis(50));
            let c = count.clone();
            debouncer.schedule(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        sleep(Duration::from_millis(200)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_without_runtime_runs_immediately() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let (count, seen) = counter();
        let c = count.clone();
        debouncer.schedule(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }
}
