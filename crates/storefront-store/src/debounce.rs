//! Trailing-edge debouncing for bursty input such as search-as-you-type.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay used for search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs only the last of a burst of calls, `wait` after that call.
///
/// A superseded call never starts; a call that has already started is
/// not interrupted.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule `f`, superseding any call still waiting.
    pub fn call<F, Fut>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let wait = self.wait;
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            if generation.load(Ordering::SeqCst) == mine {
                f().await;
            }
        })
    }

    /// Drop the waiting call, if any.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for term in ["l", "la", "lam"] {
            let seen = Arc::clone(&seen);
            handles.push(debouncer.call(move || async move {
                seen.lock().push(term);
            }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*seen.lock(), vec!["lam"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let seen = Arc::new(Mutex::new(0));

        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            debouncer
                .call(move || async move {
                    *seen.lock() += 1;
                })
                .await
                .unwrap();
        }
        assert_eq!(*seen.lock(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        let handle = debouncer.call(move || async move {
            *counter.lock() += 1;
        });
        debouncer.cancel();
        handle.await.unwrap();
        assert_eq!(*seen.lock(), 0);
    }
}
