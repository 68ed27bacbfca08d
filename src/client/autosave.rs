use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

type SaveFn<T> = Arc<dyn Fn(T) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Debounced save. Each `dispatch` restarts the timer, so only the last
/// value of a burst of edits reaches `save`.
pub struct AutoSave<T> {
    save: SaveFn<T>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> AutoSave<T> {
    pub fn new<F, Fut>(save: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::with_delay(DEFAULT_DELAY, save)
    }

    pub fn with_delay<F, Fut>(delay: Duration, save: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            save: Arc::new(move |value: T| {
                Box::pin(save(value)) as Pin<Box<dyn Future<Output = ()> + Send>>
            }),
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Drops the pending save, if any.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    /// Schedules `value` to be saved after the delay, replacing anything
    /// still waiting. Must be called inside a tokio runtime.
    pub fn dispatch(&self, value: T) {
        let save = self.save.clone();
        let delay = self.delay;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            save(value).await;
        }));
    }

    /// Saves `value` now and drops whatever was pending.
    pub async fn trigger(&self, value: T) {
        self.cancel();
        (self.save)(value).await;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for AutoSave<T> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}
