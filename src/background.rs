use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::error;

/// Tracks fire-and-forget tasks so shutdown can drain them. A panic inside a
/// tracked task is caught at the join point and logged, never propagated.
#[derive(Clone, Default)]
pub struct TaskGroup {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    active: AtomicUsize,
    done: Notify,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` detached from the caller's lifetime.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::spawn(fut).await {
                error!(error = %err, "background task panicked");
            }
            if inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
                inner.done.notify_waiters();
            }
        });
    }

    /// Wait until every tracked task has finished.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.done.notified();
            if self.inner.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}
