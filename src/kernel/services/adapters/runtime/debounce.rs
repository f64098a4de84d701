use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Runs at most one delayed task at a time. Scheduling again aborts the task
/// that is still waiting, so only the last request fires.
pub struct Debouncer {
    handle: Handle,
    pending: Option<AbortHandle>,
}

impl Debouncer {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, delay: Duration, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            fire();
        });
        self.pending = Some(task.abort_handle());
    }

    /// Returns whether a waiting task was aborted.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
