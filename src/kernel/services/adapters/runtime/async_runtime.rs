use std::io;
use std::sync::Arc;

use super::debounce::Debouncer;
use crate::kernel::services::bus::KernelBusSender;
use crate::kernel::services::ports::{ServiceFuture, ServiceResult, WorkspaceBackend};
use crate::kernel::{Action, Effect};

/// Executes store effects on a tokio runtime. Every backend call reports its
/// outcome back to the UI thread as an [`Action`] on the kernel bus.
pub struct AsyncRuntime {
    notification_timer: Debouncer,
    backend: Arc<dyn WorkspaceBackend>,
    bus: KernelBusSender,
    runtime: tokio::runtime::Runtime,
}

impl AsyncRuntime {
    pub fn new(backend: Arc<dyn WorkspaceBackend>, bus: KernelBusSender) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        let notification_timer = Debouncer::new(runtime.handle().clone());
        Ok(Self {
            notification_timer,
            backend,
            bus,
            runtime,
        })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::ListDirectory(path) => {
                let future = self.backend.list_directory(path.clone());
                self.reply(future, move |result| match result {
                    Ok(entries) => Action::DirLoaded { path, entries },
                    Err(error) => Action::DirLoadFailed { path, error },
                });
            }
            Effect::LoadFile(ticket) => {
                let future = self.backend.load_file(ticket.path.clone());
                self.reply(future, move |result| match result {
                    Ok(file) => Action::FileLoaded { ticket, file },
                    Err(error) => Action::FileLoadFailed { ticket, error },
                });
            }
            Effect::SaveFile { ticket, content } => {
                let future = self
                    .backend
                    .save_file(ticket.path.clone(), content.to_string());
                self.reply(future, move |result| match result {
                    Ok(file) => Action::FileSaved { ticket, file },
                    Err(error) => Action::FileSaveFailed { ticket, error },
                });
            }
            Effect::CompileAndRun { request_id, path } => {
                let future = self.backend.compile_and_run(path);
                self.reply(future, move |result| Action::RunFinished { request_id, result });
            }
            Effect::SearchInFiles {
                search_id,
                root,
                query,
            } => {
                let future = self.backend.search_in_files(root, query);
                self.reply(future, move |result| Action::SearchFinished { search_id, result });
            }
            Effect::ScheduleNotificationExpiry { generation, after } => {
                let bus = self.bus.clone();
                self.notification_timer.schedule(after, move || {
                    let _ = bus.send_action(Action::ExpireNotification { generation });
                });
            }
        }
    }

    fn reply<T, F>(&self, future: ServiceFuture<T>, into_action: F)
    where
        T: Send + 'static,
        F: FnOnce(ServiceResult<T>) -> Action + Send + 'static,
    {
        let bus = self.bus.clone();
        self.runtime.spawn(async move {
            let action = into_action(future.await);
            if bus.send_action(action).is_err() {
                tracing::debug!("kernel bus closed, dropping service result");
            }
        });
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/async_runtime.rs"]
mod tests;
