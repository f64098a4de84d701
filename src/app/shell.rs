//! Composition root: wires the store, the async runtime and the kernel bus.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::kernel::services::adapters::{AsyncRuntime, Debouncer};
use crate::kernel::services::ports::{Settings, WorkspaceBackend};
use crate::kernel::services::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
use crate::kernel::{Action, AppState, ShellEvent, Store, Subscription};

const MAX_KERNEL_BUS_DRAIN_PER_TICK: usize = 256;

/// Owns the whole editor session.
///
/// Front ends feed it [`Action`]s and poll [`EditorShell::tick`]; redraws are
/// debounced so a burst of state changes produces a single render.
pub struct EditorShell {
    render_timer: Debouncer,
    store: Store,
    runtime: AsyncRuntime,
    bus_tx: KernelBusSender,
    bus_rx: KernelBusReceiver,
    render_debounce: Duration,
    render_due: bool,
}

impl EditorShell {
    pub fn new(
        root: PathBuf,
        settings: &Settings,
        backend: Arc<dyn WorkspaceBackend>,
    ) -> io::Result<Self> {
        let (bus_tx, bus_rx) = kernel_bus();
        let runtime = AsyncRuntime::new(backend, bus_tx.clone())?;
        let render_timer = Debouncer::new(runtime.tokio_handle());
        let store = Store::new(AppState::new(root.clone(), settings));

        let mut shell = Self {
            render_timer,
            store,
            runtime,
            bus_tx,
            bus_rx,
            render_debounce: settings.render_debounce(),
            render_due: true,
        };
        tracing::info!(root = %root.display(), "workspace opened");
        shell.dispatch(Action::ExpandDir { path: root });
        Ok(shell)
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn subscribe(&mut self) -> Subscription<ShellEvent> {
        self.store.subscribe()
    }

    pub fn should_quit(&self) -> bool {
        self.store.state().ui.should_quit
    }

    /// Reduces one action, hands its effects to the runtime and schedules a
    /// redraw when the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.runtime.execute(effect);
        }
        if result.state_changed {
            self.schedule_render();
        }
        result.state_changed
    }

    /// Drains service replies from the kernel bus. Returns whether a redraw
    /// is due.
    pub fn tick(&mut self) -> bool {
        self.dispatch(Action::Tick {
            now: Instant::now(),
        });

        let mut drained = 0usize;
        while drained < MAX_KERNEL_BUS_DRAIN_PER_TICK {
            match self.bus_rx.try_recv() {
                Ok(KernelMessage::Action(action)) => {
                    drained += 1;
                    self.dispatch(action);
                }
                Ok(KernelMessage::Render) => self.render_due = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("kernel bus disconnected");
                    break;
                }
            }
        }

        self.render_due
    }

    /// Consumes the pending redraw request.
    pub fn take_render(&mut self) -> bool {
        std::mem::take(&mut self.render_due)
    }

    fn schedule_render(&mut self) {
        if self.render_debounce.is_zero() {
            self.render_due = true;
            return;
        }
        let bus = self.bus_tx.clone();
        self.render_timer.schedule(self.render_debounce, move || {
            let _ = bus.send(KernelMessage::Render);
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/shell.rs"]
mod tests;
