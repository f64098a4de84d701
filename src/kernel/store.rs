use std::time::Instant;

use super::events::{EventBus, ShellEvent, Subscription};
use super::notification::Severity;
use super::{Action, AppState, Effect};

mod editor;
mod explorer;
mod run;

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }
}

/// Owns the [`AppState`] and is the only place it is mutated.
///
/// Reducers run to completion on the caller's thread; anything that needs
/// I/O is returned as an [`Effect`] and comes back later as an [`Action`].
pub struct Store {
    state: AppState,
    events: EventBus<ShellEvent>,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            events: EventBus::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn subscribe(&mut self) -> Subscription<ShellEvent> {
        self.events.subscribe()
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::Tick { now } => {
                DispatchResult::changed(self.state.notifications.expire_due(now))
            }
            Action::Quit => {
                self.state.ui.should_quit = true;
                DispatchResult::changed(true)
            }
            Action::SetFocus(target) => {
                let changed = self.state.ui.focus != target;
                self.state.ui.focus = target;
                DispatchResult::changed(changed)
            }
            Action::Notify { message, severity } => DispatchResult {
                effects: vec![self.notify(message, severity)],
                state_changed: true,
            },
            Action::DismissNotification => {
                DispatchResult::changed(self.state.notifications.dismiss())
            }
            Action::ExpireNotification { generation } => {
                DispatchResult::changed(self.state.notifications.expire(generation))
            }
            action @ (Action::ExplorerSetViewHeight { .. }
            | Action::ExplorerMoveSelection { .. }
            | Action::ExplorerScroll { .. }
            | Action::ExplorerActivate
            | Action::ExplorerCollapse
            | Action::ExplorerClickRow { .. }
            | Action::ExplorerRefresh
            | Action::ExpandDir { .. }
            | Action::SelectPath { .. }
            | Action::DirLoaded { .. }
            | Action::DirLoadFailed { .. }) => self.reduce_explorer_action(action),
            action @ (Action::RunActive
            | Action::RunFinished { .. }
            | Action::SearchSetQuery(_)
            | Action::SearchAppend(_)
            | Action::SearchBackspace
            | Action::SearchToggleCaseSensitive
            | Action::SearchToggleRegex
            | Action::SearchSetViewHeight { .. }
            | Action::SearchMoveSelection { .. }
            | Action::SearchStart
            | Action::SearchOpenSelected
            | Action::SearchFinished { .. }) => self.reduce_run_action(action),
            action => self.reduce_editor_action(action),
        }
    }

    /// Publishes a notification and returns the effect that schedules its
    /// expiry.
    fn notify(&mut self, message: impl Into<String>, severity: Severity) -> Effect {
        let message = message.into();
        if severity == Severity::Error {
            tracing::warn!(%message, "error notification");
        }
        let generation = self
            .state
            .notifications
            .publish(message.clone(), severity, Instant::now());
        self.events
            .publish(ShellEvent::ShowNotification { message, severity });
        Effect::ScheduleNotificationExpiry {
            generation,
            after: self.state.notifications.ttl(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
