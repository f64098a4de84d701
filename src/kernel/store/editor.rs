use std::path::{Path, PathBuf};

use crate::kernel::buffer::{LoadIntent, LoadTicket, SaveCompletion, SaveRejected};
use crate::kernel::notification::Severity;
use crate::kernel::services::ports::display_name_for;
use crate::kernel::tabs::CloseOutcome;
use crate::kernel::{Action, Effect};

impl super::Store {
    pub(super) fn reduce_editor_action(&mut self, action: Action) -> super::DispatchResult {
        match action {
            Action::OpenFile { path } => self.open_path(path),
            Action::FileLoaded { ticket, file } => self.finish_load(ticket, &file.content),
            Action::FileLoadFailed { ticket, error } => {
                if !self.state.buffers.fail_load(&ticket) {
                    tracing::debug!(path = %ticket.path.display(), "dropping stale load failure");
                    return super::DispatchResult::unchanged();
                }
                let effect = self.notify(
                    format!("Failed to open {}: {error}", display_name_for(&ticket.path)),
                    Severity::Error,
                );
                super::DispatchResult {
                    effects: vec![effect],
                    state_changed: true,
                }
            }
            Action::ActivateTab { path } => self.activate_with(|tabs| tabs.activate(&path)),
            Action::NextTab => self.activate_with(|tabs| tabs.next()),
            Action::PrevTab => self.activate_with(|tabs| tabs.prev()),
            Action::CloseTab { path } => self.close_tab(&path),
            Action::CloseActiveTab => match self.active_path() {
                Some(path) => self.close_tab(&path),
                None => super::DispatchResult::unchanged(),
            },
            Action::TogglePin { path } => {
                super::DispatchResult::changed(self.state.tabs.toggle_pin(&path).is_some())
            }
            Action::TogglePinActive => match self.active_path() {
                Some(path) => {
                    super::DispatchResult::changed(self.state.tabs.toggle_pin(&path).is_some())
                }
                None => super::DispatchResult::unchanged(),
            },
            Action::Edit(edit) => {
                let Some(path) = self.active_path() else {
                    return super::DispatchResult::unchanged();
                };
                let outcome = self.state.buffers.edit(&path, edit);
                if outcome.became_dirty {
                    self.state.tabs.set_modified(&path, true);
                }
                super::DispatchResult::changed(outcome.changed)
            }
            Action::MoveCursor(movement) => {
                let Some(path) = self.active_path() else {
                    return super::DispatchResult::unchanged();
                };
                super::DispatchResult::changed(self.state.buffers.move_cursor(&path, movement))
            }
            Action::SaveActive => {
                let Some(path) = self.active_path() else {
                    return super::DispatchResult::unchanged();
                };
                self.begin_save(&path)
            }
            Action::FileSaved { ticket, file } => {
                let name = display_name_for(&ticket.path);
                match self.state.buffers.finish_save(&ticket) {
                    SaveCompletion::Stale => {
                        tracing::debug!(path = %ticket.path.display(), "dropping stale save");
                        return super::DispatchResult::unchanged();
                    }
                    SaveCompletion::Clean => {
                        self.state.tabs.set_modified(&ticket.path, false);
                    }
                    SaveCompletion::StillDirty | SaveCompletion::Detached => {}
                }
                tracing::info!(path = %file.resolved_path.display(), "saved");
                let effect = self.notify(format!("Saved {name}"), Severity::Success);
                super::DispatchResult {
                    effects: vec![effect],
                    state_changed: true,
                }
            }
            Action::FileSaveFailed { ticket, error } => {
                if !self.state.buffers.fail_save(&ticket) {
                    tracing::debug!(path = %ticket.path.display(), "dropping stale save failure");
                    return super::DispatchResult::unchanged();
                }
                let effect = self.notify(
                    format!("Failed to save {}: {error}", display_name_for(&ticket.path)),
                    Severity::Error,
                );
                super::DispatchResult {
                    effects: vec![effect],
                    state_changed: true,
                }
            }
            Action::ReloadActive => {
                let Some(path) = self.active_path() else {
                    return super::DispatchResult::unchanged();
                };
                let ticket = self.state.buffers.begin_load(path, LoadIntent::Reload);
                super::DispatchResult {
                    effects: vec![Effect::LoadFile(ticket)],
                    state_changed: false,
                }
            }
            _ => unreachable!("non-editor action passed to reduce_editor_action"),
        }
    }

    /// Activates an already open tab, or loads the file first. The tab of a
    /// new file is only created once its content has arrived.
    pub(super) fn open_file(&mut self, path: PathBuf, display_name: String) -> super::DispatchResult {
        if self.state.tabs.contains(&path) {
            if self.state.buffers.contains(&path) {
                return self.activate_with(|tabs| tabs.activate(&path));
            }
            let ticket = self.state.buffers.begin_load(path.clone(), LoadIntent::Reload);
            let state_changed = self.state.tabs.activate(&path);
            return super::DispatchResult {
                effects: vec![Effect::LoadFile(ticket)],
                state_changed,
            };
        }

        let ticket = self
            .state
            .buffers
            .begin_load(path, LoadIntent::Open { display_name });
        super::DispatchResult {
            effects: vec![Effect::LoadFile(ticket)],
            state_changed: false,
        }
    }

    fn finish_load(&mut self, ticket: LoadTicket, content: &str) -> super::DispatchResult {
        if ticket.intent == LoadIntent::Reload && !self.state.tabs.contains(&ticket.path) {
            self.state.buffers.fail_load(&ticket);
            return super::DispatchResult::unchanged();
        }
        if !self.state.buffers.finish_load(&ticket, content) {
            return super::DispatchResult::unchanged();
        }

        match ticket.intent {
            LoadIntent::Open { display_name } => {
                self.state.tabs.open(ticket.path, display_name);
            }
            LoadIntent::Reload => {
                self.state.tabs.set_modified(&ticket.path, false);
            }
        }
        super::DispatchResult::changed(true)
    }

    /// Switching to another tab drops any load still in flight.
    fn activate_with(
        &mut self,
        activate: impl FnOnce(&mut crate::kernel::tabs::TabsState) -> bool,
    ) -> super::DispatchResult {
        let changed = activate(&mut self.state.tabs);
        if changed {
            self.state.buffers.supersede_pending();
        }
        super::DispatchResult::changed(changed)
    }

    fn close_tab(&mut self, path: &Path) -> super::DispatchResult {
        match self.state.tabs.close(path) {
            CloseOutcome::NotOpen | CloseOutcome::Pinned => super::DispatchResult::unchanged(),
            CloseOutcome::Closed { .. } => {
                if let Some(buffer) = self.state.buffers.remove(path) {
                    if buffer.dirty {
                        tracing::info!(path = %path.display(), "discarding unsaved changes");
                    }
                }
                if self.state.tabs.is_empty() {
                    self.state.buffers.clear();
                }
                super::DispatchResult::changed(true)
            }
        }
    }

    fn begin_save(&mut self, path: &Path) -> super::DispatchResult {
        match self.state.buffers.begin_save(path) {
            Ok(ticket) => {
                let content = match self.state.buffers.get(path) {
                    Some(buffer) => buffer.content.clone(),
                    None => return super::DispatchResult::unchanged(),
                };
                super::DispatchResult {
                    effects: vec![Effect::SaveFile { ticket, content }],
                    state_changed: true,
                }
            }
            Err(SaveRejected::InFlight(_)) => {
                tracing::debug!(path = %path.display(), "save already in flight");
                super::DispatchResult::unchanged()
            }
            Err(e @ SaveRejected::NotOpen(_)) => {
                tracing::debug!(error = %e, "save skipped");
                super::DispatchResult::unchanged()
            }
        }
    }

    pub(super) fn active_path(&self) -> Option<PathBuf> {
        self.state.tabs.active_path().map(Path::to_path_buf)
    }
}
