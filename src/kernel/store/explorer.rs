use std::path::{Path, PathBuf};

use crate::kernel::events::ShellEvent;
use crate::kernel::notification::Severity;
use crate::kernel::services::ports::display_name_for;
use crate::kernel::Action;
use crate::models::Selection;

impl super::Store {
    pub(super) fn reduce_explorer_action(&mut self, action: Action) -> super::DispatchResult {
        match action {
            Action::ExplorerSetViewHeight { height } => {
                super::DispatchResult::changed(self.state.explorer.set_view_height(height))
            }
            Action::ExplorerMoveSelection { delta } => {
                super::DispatchResult::changed(self.state.explorer.move_selection(delta))
            }
            Action::ExplorerScroll { delta } => {
                super::DispatchResult::changed(self.state.explorer.scroll(delta))
            }
            Action::ExplorerActivate => {
                let Some(path) = self.state.explorer.selected_path().map(Path::to_path_buf) else {
                    return super::DispatchResult::unchanged();
                };
                self.select_path(&path)
            }
            Action::ExplorerCollapse => {
                super::DispatchResult::changed(self.state.explorer.collapse_selected())
            }
            Action::ExplorerClickRow { row, now } => {
                let (state_changed, activate) = self.state.explorer.click_row(row, now);
                let Some(path) = activate else {
                    return super::DispatchResult::changed(state_changed);
                };
                let mut result = self.select_path(&path);
                result.state_changed |= state_changed;
                result
            }
            Action::ExplorerRefresh => {
                let target = self.state.explorer.refresh_target();
                match self.state.explorer.invalidate(&target) {
                    Ok((state_changed, effects)) => super::DispatchResult {
                        effects,
                        state_changed,
                    },
                    Err(e) => {
                        tracing::debug!(path = %target.display(), error = %e, "refresh skipped");
                        super::DispatchResult::unchanged()
                    }
                }
            }
            Action::ExpandDir { path } => match self.state.explorer.expand(&path) {
                Ok((state_changed, effects)) => super::DispatchResult {
                    effects,
                    state_changed,
                },
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "expand skipped");
                    super::DispatchResult::unchanged()
                }
            },
            Action::SelectPath { path } => self.select_path(&path),
            Action::DirLoaded { path, entries } => super::DispatchResult::changed(
                self.state.explorer.apply_dir_loaded(&path, entries),
            ),
            Action::DirLoadFailed { path, error } => {
                if !self.state.explorer.apply_dir_load_error(&path) {
                    return super::DispatchResult::unchanged();
                }
                let effect = self.notify(
                    format!("Failed to load directory {}: {error}", display_name_for(&path)),
                    Severity::Error,
                );
                super::DispatchResult {
                    effects: vec![effect],
                    state_changed: true,
                }
            }
            _ => unreachable!("non-explorer action passed to reduce_explorer_action"),
        }
    }

    /// Routes a tree selection: directories toggle, files announce
    /// `FileSelected` and then open.
    fn select_path(&mut self, path: &Path) -> super::DispatchResult {
        let selection = match self.state.explorer.select(path) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "selection ignored");
                return super::DispatchResult::unchanged();
            }
        };

        match selection {
            Selection::Dir { path } => match self.state.explorer.toggle_dir(&path) {
                Ok((state_changed, effects)) => super::DispatchResult {
                    effects,
                    state_changed,
                },
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "toggle skipped");
                    super::DispatchResult::unchanged()
                }
            },
            Selection::File { path, name } => {
                self.events.publish(ShellEvent::FileSelected {
                    path: path.clone(),
                    name: name.clone(),
                });
                self.open_file(path, name)
            }
        }
    }

    pub(super) fn open_path(&mut self, path: PathBuf) -> super::DispatchResult {
        let name = display_name_for(&path);
        self.open_file(path, name)
    }
}
