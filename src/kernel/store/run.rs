use crate::kernel::notification::Severity;
use crate::kernel::services::ports::{display_name_for, SearchQuery};
use crate::kernel::state::RunReport;
use crate::kernel::{Action, Effect};

impl super::Store {
    pub(super) fn reduce_run_action(&mut self, action: Action) -> super::DispatchResult {
        match action {
            Action::RunActive => {
                let Some(path) = self.active_path() else {
                    let effect = self.notify("No file is open", Severity::Info);
                    return super::DispatchResult {
                        effects: vec![effect],
                        state_changed: true,
                    };
                };
                let Some(request_id) = self.state.run.begin(path.clone()) else {
                    let effect = self.notify("A run is already in progress", Severity::Info);
                    return super::DispatchResult {
                        effects: vec![effect],
                        state_changed: true,
                    };
                };
                let effect = self.notify(
                    format!("Running {}...", display_name_for(&path)),
                    Severity::Info,
                );
                super::DispatchResult {
                    effects: vec![Effect::CompileAndRun { request_id, path }, effect],
                    state_changed: true,
                }
            }
            Action::RunFinished { request_id, result } => {
                let Some(path) = self.state.run.finish(request_id) else {
                    tracing::debug!(request_id, "dropping stale run result");
                    return super::DispatchResult::unchanged();
                };
                let name = display_name_for(&path);
                let (report, effect) = match result {
                    Ok(out) => (
                        RunReport {
                            path,
                            success: true,
                            output: out.output,
                        },
                        self.notify(format!("{name} ran successfully"), Severity::Success),
                    ),
                    Err(e) => (
                        RunReport {
                            path,
                            success: false,
                            output: e.output().map(str::to_string).unwrap_or_else(|| e.to_string()),
                        },
                        self.notify(format!("Run of {name} failed: {e}"), Severity::Error),
                    ),
                };
                self.state.run.last = Some(report);
                super::DispatchResult {
                    effects: vec![effect],
                    state_changed: true,
                }
            }
            Action::SearchSetQuery(query) => {
                super::DispatchResult::changed(self.state.search.set_query(query))
            }
            Action::SearchAppend(ch) => {
                super::DispatchResult::changed(self.state.search.append_query_char(ch))
            }
            Action::SearchBackspace => {
                super::DispatchResult::changed(self.state.search.backspace_query())
            }
            Action::SearchToggleCaseSensitive => {
                super::DispatchResult::changed(self.state.search.toggle_case_sensitive())
            }
            Action::SearchToggleRegex => {
                super::DispatchResult::changed(self.state.search.toggle_regex())
            }
            Action::SearchSetViewHeight { height } => {
                super::DispatchResult::changed(self.state.search.set_view_height(height))
            }
            Action::SearchMoveSelection { delta } => {
                super::DispatchResult::changed(self.state.search.move_selection(delta))
            }
            Action::SearchStart => {
                let Some(search_id) = self.state.search.begin_search() else {
                    return super::DispatchResult::unchanged();
                };
                let query = SearchQuery {
                    pattern: self.state.search.query.clone(),
                    case_sensitive: self.state.search.case_sensitive,
                    use_regex: self.state.search.use_regex,
                };
                super::DispatchResult {
                    effects: vec![Effect::SearchInFiles {
                        search_id,
                        root: self.state.workspace_root.clone(),
                        query,
                    }],
                    state_changed: true,
                }
            }
            Action::SearchOpenSelected => {
                let Some(path) = self.state.search.selected().map(|m| m.path.clone()) else {
                    return super::DispatchResult::unchanged();
                };
                self.open_path(path)
            }
            Action::SearchFinished { search_id, result } => match result {
                Ok(matches) => {
                    let count = matches.len();
                    if !self.state.search.apply_results(search_id, matches) {
                        return super::DispatchResult::unchanged();
                    }
                    tracing::debug!(search_id, count, "search finished");
                    super::DispatchResult::changed(true)
                }
                Err(e) => {
                    if !self.state.search.apply_error(search_id, e.to_string()) {
                        return super::DispatchResult::unchanged();
                    }
                    let effect = self.notify(format!("Search failed: {e}"), Severity::Error);
                    super::DispatchResult {
                        effects: vec![effect],
                        state_changed: true,
                    }
                }
            },
            _ => unreachable!("non-run action passed to reduce_run_action"),
        }
    }
}
