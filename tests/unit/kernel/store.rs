use super::*;
use crate::kernel::buffer::{BufferEdit, LoadIntent, LoadTicket, SaveTicket};
use crate::kernel::services::ports::{
    CompileOutput, DirEntryInfo, LoadedFile, SavedFile, SearchMatch, ServiceError, Settings,
};
use std::path::{Path, PathBuf};

fn new_store() -> Store {
    Store::new(AppState::new(PathBuf::from("/proj"), &Settings::default()))
}

fn load_ticket(effects: &[Effect]) -> LoadTicket {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::LoadFile(ticket) => Some(ticket.clone()),
            _ => None,
        })
        .expect("load effect")
}

fn save_ticket(effects: &[Effect]) -> SaveTicket {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::SaveFile { ticket, .. } => Some(ticket.clone()),
            _ => None,
        })
        .expect("save effect")
}

fn loaded(ticket: LoadTicket, content: &str) -> Action {
    let resolved_path = ticket.path.clone();
    Action::FileLoaded {
        ticket,
        file: LoadedFile {
            content: content.to_string(),
            resolved_path,
        },
    }
}

fn open(store: &mut Store, path: &str, content: &str) -> PathBuf {
    let result = store.dispatch(Action::OpenFile {
        path: PathBuf::from(path),
    });
    let ticket = load_ticket(&result.effects);
    assert!(store.dispatch(loaded(ticket, content)).state_changed);
    PathBuf::from(path)
}

fn expand_proj(store: &mut Store) {
    let result = store.dispatch(Action::ExpandDir {
        path: PathBuf::from("/proj"),
    });
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::ListDirectory(p)] if p == Path::new("/proj")
    ));
    store.dispatch(Action::DirLoaded {
        path: PathBuf::from("/proj"),
        entries: vec![
            DirEntryInfo::dir("/proj/src"),
            DirEntryInfo::file("/proj/main.lvl"),
        ],
    });
}

fn buffer_text(store: &Store, path: &Path) -> String {
    store.state().buffers.get(path).unwrap().text()
}

fn edit_insert(text: &str) -> Action {
    Action::Edit(BufferEdit::Insert {
        at: 0,
        text: text.to_string(),
    })
}

#[test]
fn expanding_root_lists_children_in_returned_order() {
    let mut store = new_store();
    expand_proj(&mut store);

    let rows = &store.state().explorer.rows;
    let names: Vec<_> = rows.iter().map(|r| (r.name.as_str(), r.is_dir)).collect();
    assert_eq!(names, vec![("src", true), ("main.lvl", false)]);
}

#[test]
fn expanding_twice_fetches_once() {
    let mut store = new_store();
    let root = PathBuf::from("/proj");

    let first = store.dispatch(Action::ExpandDir { path: root.clone() });
    assert_eq!(first.effects.len(), 1);
    let second = store.dispatch(Action::ExpandDir { path: root.clone() });
    assert!(second.effects.is_empty());

    store.dispatch(Action::DirLoaded {
        path: root.clone(),
        entries: Vec::new(),
    });
    let third = store.dispatch(Action::ExpandDir { path: root });
    assert!(third.effects.is_empty());
}

#[test]
fn selecting_file_emits_exactly_one_file_selected() {
    let mut store = new_store();
    let mut events = store.subscribe();
    expand_proj(&mut store);

    let result = store.dispatch(Action::SelectPath {
        path: PathBuf::from("/proj/main.lvl"),
    });

    assert_eq!(
        events.drain(),
        vec![ShellEvent::FileSelected {
            path: PathBuf::from("/proj/main.lvl"),
            name: "main.lvl".to_string(),
        }]
    );
    let ticket = load_ticket(&result.effects);
    assert_eq!(
        ticket.intent,
        LoadIntent::Open {
            display_name: "main.lvl".to_string()
        }
    );
    assert!(store.state().tabs.is_empty());

    store.dispatch(loaded(ticket, "print 1"));
    let tab = store.state().tabs.active_tab().unwrap();
    assert_eq!(tab.path, PathBuf::from("/proj/main.lvl"));
    assert_eq!(tab.display_name, "main.lvl");
}

#[test]
fn selecting_directory_toggles_without_file_selected() {
    let mut store = new_store();
    let mut events = store.subscribe();
    expand_proj(&mut store);

    let result = store.dispatch(Action::SelectPath {
        path: PathBuf::from("/proj/src"),
    });
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::ListDirectory(p)] if p == Path::new("/proj/src")
    ));
    assert!(events.drain().is_empty());
}

#[test]
fn keyboard_activation_opens_selected_file() {
    let mut store = new_store();
    let mut events = store.subscribe();
    expand_proj(&mut store);

    store.dispatch(Action::ExplorerMoveSelection { delta: 1 });
    store.dispatch(Action::ExplorerMoveSelection { delta: 1 });
    let result = store.dispatch(Action::ExplorerActivate);

    assert_eq!(load_ticket(&result.effects).path, PathBuf::from("/proj/main.lvl"));
    assert_eq!(events.drain().len(), 1);
}

#[test]
fn late_response_for_older_load_is_dropped() {
    let mut store = new_store();
    let a = store.dispatch(Action::OpenFile {
        path: PathBuf::from("/proj/a.lvl"),
    });
    let b = store.dispatch(Action::OpenFile {
        path: PathBuf::from("/proj/b.lvl"),
    });
    let (ta, tb) = (load_ticket(&a.effects), load_ticket(&b.effects));

    assert!(store.dispatch(loaded(tb, "B")).state_changed);
    assert!(!store.dispatch(loaded(ta, "A")).state_changed);

    let state = store.state();
    assert_eq!(state.tabs.len(), 1);
    assert_eq!(state.tabs.active_path(), Some(Path::new("/proj/b.lvl")));
    assert_eq!(buffer_text(&store, Path::new("/proj/b.lvl")), "B");
    assert!(state.buffers.get(Path::new("/proj/a.lvl")).is_none());
}

#[test]
fn switching_tabs_supersedes_pending_reload() {
    let mut store = new_store();
    let a = open(&mut store, "/proj/a.lvl", "A");
    let b = open(&mut store, "/proj/b.lvl", "B");

    let reload = store.dispatch(Action::ReloadActive);
    let ticket = load_ticket(&reload.effects);
    assert_eq!(ticket.path, b);

    store.dispatch(Action::ActivateTab { path: a.clone() });
    assert!(!store.dispatch(loaded(ticket, "B from disk")).state_changed);
    assert_eq!(buffer_text(&store, &b), "B");
    assert_eq!(store.state().tabs.active_path(), Some(a.as_path()));
}

#[test]
fn failed_first_load_creates_no_tab() {
    let mut store = new_store();
    let mut events = store.subscribe();
    let result = store.dispatch(Action::OpenFile {
        path: PathBuf::from("/proj/gone.lvl"),
    });
    let ticket = load_ticket(&result.effects);

    let failed = store.dispatch(Action::FileLoadFailed {
        ticket,
        error: ServiceError::NotFound {
            path: PathBuf::from("/proj/gone.lvl"),
        },
    });

    assert!(store.state().tabs.is_empty());
    assert!(store.state().buffers.is_empty());
    let note = store.state().notifications.current().unwrap();
    assert_eq!(note.severity, Severity::Error);
    assert!(note.message.contains("gone.lvl"));
    assert!(matches!(
        failed.effects.as_slice(),
        [Effect::ScheduleNotificationExpiry { .. }]
    ));
    assert!(matches!(
        events.drain().as_slice(),
        [ShellEvent::ShowNotification {
            severity: Severity::Error,
            ..
        }]
    ));
}

#[test]
fn open_edit_save_round_trip() {
    let mut store = new_store();
    let path = open(&mut store, "/proj/a.lvl", "x = 1\r\n");

    assert!(store.dispatch(edit_insert("# ")).state_changed);
    assert!(store.state().tabs.get(&path).unwrap().modified);

    let save = store.dispatch(Action::SaveActive);
    let ticket = save_ticket(&save.effects);
    match &save.effects[0] {
        Effect::SaveFile { content, .. } => assert_eq!(content.to_string(), "# x = 1\r\n"),
        other => panic!("unexpected effect {other:?}"),
    }

    let again = store.dispatch(Action::SaveActive);
    assert!(again.effects.is_empty());

    store.dispatch(Action::FileSaved {
        ticket,
        file: SavedFile {
            resolved_path: path.clone(),
        },
    });
    assert!(!store.state().tabs.get(&path).unwrap().modified);
    assert!(!store.state().buffers.get(&path).unwrap().dirty);
    assert_eq!(
        store.state().notifications.current().unwrap().severity,
        Severity::Success
    );
}

#[test]
fn edit_during_save_keeps_tab_modified() {
    let mut store = new_store();
    let path = open(&mut store, "/proj/a.lvl", "a");
    store.dispatch(edit_insert("1"));
    let ticket = save_ticket(&store.dispatch(Action::SaveActive).effects);
    store.dispatch(edit_insert("2"));

    store.dispatch(Action::FileSaved {
        ticket,
        file: SavedFile {
            resolved_path: path.clone(),
        },
    });
    assert!(store.state().tabs.get(&path).unwrap().modified);
    assert!(store.state().buffers.get(&path).unwrap().dirty);
}

#[test]
fn failed_save_keeps_dirty_and_allows_retry() {
    let mut store = new_store();
    let path = open(&mut store, "/proj/a.lvl", "a");
    store.dispatch(edit_insert("1"));
    let ticket = save_ticket(&store.dispatch(Action::SaveActive).effects);

    store.dispatch(Action::FileSaveFailed {
        ticket,
        error: ServiceError::PermissionDenied { path: path.clone() },
    });
    assert!(store.state().buffers.get(&path).unwrap().dirty);
    assert_eq!(
        store.state().notifications.current().unwrap().severity,
        Severity::Error
    );
    assert_eq!(store.dispatch(Action::SaveActive).effects.len(), 1);
}

#[test]
fn reload_during_save_blocks_a_second_save() {
    let mut store = new_store();
    let path = open(&mut store, "/proj/a.lvl", "a");
    store.dispatch(edit_insert("1"));
    let first = save_ticket(&store.dispatch(Action::SaveActive).effects);

    let reload = load_ticket(&store.dispatch(Action::ReloadActive).effects);
    store.dispatch(loaded(reload, "a"));
    store.dispatch(edit_insert("2"));
    assert!(store.dispatch(Action::SaveActive).effects.is_empty());

    store.dispatch(Action::FileSaved {
        ticket: first,
        file: SavedFile {
            resolved_path: path.clone(),
        },
    });
    assert!(store.state().buffers.get(&path).unwrap().dirty);
    assert_eq!(store.dispatch(Action::SaveActive).effects.len(), 1);
}

#[test]
fn close_and_reopen_during_save_blocks_a_second_save() {
    let mut store = new_store();
    let path = open(&mut store, "/proj/a.lvl", "a");
    store.dispatch(edit_insert("1"));
    let first = save_ticket(&store.dispatch(Action::SaveActive).effects);

    store.dispatch(Action::CloseTab { path: path.clone() });
    open(&mut store, "/proj/a.lvl", "a");
    store.dispatch(edit_insert("2"));
    assert!(store.dispatch(Action::SaveActive).effects.is_empty());

    store.dispatch(Action::FileSaved {
        ticket: first,
        file: SavedFile {
            resolved_path: path.clone(),
        },
    });
    assert!(store.state().tabs.get(&path).unwrap().modified);
    assert!(store.state().buffers.get(&path).unwrap().dirty);
    assert_eq!(store.dispatch(Action::SaveActive).effects.len(), 1);
}

#[test]
fn failed_save_of_closed_tab_still_notifies() {
    let mut store = new_store();
    let path = open(&mut store, "/proj/a.lvl", "a");
    store.dispatch(edit_insert("1"));
    let ticket = save_ticket(&store.dispatch(Action::SaveActive).effects);
    store.dispatch(Action::DismissNotification);
    store.dispatch(Action::CloseTab { path: path.clone() });

    let result = store.dispatch(Action::FileSaveFailed {
        ticket: ticket.clone(),
        error: ServiceError::PermissionDenied { path: path.clone() },
    });
    assert!(result.state_changed);
    let note = store.state().notifications.current().unwrap();
    assert_eq!(note.severity, Severity::Error);
    assert!(note.message.starts_with("Failed to save a.lvl"));
    assert!(!store.state().buffers.save_in_flight(&path));

    store.dispatch(Action::DismissNotification);
    let repeat = store.dispatch(Action::FileSaveFailed {
        ticket,
        error: ServiceError::PermissionDenied { path },
    });
    assert!(!repeat.state_changed);
    assert!(store.state().notifications.current().is_none());
}

#[test]
fn per_tab_buffers_survive_switching() {
    let mut store = new_store();
    let a = open(&mut store, "/proj/a.lvl", "A");
    let b = open(&mut store, "/proj/b.lvl", "B");

    store.dispatch(edit_insert("b-"));
    let switch = store.dispatch(Action::ActivateTab { path: a.clone() });
    assert!(switch.effects.is_empty());
    store.dispatch(edit_insert("a-"));
    store.dispatch(Action::ActivateTab { path: b.clone() });

    assert_eq!(buffer_text(&store, &a), "a-A");
    assert_eq!(buffer_text(&store, &b), "b-B");
    assert!(store.state().tabs.iter().all(|t| t.modified));
}

#[test]
fn reopening_open_file_activates_without_loading() {
    let mut store = new_store();
    let a = open(&mut store, "/proj/a.lvl", "A");
    open(&mut store, "/proj/b.lvl", "B");

    let result = store.dispatch(Action::OpenFile { path: a.clone() });
    assert!(result.effects.is_empty());
    assert!(result.state_changed);
    assert_eq!(store.state().tabs.len(), 2);
    assert_eq!(store.state().tabs.active_path(), Some(a.as_path()));
}

#[test]
fn closing_active_tab_drops_its_buffer() {
    let mut store = new_store();
    let a = open(&mut store, "/proj/a.lvl", "A");
    let b = open(&mut store, "/proj/b.lvl", "B");
    let c = open(&mut store, "/proj/c.lvl", "C");
    store.dispatch(Action::ActivateTab { path: b.clone() });

    assert!(store.dispatch(Action::CloseActiveTab).state_changed);
    assert_eq!(store.state().tabs.active_path(), Some(a.as_path()));
    assert!(store.state().buffers.get(&b).is_none());

    store.dispatch(Action::CloseTab { path: a });
    store.dispatch(Action::CloseTab { path: c });
    assert_eq!(store.state().tabs.active_path(), None);
    assert!(store.state().buffers.is_empty());
}

#[test]
fn pinned_tab_survives_close() {
    let mut store = new_store();
    let a = open(&mut store, "/proj/a.lvl", "A");
    open(&mut store, "/proj/b.lvl", "B");

    store.dispatch(Action::TogglePin { path: a.clone() });
    assert!(!store.dispatch(Action::CloseTab { path: a.clone() }).state_changed);
    assert!(store.state().tabs.contains(&a));
    assert!(store.state().buffers.contains(&a));
}

#[test]
fn only_one_run_at_a_time() {
    let mut store = new_store();
    let path = open(&mut store, "/proj/a.lvl", "print 1");

    let first = store.dispatch(Action::RunActive);
    let request_id = first
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::CompileAndRun { request_id, path: p } if p == &path => Some(*request_id),
            _ => None,
        })
        .expect("compile effect");

    let second = store.dispatch(Action::RunActive);
    assert!(!second
        .effects
        .iter()
        .any(|e| matches!(e, Effect::CompileAndRun { .. })));

    store.dispatch(Action::RunFinished {
        request_id,
        result: Ok(CompileOutput {
            output: "1".to_string(),
        }),
    });
    let report = store.state().run.last.as_ref().unwrap();
    assert!(report.success);
    assert_eq!(report.output, "1");
    assert!(store.state().run.in_flight.is_none());
}

#[test]
fn failed_run_reports_captured_output() {
    let mut store = new_store();
    open(&mut store, "/proj/a.lvl", "oops");
    let first = store.dispatch(Action::RunActive);
    let Some(Effect::CompileAndRun { request_id, .. }) = first.effects.first().cloned() else {
        panic!("expected compile effect first");
    };

    store.dispatch(Action::RunFinished {
        request_id,
        result: Err(ServiceError::CompileFailure {
            code: Some(1),
            output: "syntax error".to_string(),
        }),
    });
    let report = store.state().run.last.as_ref().unwrap();
    assert!(!report.success);
    assert_eq!(report.output, "syntax error");
}

#[test]
fn superseded_search_results_are_dropped() {
    let mut store = new_store();
    store.dispatch(Action::SearchSetQuery("print".to_string()));
    assert!(store.dispatch(Action::SearchSetQuery(String::new())).state_changed);
    assert!(store.dispatch(Action::SearchStart).effects.is_empty());

    store.dispatch(Action::SearchSetQuery("print".to_string()));
    let search_id = |r: &DispatchResult| match r.effects.as_slice() {
        [Effect::SearchInFiles { search_id, .. }] => *search_id,
        other => panic!("unexpected effects {other:?}"),
    };
    let first = search_id(&store.dispatch(Action::SearchStart));
    let second = search_id(&store.dispatch(Action::SearchStart));

    let hit = SearchMatch {
        path: PathBuf::from("/proj/a.lvl"),
        line: 1,
        text: "print 1".to_string(),
    };
    assert!(!store
        .dispatch(Action::SearchFinished {
            search_id: first,
            result: Ok(vec![hit.clone()]),
        })
        .state_changed);
    assert!(store
        .dispatch(Action::SearchFinished {
            search_id: second,
            result: Ok(vec![hit]),
        })
        .state_changed);

    let open = store.dispatch(Action::SearchOpenSelected);
    assert_eq!(load_ticket(&open.effects).path, PathBuf::from("/proj/a.lvl"));
}

#[test]
fn stale_notification_expiry_is_ignored() {
    let mut store = new_store();
    let generation = |r: &DispatchResult| match r.effects.as_slice() {
        [Effect::ScheduleNotificationExpiry { generation, .. }] => *generation,
        other => panic!("unexpected effects {other:?}"),
    };
    let first = generation(&store.dispatch(Action::Notify {
        message: "one".to_string(),
        severity: Severity::Info,
    }));
    let second = generation(&store.dispatch(Action::Notify {
        message: "two".to_string(),
        severity: Severity::Info,
    }));

    assert!(!store
        .dispatch(Action::ExpireNotification { generation: first })
        .state_changed);
    assert_eq!(store.state().notifications.current().unwrap().message, "two");
    assert!(store
        .dispatch(Action::ExpireNotification { generation: second })
        .state_changed);
    assert!(store.state().notifications.current().is_none());
}

#[test]
fn failed_listing_resets_directory_and_notifies() {
    let mut store = new_store();
    store.dispatch(Action::ExpandDir {
        path: PathBuf::from("/proj"),
    });

    let result = store.dispatch(Action::DirLoadFailed {
        path: PathBuf::from("/proj"),
        error: ServiceError::PermissionDenied {
            path: PathBuf::from("/proj"),
        },
    });
    assert!(result.state_changed);
    assert!(!store.state().explorer.tree().is_expanded(Path::new("/proj")));

    let retry = store.dispatch(Action::ExpandDir {
        path: PathBuf::from("/proj"),
    });
    assert_eq!(retry.effects.len(), 1);
}

#[test]
fn refresh_refetches_expanded_directory() {
    let mut store = new_store();
    expand_proj(&mut store);

    let result = store.dispatch(Action::ExplorerRefresh);
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::ListDirectory(p)] if p == Path::new("/proj")
    ));
    assert!(store.state().explorer.rows.is_empty());
}
