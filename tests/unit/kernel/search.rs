use super::*;
use std::path::PathBuf;

fn hit(line: usize) -> SearchMatch {
    SearchMatch {
        path: PathBuf::from("/p/a.lvl"),
        line,
        text: format!("line {line}"),
    }
}

#[test]
fn empty_query_does_not_start() {
    let mut state = SearchState::default();
    assert_eq!(state.begin_search(), None);
    assert!(!state.searching);
}

#[test]
fn results_for_superseded_search_are_dropped() {
    let mut state = SearchState::default();
    state.set_query("fn".to_string());
    let first = state.begin_search().unwrap();
    let second = state.begin_search().unwrap();
    assert_ne!(first, second);

    assert!(!state.apply_results(first, vec![hit(1)]));
    assert!(state.searching);
    assert!(state.apply_results(second, vec![hit(2), hit(3)]));
    assert!(!state.searching);
    assert_eq!(state.results.len(), 2);
}

#[test]
fn error_is_recorded_for_active_search_only() {
    let mut state = SearchState::default();
    state.set_query("(".to_string());
    let id = state.begin_search().unwrap();

    assert!(!state.apply_error(id + 1, "nope".to_string()));
    assert!(state.apply_error(id, "Invalid regex pattern".to_string()));
    assert_eq!(state.last_error.as_deref(), Some("Invalid regex pattern"));
}

#[test]
fn query_editing_handles_multibyte_chars() {
    let mut state = SearchState::default();
    state.append_query_char('a');
    state.append_query_char('é');
    assert_eq!(state.query, "aé");
    assert!(state.backspace_query());
    assert_eq!(state.query, "a");
    assert!(state.backspace_query());
    assert!(!state.backspace_query());
}

#[test]
fn selection_wraps_and_stays_visible() {
    let mut state = SearchState::default();
    state.set_query("x".to_string());
    let id = state.begin_search().unwrap();
    state.apply_results(id, (1..=5).map(hit).collect());
    state.set_view_height(2);

    assert!(state.move_selection(-1));
    assert_eq!(state.selected_index, 4);
    assert_eq!(state.scroll_offset, 3);
    assert!(state.move_selection(1));
    assert_eq!(state.selected_index, 0);
    assert_eq!(state.scroll_offset, 0);
    assert_eq!(state.selected().unwrap().line, 1);
}
