use super::*;
use crate::kernel::services::ports::Settings;
use crate::kernel::RunReport;
use std::path::PathBuf;

fn state() -> AppState {
    AppState::new(PathBuf::from("/proj"), &Settings::default())
}

#[test]
fn regions_tile_the_screen() {
    let layout = ShellLayout::compute(&state(), Rect::new(0, 0, 100, 30));

    assert_eq!(layout.status, Rect::new(0, 29, 100, 1));
    assert_eq!(layout.sidebar, Rect::new(0, 0, 25, 29));
    assert_eq!(layout.sidebar_content, Rect::new(1, 1, 23, 27));
    assert_eq!(layout.tab_bar, Rect::new(25, 0, 75, 1));
    assert_eq!(layout.editor, Rect::new(25, 1, 75, 28));
    assert!(layout.run_panel.is_none());
}

#[test]
fn run_panel_appears_after_a_run() {
    let mut state = state();
    state.run.last = Some(RunReport {
        path: PathBuf::from("/proj/main.lvl"),
        success: true,
        output: "ok".to_string(),
    });

    let layout = ShellLayout::compute(&state, Rect::new(0, 0, 100, 30));
    let panel = layout.run_panel.unwrap();
    assert_eq!(panel.height, 8);
    assert_eq!(layout.editor.height + panel.height, 27);
}

#[test]
fn search_focus_reserves_query_rows() {
    let mut state = state();
    state.ui.focus = FocusTarget::Search;

    let layout = ShellLayout::compute(&state, Rect::new(0, 0, 100, 30));
    assert_eq!(layout.sidebar_content, Rect::new(1, 3, 23, 25));
}

#[test]
fn sidebar_row_accounts_for_scroll() {
    let layout = ShellLayout::compute(&state(), Rect::new(0, 0, 100, 30));

    assert_eq!(layout.sidebar_row(2, 1, 0), Some(0));
    assert_eq!(layout.sidebar_row(2, 4, 10), Some(13));
    assert_eq!(layout.sidebar_row(2, 0, 0), None);
    assert_eq!(layout.sidebar_row(40, 4, 0), None);
}

#[test]
fn tab_hit_testing_follows_label_widths() {
    let mut state = state();
    state
        .tabs
        .open(PathBuf::from("/proj/a.lvl"), "a.lvl".to_string());
    state
        .tabs
        .open(PathBuf::from("/proj/bb.lvl"), "bb.lvl".to_string());
    let bar = Rect::new(25, 0, 75, 1);

    // " a.lvl " is 7 columns plus one separator.
    assert_eq!(tab_at(&state, bar, 25), Some(0));
    assert_eq!(tab_at(&state, bar, 32), Some(0));
    assert_eq!(tab_at(&state, bar, 33), Some(1));
    assert_eq!(tab_at(&state, bar, 80), None);
    assert_eq!(tab_at(&state, bar, 10), None);
}

#[test]
fn tab_labels_mark_pinned_and_modified() {
    assert_eq!(tab_label("a.lvl", false, false), " a.lvl ");
    assert_eq!(tab_label("a.lvl", true, true), " ^a.lvl * ");
}
