//! Maps crossterm events to kernel actions according to the focused panel.

use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::layout::{self, ShellLayout};
use crate::kernel::{Action, AppState, BufferEdit, CursorMove, FocusTarget};

const INDENT: &str = "    ";
const SCROLL_STEP: isize = 3;

pub fn map_event(state: &AppState, layout: &ShellLayout, event: Event, now: Instant) -> Vec<Action> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(state, key),
        Event::Mouse(mouse) => map_mouse(state, layout, mouse, now),
        Event::Paste(text) if state.ui.focus == FocusTarget::Editor => {
            insert_at_cursor(state, text).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

pub fn map_key(state: &AppState, key: KeyEvent) -> Vec<Action> {
    if let Some(action) = global_key(state, key) {
        return vec![action];
    }

    let action = match state.ui.focus {
        FocusTarget::Explorer => explorer_key(key),
        FocusTarget::Editor => editor_key(state, key),
        FocusTarget::Search => search_key(key),
    };
    action.into_iter().collect()
}

fn global_key(state: &AppState, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('q') if ctrl => Some(Action::Quit),
        KeyCode::Char('s') if ctrl => Some(Action::SaveActive),
        KeyCode::Char('r') if ctrl => Some(Action::RunActive),
        KeyCode::Char('w') if ctrl => Some(Action::CloseActiveTab),
        KeyCode::Char('p') if ctrl => Some(Action::TogglePinActive),
        KeyCode::Char('b') if ctrl => Some(Action::SetFocus(FocusTarget::Explorer)),
        KeyCode::Char('e') if ctrl => Some(Action::SetFocus(FocusTarget::Editor)),
        KeyCode::Char('f') if ctrl => Some(Action::SetFocus(FocusTarget::Search)),
        KeyCode::PageDown if ctrl => Some(Action::NextTab),
        KeyCode::PageUp if ctrl => Some(Action::PrevTab),
        KeyCode::Right if alt => Some(Action::NextTab),
        KeyCode::Left if alt => Some(Action::PrevTab),
        KeyCode::F(5) => Some(Action::ReloadActive),
        KeyCode::Esc if state.notifications.current().is_some() => {
            Some(Action::DismissNotification)
        }
        _ => None,
    }
}

fn explorer_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ExplorerMoveSelection { delta: -1 }),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ExplorerMoveSelection { delta: 1 }),
        KeyCode::PageUp => Some(Action::ExplorerScroll {
            delta: -SCROLL_STEP * 4,
        }),
        KeyCode::PageDown => Some(Action::ExplorerScroll {
            delta: SCROLL_STEP * 4,
        }),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Some(Action::ExplorerActivate),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::ExplorerCollapse),
        KeyCode::Char('r') => Some(Action::ExplorerRefresh),
        KeyCode::Tab => Some(Action::SetFocus(FocusTarget::Editor)),
        _ => None,
    }
}

fn editor_key(state: &AppState, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Left => Some(Action::MoveCursor(CursorMove::Left)),
        KeyCode::Right => Some(Action::MoveCursor(CursorMove::Right)),
        KeyCode::Up => Some(Action::MoveCursor(CursorMove::Up)),
        KeyCode::Down => Some(Action::MoveCursor(CursorMove::Down)),
        KeyCode::Home if ctrl => Some(Action::MoveCursor(CursorMove::DocStart)),
        KeyCode::End if ctrl => Some(Action::MoveCursor(CursorMove::DocEnd)),
        KeyCode::Home => Some(Action::MoveCursor(CursorMove::LineStart)),
        KeyCode::End => Some(Action::MoveCursor(CursorMove::LineEnd)),
        KeyCode::Esc => Some(Action::SetFocus(FocusTarget::Explorer)),
        KeyCode::Enter => insert_at_cursor(state, "\n".to_string()),
        KeyCode::Tab => insert_at_cursor(state, INDENT.to_string()),
        KeyCode::Char(ch) if !ctrl => insert_at_cursor(state, ch.to_string()),
        KeyCode::Backspace => {
            let cursor = active_cursor(state)?;
            (cursor > 0).then(|| {
                Action::Edit(BufferEdit::Delete {
                    range: cursor - 1..cursor,
                })
            })
        }
        KeyCode::Delete => {
            let cursor = active_cursor(state)?;
            Some(Action::Edit(BufferEdit::Delete {
                range: cursor..cursor + 1,
            }))
        }
        _ => None,
    }
}

fn search_key(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('c') if alt => Some(Action::SearchToggleCaseSensitive),
        KeyCode::Char('x') if alt => Some(Action::SearchToggleRegex),
        KeyCode::Char('o') if ctrl => Some(Action::SearchOpenSelected),
        KeyCode::Char(ch) if !ctrl && !alt => Some(Action::SearchAppend(ch)),
        KeyCode::Backspace => Some(Action::SearchBackspace),
        KeyCode::Enter => Some(Action::SearchStart),
        KeyCode::Up => Some(Action::SearchMoveSelection { delta: -1 }),
        KeyCode::Down => Some(Action::SearchMoveSelection { delta: 1 }),
        KeyCode::Esc => Some(Action::SetFocus(FocusTarget::Explorer)),
        _ => None,
    }
}

fn map_mouse(
    state: &AppState,
    layout: &ShellLayout,
    mouse: MouseEvent,
    now: Instant,
) -> Vec<Action> {
    let (column, row) = (mouse.column, mouse.row);
    let searching = state.ui.focus == FocusTarget::Search;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if layout::contains(layout.tab_bar, column, row) {
                let Some(tab) = layout::tab_at(state, layout.tab_bar, column)
                    .and_then(|index| state.tabs.iter().nth(index))
                else {
                    return Vec::new();
                };
                return vec![Action::ActivateTab {
                    path: tab.path.clone(),
                }];
            }
            if layout::contains(layout.editor, column, row) {
                return vec![Action::SetFocus(FocusTarget::Editor)];
            }
            if searching {
                return layout
                    .sidebar_row(column, row, state.search.scroll_offset)
                    .map(|index| {
                        let delta = index as isize - state.search.selected_index as isize;
                        vec![
                            Action::SearchMoveSelection { delta },
                            Action::SearchOpenSelected,
                        ]
                    })
                    .unwrap_or_default();
            }
            if let Some(index) = layout.sidebar_row(column, row, state.explorer.scroll_offset) {
                return vec![
                    Action::SetFocus(FocusTarget::Explorer),
                    Action::ExplorerClickRow { row: index, now },
                ];
            }
            if layout::contains(layout.sidebar, column, row) {
                return vec![Action::SetFocus(FocusTarget::Explorer)];
            }
            Vec::new()
        }
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
            if !searching && layout::contains(layout.sidebar, column, row) =>
        {
            let delta = if mouse.kind == MouseEventKind::ScrollUp {
                -SCROLL_STEP
            } else {
                SCROLL_STEP
            };
            vec![Action::ExplorerScroll { delta }]
        }
        _ => Vec::new(),
    }
}

fn active_cursor(state: &AppState) -> Option<usize> {
    let path = state.tabs.active_path()?;
    state.buffers.get(path).map(|buffer| buffer.cursor)
}

fn insert_at_cursor(state: &AppState, text: String) -> Option<Action> {
    let at = active_cursor(state)?;
    Some(Action::Edit(BufferEdit::Insert { at, text }))
}

#[cfg(test)]
#[path = "../../tests/unit/tui/input.rs"]
mod tests;
