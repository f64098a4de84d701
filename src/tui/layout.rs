use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::UnicodeWidthStr;

use crate::kernel::{AppState, FocusTarget};

const STATUS_HEIGHT: u16 = 1;
const TAB_BAR_HEIGHT: u16 = 1;
const SIDEBAR_WIDTH_PERCENT: u16 = 25;
const SIDEBAR_MIN_WIDTH: u16 = 20;
const RUN_PANEL_HEIGHT: u16 = 8;

/// Screen regions shared by the renderer and the mouse router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShellLayout {
    pub sidebar: Rect,
    /// Rows of the explorer or the search results, inside the border.
    pub sidebar_content: Rect,
    pub tab_bar: Rect,
    pub editor: Rect,
    pub editor_content: Rect,
    pub run_panel: Option<Rect>,
    pub status: Rect,
}

impl ShellLayout {
    pub fn compute(state: &AppState, area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)])
            .split(area);
        let (body, status) = (rows[0], rows[1]);

        let sidebar_width = sidebar_width(body.width);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
            .split(body);
        let (sidebar, main) = (columns[0], columns[1]);

        let sidebar_inner = inner(sidebar);
        // The search panel spends two rows on the query and the option flags.
        let sidebar_content = if state.ui.focus == FocusTarget::Search {
            Rect {
                y: sidebar_inner.y.saturating_add(2),
                height: sidebar_inner.height.saturating_sub(2),
                ..sidebar_inner
            }
        } else {
            sidebar_inner
        };

        let show_run = state.run.in_flight.is_some() || state.run.last.is_some();
        let main_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(if show_run { RUN_PANEL_HEIGHT } else { 0 }),
            ])
            .split(main);
        let run_panel = (show_run && main_rows[2].height > 0).then_some(main_rows[2]);

        Self {
            sidebar,
            sidebar_content,
            tab_bar: main_rows[0],
            editor: main_rows[1],
            editor_content: inner(main_rows[1]),
            run_panel,
            status,
        }
    }

    /// Maps a screen row inside the sidebar content to an absolute list row.
    pub fn sidebar_row(&self, column: u16, row: u16, scroll_offset: usize) -> Option<usize> {
        contains(self.sidebar_content, column, row)
            .then(|| scroll_offset + (row - self.sidebar_content.y) as usize)
    }
}

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Text drawn for one tab; the tab bar separates labels with one column.
pub fn tab_label(name: &str, modified: bool, pinned: bool) -> String {
    let pin = if pinned { "^" } else { "" };
    let dirty = if modified { " *" } else { "" };
    format!(" {pin}{name}{dirty} ")
}

/// Index of the tab drawn under `column`, if any.
pub fn tab_at(state: &AppState, bar: Rect, column: u16) -> Option<usize> {
    if column < bar.x {
        return None;
    }
    let mut x = bar.x as usize;
    let target = column as usize;
    for (index, tab) in state.tabs.iter().enumerate() {
        let width = tab_label(&tab.display_name, tab.modified, tab.pinned).width() + 1;
        if target < x + width {
            return Some(index);
        }
        x += width;
    }
    None
}

fn sidebar_width(total: u16) -> u16 {
    let width = total.saturating_mul(SIDEBAR_WIDTH_PERCENT) / 100;
    width.max(SIDEBAR_MIN_WIDTH).min(total)
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tui/layout.rs"]
mod tests;
