use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::layout::{tab_label, ShellLayout};
use crate::kernel::{AppState, FocusTarget, Severity};
use crate::models::LoadState;

const SELECTED: Style = Style::new().bg(Color::DarkGray);
const DIM: Style = Style::new().fg(Color::DarkGray);

pub fn render(state: &AppState, frame: &mut Frame, layout: &ShellLayout) {
    if state.ui.focus == FocusTarget::Search {
        render_search(state, frame, layout);
    } else {
        render_explorer(state, frame, layout);
    }
    render_tabs(state, frame, layout.tab_bar);
    render_editor(state, frame, layout);
    if let Some(area) = layout.run_panel {
        render_run(state, frame, area);
    }
    render_status(state, frame, layout.status);

    if let Some((x, y)) = cursor_position(state, layout) {
        frame.set_cursor_position((x, y));
    }
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::new().fg(Color::Cyan)
    } else {
        DIM
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn render_explorer(state: &AppState, frame: &mut Frame, layout: &ShellLayout) {
    let root_name = state
        .workspace_root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| state.workspace_root.display().to_string());
    let explorer = &state.explorer;
    let selected = explorer.selected_index();

    let lines: Vec<Line> = explorer
        .rows
        .iter()
        .enumerate()
        .skip(explorer.scroll_offset)
        .take(layout.sidebar_content.height as usize)
        .map(|(index, row)| {
            let marker = match (row.is_dir, row.is_expanded, row.load_state) {
                (false, _, _) => "  ",
                (true, _, LoadState::Loading) => "~ ",
                (true, true, _) => "v ",
                (true, false, _) => "> ",
            };
            let indent = "  ".repeat(row.depth as usize);
            let style = if Some(index) == selected {
                SELECTED
            } else {
                Style::new()
            };
            Line::from(Span::styled(format!("{indent}{marker}{}", row.name), style))
        })
        .collect();

    let focused = state.ui.focus == FocusTarget::Explorer;
    frame.render_widget(
        Paragraph::new(lines).block(panel(&root_name, focused)),
        layout.sidebar,
    );
}

fn render_search(state: &AppState, frame: &mut Frame, layout: &ShellLayout) {
    let search = &state.search;
    let flag = |on: bool, label: &'static str| {
        Span::styled(
            label,
            if on {
                Style::new().fg(Color::Yellow)
            } else {
                DIM
            },
        )
    };

    let mut lines = vec![
        Line::from(format!("> {}", search.query)),
        Line::from(vec![
            flag(search.case_sensitive, "[Aa]"),
            Span::raw(" "),
            flag(search.use_regex, "[.*]"),
            Span::raw(" "),
            Span::styled(search_summary(state), DIM),
        ]),
    ];
    lines.extend(
        search
            .results
            .iter()
            .enumerate()
            .skip(search.scroll_offset)
            .take(layout.sidebar_content.height as usize)
            .map(|(index, hit)| {
                let relative = hit
                    .path
                    .strip_prefix(&state.workspace_root)
                    .unwrap_or(&hit.path);
                let style = if index == search.selected_index {
                    SELECTED
                } else {
                    Style::new()
                };
                Line::from(Span::styled(
                    format!("{}:{} {}", relative.display(), hit.line, hit.text),
                    style,
                ))
            }),
    );

    frame.render_widget(
        Paragraph::new(lines).block(panel("Search", true)),
        layout.sidebar,
    );
}

fn search_summary(state: &AppState) -> String {
    let search = &state.search;
    if search.searching {
        "searching...".to_string()
    } else if let Some(error) = &search.last_error {
        error.clone()
    } else if search.active_search_id.is_some() {
        format!("{} results", search.results.len())
    } else {
        String::new()
    }
}

fn render_tabs(state: &AppState, frame: &mut Frame, area: Rect) {
    let active = state.tabs.active_index();
    let mut spans = Vec::with_capacity(state.tabs.len() * 2);
    for (index, tab) in state.tabs.iter().enumerate() {
        let style = if Some(index) == active {
            Style::new().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::new()
        };
        spans.push(Span::styled(
            tab_label(&tab.display_name, tab.modified, tab.pinned),
            style,
        ));
        spans.push(Span::styled("|", DIM));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_editor(state: &AppState, frame: &mut Frame, layout: &ShellLayout) {
    let focused = state.ui.focus == FocusTarget::Editor;
    let Some(buffer) = state
        .tabs
        .active_path()
        .and_then(|path| state.buffers.get(path))
    else {
        let hint = match state.buffers.pending_load() {
            Some(ticket) => format!("Loading {}...", ticket.path.display()),
            None => "Select a file in the explorer to start editing.".to_string(),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, DIM)).block(panel("", focused)),
            layout.editor,
        );
        return;
    };

    let height = layout.editor_content.height as usize;
    let (cursor_line, _) = buffer.cursor_line_col();
    let first = cursor_line.saturating_sub(height.saturating_sub(1));
    let lines: Vec<Line> = buffer
        .content
        .lines()
        .skip(first)
        .take(height)
        .map(|line| {
            let text = line.to_string();
            Line::from(text.trim_end_matches(['\n', '\r']).to_string())
        })
        .collect();

    let title = if state.buffers.save_in_flight(&buffer.path) {
        format!("{} (saving)", buffer.path.display())
    } else {
        buffer.path.display().to_string()
    };
    frame.render_widget(
        Paragraph::new(lines).block(panel(&title, focused)),
        layout.editor,
    );
}

fn render_run(state: &AppState, frame: &mut Frame, area: Rect) {
    let (title, body, style) = match (&state.run.in_flight, &state.run.last) {
        (Some((_, path)), _) => (
            "Run".to_string(),
            format!("Running {}...", path.display()),
            DIM,
        ),
        (None, Some(report)) => {
            let style = if report.success {
                Style::new()
            } else {
                Style::new().fg(Color::Red)
            };
            (
                format!("Run: {}", report.path.display()),
                report.output.clone(),
                style,
            )
        }
        (None, None) => return,
    };
    frame.render_widget(
        Paragraph::new(body)
            .style(style)
            .wrap(Wrap { trim: false })
            .block(panel(&title, false)),
        area,
    );
}

fn render_status(state: &AppState, frame: &mut Frame, area: Rect) {
    if let Some(note) = state.notifications.current() {
        let color = match note.severity {
            Severity::Info => Color::Blue,
            Severity::Success => Color::Green,
            Severity::Error => Color::Red,
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", note.severity.label()),
                Style::new().fg(Color::Black).bg(color),
            ),
            Span::raw(" "),
            Span::raw(note.message.clone()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let position = state
        .tabs
        .active_path()
        .and_then(|path| state.buffers.get(path))
        .map(|buffer| {
            let (line, col) = buffer.cursor_line_col();
            format!("Ln {}, Col {}", line + 1, col + 1)
        })
        .unwrap_or_default();
    let help = "^S save  ^R run  ^W close  ^P pin  ^F search  ^Q quit";
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {help} "), DIM),
            Span::raw(position),
        ])),
        area,
    );
}

fn cursor_position(state: &AppState, layout: &ShellLayout) -> Option<(u16, u16)> {
    match state.ui.focus {
        FocusTarget::Editor => {
            let buffer = state.buffers.get(state.tabs.active_path()?)?;
            let content = layout.editor_content;
            if content.width == 0 || content.height == 0 {
                return None;
            }
            let (line, col) = buffer.cursor_line_col();
            let prefix: String = buffer.content.line(line).chars().take(col).collect();
            let row = line.min(content.height as usize - 1);
            let col = prefix.width().min(content.width as usize - 1);
            Some((content.x + col as u16, content.y + row as u16))
        }
        FocusTarget::Search => {
            let x = layout.sidebar.x + 3 + state.search.query.width() as u16;
            Some((x.min(layout.sidebar.right().saturating_sub(2)), layout.sidebar.y + 1))
        }
        FocusTarget::Explorer => None,
    }
}
