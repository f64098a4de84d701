//! Terminal front end (crossterm + ratatui).
//!
//! Kept apart from `kernel`/`app` so the editor core builds without terminal
//! crates when the `tui` feature is off.

pub mod input;
pub mod layout;
pub mod render;
pub mod terminal_guard;

use std::io;
use std::time::{Duration, Instant};

use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use crate::app::EditorShell;
use crate::kernel::Action;
use layout::ShellLayout;
use terminal_guard::{watch_termination, TerminalGuard};

const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Runs the event loop until the user quits or a termination signal arrives.
pub fn run(shell: &mut EditorShell) -> io::Result<()> {
    let guard = TerminalGuard::enter()?;
    let signals = watch_termination(guard.restorer())?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut layout = ShellLayout::default();
    let mut needs_draw = true;

    loop {
        if let Ok(signal) = signals.try_recv() {
            tracing::info!(?signal, "shutting down");
            break;
        }

        if crossterm::event::poll(POLL_INTERVAL)? {
            let event = crossterm::event::read()?;
            if matches!(event, crossterm::event::Event::Resize(..)) {
                needs_draw = true;
            }
            for action in input::map_event(shell.state(), &layout, event, Instant::now()) {
                shell.dispatch(action);
            }
        }

        needs_draw |= shell.tick();
        if shell.should_quit() {
            break;
        }
        if !needs_draw {
            continue;
        }

        shell.take_render();
        needs_draw = false;
        let size = terminal.size()?;
        layout = ShellLayout::compute(shell.state(), Rect::new(0, 0, size.width, size.height));
        sync_view_heights(shell, &layout);
        terminal.draw(|frame| render::render(shell.state(), frame, &layout))?;
    }

    drop(terminal);
    guard.restorer().restore()
}

/// Keeps scroll clamping in the kernel in step with the drawn panel sizes.
fn sync_view_heights(shell: &mut EditorShell, layout: &ShellLayout) {
    let height = layout.sidebar_content.height as usize;
    if shell.state().explorer.view_height != height {
        shell.dispatch(Action::ExplorerSetViewHeight { height });
    }
    if shell.state().search.view_height != height {
        shell.dispatch(Action::SearchSetViewHeight { height });
    }
}
