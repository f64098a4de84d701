//! Raw-mode/alternate-screen lifecycle, restored on drop and on SIGINT/SIGTERM.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

pub trait TerminalOps: Send + Sync + 'static {
    fn enter(&self) -> io::Result<()>;
    fn leave(&self) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct FullscreenOps;

impl TerminalOps for FullscreenOps {
    fn enter(&self) -> io::Result<()> {
        use crossterm::event::{EnableBracketedPaste, EnableMouseCapture};
        use crossterm::terminal::{enable_raw_mode, EnterAlternateScreen};

        enable_raw_mode()?;
        crossterm::execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )
    }

    fn leave(&self) -> io::Result<()> {
        use crossterm::event::{DisableBracketedPaste, DisableMouseCapture};
        use crossterm::terminal::{disable_raw_mode, LeaveAlternateScreen};

        // Run every step even if an earlier one failed; report the first error.
        let raw = disable_raw_mode();
        let screen = crossterm::execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            crossterm::cursor::Show
        );
        raw.and(screen)
    }
}

/// Cloneable handle that leaves the fullscreen mode at most once.
#[derive(Clone)]
pub struct TerminalRestorer {
    left: Arc<AtomicBool>,
    ops: Arc<dyn TerminalOps>,
}

impl TerminalRestorer {
    pub fn restore(&self) -> io::Result<()> {
        if self.left.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.leave()
    }
}

pub struct TerminalGuard {
    restorer: TerminalRestorer,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        Self::with_ops(Arc::new(FullscreenOps))
    }

    pub fn with_ops(ops: Arc<dyn TerminalOps>) -> io::Result<Self> {
        ops.enter()?;
        Ok(Self {
            restorer: TerminalRestorer {
                left: Arc::new(AtomicBool::new(false)),
                ops,
            },
        })
    }

    pub fn restorer(&self) -> TerminalRestorer {
        self.restorer.clone()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restorer.restore() {
            tracing::warn!(error = %e, "failed to restore terminal");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl TerminationSignal {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Interrupt => 130,
            Self::Terminate => 143,
        }
    }
}

/// Forwards SIGINT/SIGTERM to the main loop. If the loop does not exit within
/// the grace period the terminal is restored and the process exits.
#[cfg(unix)]
pub fn watch_termination(restorer: TerminalRestorer) -> io::Result<Receiver<TerminationSignal>> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::time::Duration;

    const GRACE_PERIOD: Duration = Duration::from_secs(2);

    let (tx, rx) = std::sync::mpsc::channel();
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("levcode-signals".to_string())
        .spawn(move || {
            if let Some(raw) = signals.forever().next() {
                let signal = if raw == SIGINT {
                    TerminationSignal::Interrupt
                } else {
                    TerminationSignal::Terminate
                };
                tracing::info!(?signal, "termination signal received");
                let _ = tx.send(signal);

                std::thread::sleep(GRACE_PERIOD);
                let _ = restorer.restore();
                std::process::exit(signal.exit_code());
            }
        })?;
    Ok(rx)
}

#[cfg(not(unix))]
pub fn watch_termination(_restorer: TerminalRestorer) -> io::Result<Receiver<TerminationSignal>> {
    let (_tx, rx) = std::sync::mpsc::channel();
    Ok(rx)
}

#[cfg(test)]
#[path = "../../tests/unit/tui/terminal_guard.rs"]
mod tests;
