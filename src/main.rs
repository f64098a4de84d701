use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use levcode::app::EditorShell;
use levcode::kernel::services::adapters::{load_settings, LocalWorkspace};
use levcode::kernel::services::ports::Settings;

mod logging;

fn main() -> io::Result<()> {
    let logging = logging::init();
    let settings = load_settings();

    let cwd = std::env::current_dir()?;
    let arg = std::env::args().nth(1);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let root = resolve_workspace_root(&cwd, arg.as_deref(), &settings, home)?;
    if let Some(guard) = &logging {
        tracing::info!(
            root = %root.display(),
            log_dir = %guard.log_dir().display(),
            "starting levcode"
        );
    }

    let backend = Arc::new(LocalWorkspace::new(&settings));
    let mut shell = EditorShell::new(root, &settings, backend)?;
    let result = levcode::tui::run(&mut shell);
    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal loop failed");
    }
    result
}

/// First CLI argument (relative to `cwd`), then the configured initial
/// directory, then `home`, then `cwd` itself.
fn resolve_workspace_root(
    cwd: &Path,
    arg: Option<&str>,
    settings: &Settings,
    home: Option<PathBuf>,
) -> io::Result<PathBuf> {
    let path = arg
        .map(|arg| cwd.join(arg))
        .or_else(|| settings.initial_dir.clone())
        .or(home)
        .unwrap_or_else(|| cwd.to_path_buf());

    if !path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", path.display()),
        ));
    }
    std::fs::canonicalize(&path)
}

#[cfg(test)]
#[path = "../tests/unit/cli_startup_paths.rs"]
mod tests;
