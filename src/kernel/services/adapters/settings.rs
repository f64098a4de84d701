use crate::kernel::services::ports::settings::Settings;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".levcode";
const SETTINGS_FILE: &str = "setting.json";
const LOG_DIR: &str = "logs";

fn get_settings_path() -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

/// Writes default settings to `path` unless a file already exists there.
pub fn write_default_settings(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content =
            serde_json::to_string_pretty(&Settings::default()).unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content)?;
    }
    Ok(())
}

/// Loads `setting.json` from the cache directory, creating it with the
/// defaults on first run.
pub fn load_settings() -> Settings {
    match get_settings_path() {
        Some(path) => load_or_create_settings(&path),
        None => Settings::default(),
    }
}

pub fn load_or_create_settings(path: &Path) -> Settings {
    if let Err(e) = write_default_settings(path) {
        tracing::warn!(path = %path.display(), error = %e, "cannot create settings file");
    }
    load_settings_from(path)
}

/// Missing or malformed files yield the defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "cannot read settings");
            }
            return Settings::default();
        }
    };
    serde_json::from_str(&data).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "malformed settings, using defaults");
        Settings::default()
    })
}

fn get_log_dir() -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(APP_DIR).join(LOG_DIR))
}

/// The cache log directory, or one under the temp dir when that cannot be
/// determined or created.
pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    create_log_dir(
        get_log_dir(),
        std::env::temp_dir().join("levcode").join(LOG_DIR),
    )
}

fn create_log_dir(preferred: Option<PathBuf>, fallback: PathBuf) -> std::io::Result<PathBuf> {
    if let Some(dir) = preferred.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        return Ok(dir);
    }
    std::fs::create_dir_all(&fallback)?;
    Ok(fallback)
}

fn get_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Caches"));
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".cache"));
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            return Some(PathBuf::from(local));
        }
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
