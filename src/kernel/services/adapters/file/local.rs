//! Local filesystem and subprocess backend.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use crate::kernel::services::adapters::search::search_workspace;
use crate::kernel::services::ports::{
    CompileOutput, DirEntryInfo, LoadedFile, SavedFile, SearchMatch, SearchQuery, ServiceError,
    ServiceFuture, ServiceResult, Settings, WorkspaceBackend,
};

const EMPTY_RUN_OUTPUT: &str = "Compilation completed successfully.";

#[derive(Debug, Clone)]
struct LocalConfig {
    compiler_command: String,
    compile_timeout: Duration,
    ignored_names: Arc<Vec<String>>,
    search_max_results: usize,
}

#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    config: LocalConfig,
}

impl LocalWorkspace {
    pub fn new(settings: &Settings) -> Self {
        Self {
            config: LocalConfig {
                compiler_command: settings.compiler_command.clone(),
                compile_timeout: settings.compile_timeout(),
                ignored_names: Arc::new(settings.ignored_names.clone()),
                search_max_results: settings.search_max_results,
            },
        }
    }
}

impl Default for LocalWorkspace {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl WorkspaceBackend for LocalWorkspace {
    fn list_directory(&self, path: PathBuf) -> ServiceFuture<Vec<DirEntryInfo>> {
        let ignored = self.config.ignored_names.clone();
        Box::pin(async move { list_directory(&path, &ignored).await })
    }

    fn load_file(&self, path: PathBuf) -> ServiceFuture<LoadedFile> {
        Box::pin(async move { load_file(&path).await })
    }

    fn save_file(&self, path: PathBuf, content: String) -> ServiceFuture<SavedFile> {
        Box::pin(async move { save_file(&path, content).await })
    }

    fn compile_and_run(&self, path: PathBuf) -> ServiceFuture<CompileOutput> {
        let config = self.config.clone();
        Box::pin(async move { compile_and_run(&path, &config).await })
    }

    fn search_in_files(&self, root: PathBuf, query: SearchQuery) -> ServiceFuture<Vec<SearchMatch>> {
        let ignored = self.config.ignored_names.clone();
        let max_results = self.config.search_max_results;
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                search_workspace(&root, &query, &ignored, max_results)
            })
            .await
            .map_err(|e| ServiceError::unavailable(format!("Search task failed: {e}")))?
        })
    }
}

async fn resolve(path: &Path) -> ServiceResult<PathBuf> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| ServiceError::from_io(e, path))
}

/// Directories first, then files, each group ordered by case-insensitive
/// name. Entries that cannot be inspected are skipped.
async fn list_directory(path: &Path, ignored: &[String]) -> ServiceResult<Vec<DirEntryInfo>> {
    let resolved = resolve(path).await?;
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|e| ServiceError::from_io(e, path))?;
    if !metadata.is_dir() {
        return Err(ServiceError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let mut read_dir = tokio::fs::read_dir(&resolved)
        .await
        .map_err(|e| ServiceError::from_io(e, path))?;

    let mut entries = Vec::new();
    loop {
        let entry = match read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "directory read stopped");
                break;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if ignored.iter().any(|ignored| ignored == &name) {
            continue;
        }

        let is_dir = match entry.file_type().await {
            Ok(file_type) if file_type.is_symlink() => tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            Ok(file_type) => file_type.is_dir(),
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let child = path.join(&name);
        entries.push(if is_dir {
            DirEntryInfo::dir(child)
        } else {
            DirEntryInfo::file(child)
        });
    }

    entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    Ok(entries)
}

async fn load_file(path: &Path) -> ServiceResult<LoadedFile> {
    let resolved = resolve(path).await?;
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|e| ServiceError::from_io(e, path))?;
    if !metadata.is_file() {
        return Err(ServiceError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let bytes = tokio::fs::read(&resolved)
        .await
        .map_err(|e| ServiceError::from_io(e, path))?;
    let content = String::from_utf8(bytes).map_err(|_| ServiceError::Encoding {
        path: path.to_path_buf(),
    })?;

    Ok(LoadedFile {
        content,
        resolved_path: resolved,
    })
}

async fn save_file(path: &Path, content: String) -> ServiceResult<SavedFile> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ServiceError::from_io(e, parent))?;
    }
    tokio::fs::write(path, content.as_bytes())
        .await
        .map_err(|e| ServiceError::from_io(e, path))?;

    let resolved_path = tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf());
    Ok(SavedFile { resolved_path })
}

async fn compile_and_run(path: &Path, config: &LocalConfig) -> ServiceResult<CompileOutput> {
    let resolved = resolve(path).await?;
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|e| ServiceError::from_io(e, path))?;
    if !metadata.is_file() {
        return Err(ServiceError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    let work_dir = resolved
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut command = tokio::process::Command::new(&config.compiler_command);
    command
        .arg(&resolved)
        .current_dir(&work_dir)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    tracing::info!(
        compiler = %config.compiler_command,
        path = %resolved.display(),
        "running compiler"
    );
    let output = match tokio::time::timeout(config.compile_timeout, command.output()).await {
        Err(_) => {
            return Err(ServiceError::unavailable(format!(
                "Compilation timed out after {} seconds",
                config.compile_timeout.as_secs()
            )))
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::unavailable(format!(
                "Compiler '{}' not found. Make sure it is installed and in your PATH.",
                config.compiler_command
            )))
        }
        Ok(Err(e)) => {
            return Err(ServiceError::unavailable(format!(
                "Failed to run '{}': {e}",
                config.compiler_command
            )))
        }
        Ok(Ok(output)) => output,
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut text = stdout.into_owned();
    if !stderr.is_empty() {
        text.push('\n');
        text.push_str(&stderr);
    }

    if !output.status.success() {
        return Err(ServiceError::CompileFailure {
            code: output.status.code(),
            output: text,
        });
    }
    if text.trim().is_empty() {
        text = EMPTY_RUN_OUTPUT.to_string();
    }
    Ok(CompileOutput { output: text })
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/local.rs"]
mod tests;
