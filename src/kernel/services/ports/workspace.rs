//! Request/response contracts of the external file and compile service.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use super::error::ServiceResult;

pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send + 'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub extension: Option<String>,
}

impl DirEntryInfo {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::File)
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::Dir)
    }

    fn new(path: PathBuf, kind: EntryKind) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = match kind {
            EntryKind::File => path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy())),
            EntryKind::Dir => None,
        };
        Self {
            name,
            path,
            kind,
            extension,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub content: String,
    pub resolved_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub resolved_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub pattern: String,
    pub case_sensitive: bool,
    pub use_regex: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub path: PathBuf,
    pub line: usize,
    pub text: String,
}

pub trait WorkspaceBackend: Send + Sync + 'static {
    fn list_directory(&self, path: PathBuf) -> ServiceFuture<Vec<DirEntryInfo>>;

    fn load_file(&self, path: PathBuf) -> ServiceFuture<LoadedFile>;

    fn save_file(&self, path: PathBuf, content: String) -> ServiceFuture<SavedFile>;

    fn compile_and_run(&self, path: PathBuf) -> ServiceFuture<CompileOutput>;

    fn search_in_files(&self, root: PathBuf, query: SearchQuery) -> ServiceFuture<Vec<SearchMatch>>;
}

pub fn display_name_for(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
