use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Failures reported by the workspace backend.
///
/// Every variant is recoverable from the shell's point of view: the call site
/// turns it into an error notification and rolls back its local change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Unable to decode file as UTF-8: {}", path.display())]
    Encoding { path: PathBuf },

    #[error("Path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Path is not a file: {}", path.display())]
    NotAFile { path: PathBuf },

    #[error("{message}")]
    ServiceUnavailable { message: String },

    #[error("Compilation failed with exit code {}", code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    CompileFailure { code: Option<i32>, output: String },
}

impl ServiceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::InvalidData => Self::Encoding { path },
            _ => Self::ServiceUnavailable {
                message: format!("{}: {}", path.display(), err),
            },
        }
    }

    /// Output captured before the failure, if the backend produced any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::CompileFailure { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}
