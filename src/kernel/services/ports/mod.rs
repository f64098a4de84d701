//! Service ports: traits + data contracts.

pub mod error;
pub mod settings;
pub mod workspace;

pub use error::{ServiceError, ServiceResult};
pub use settings::Settings;
pub use workspace::{
    display_name_for, CompileOutput, DirEntryInfo, EntryKind, LoadedFile, SavedFile,
    SearchMatch, SearchQuery, ServiceFuture, WorkspaceBackend,
};
