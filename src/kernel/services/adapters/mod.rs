//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod file;
pub mod runtime;
pub mod search;
pub mod settings;

pub use file::LocalWorkspace;
pub use runtime::{AsyncRuntime, Debouncer};
pub use search::{build_matcher, search_workspace};
pub use settings::{ensure_log_dir, load_settings};
