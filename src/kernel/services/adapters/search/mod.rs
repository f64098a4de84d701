//! Text search across the workspace.

mod global;

pub use global::{build_matcher, search_workspace};
