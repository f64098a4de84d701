//! Data models shared by the kernel.

pub mod file_tree;

pub use file_tree::{
    ChildEntry, Children, ExpandOutcome, FileTreeCache, FileTreeError, FileTreeRow, LoadState,
    NodeId, NodeKind, Selection, ToggleOutcome,
};
