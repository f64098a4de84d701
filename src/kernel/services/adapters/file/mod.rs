//! Filesystem-backed workspace service.

pub mod local;

pub use local::LocalWorkspace;
