//! Application layer: the editor session that front ends drive.

mod shell;

pub use shell::EditorShell;
