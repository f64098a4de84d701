//! levcode - a terminal code editor for LevLang workspaces.
//!
//! Module layout:
//! - kernel: state, actions, effects and the store that reduces them
//! - models: the lazily fetched file tree
//! - app: the editor shell that wires the store to the async runtime
//! - tui: crossterm/ratatui front end (feature `tui`)

pub mod app;
pub mod kernel;
pub mod models;
#[cfg(feature = "tui")]
pub mod tui;
