//! Async runtime adapter: executes IO effects and sends actions back to the UI thread.

mod async_runtime;
mod debounce;

pub use async_runtime::AsyncRuntime;
pub use debounce::Debouncer;
