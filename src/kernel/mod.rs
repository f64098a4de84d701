//! Headless application core (state/action/effect).

pub mod action;
pub mod buffer;
pub mod effect;
pub mod events;
pub mod notification;
pub mod search;
pub mod services;
pub mod state;
pub mod store;
pub mod tabs;

pub use action::Action;
pub use buffer::{
    Buffer, BufferEdit, BufferState, CursorMove, LoadIntent, LoadTicket, SaveTicket,
};
pub use effect::Effect;
pub use events::{EventBus, ShellEvent, Subscription};
pub use notification::{Notification, NotificationState, Severity};
pub use search::SearchState;
pub use state::{AppState, ExplorerState, FocusTarget, RunReport, RunState, UiState};
pub use store::{DispatchResult, Store};
pub use tabs::{Tab, TabsState};
