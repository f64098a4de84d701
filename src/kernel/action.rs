use std::path::PathBuf;
use std::time::Instant;

use crate::kernel::buffer::{BufferEdit, CursorMove, LoadTicket, RequestId, SaveTicket};
use crate::kernel::notification::Severity;
use crate::kernel::services::ports::{
    CompileOutput, DirEntryInfo, LoadedFile, SavedFile, SearchMatch, ServiceError, ServiceResult,
};
use crate::kernel::state::FocusTarget;

#[derive(Debug, Clone)]
pub enum Action {
    Tick {
        now: Instant,
    },
    Quit,
    SetFocus(FocusTarget),

    ExplorerSetViewHeight {
        height: usize,
    },
    ExplorerMoveSelection {
        delta: isize,
    },
    ExplorerScroll {
        delta: isize,
    },
    ExplorerActivate,
    ExplorerCollapse,
    ExplorerClickRow {
        row: usize,
        now: Instant,
    },
    /// Drops the cached listing of the selected directory and re-fetches it.
    ExplorerRefresh,
    ExpandDir {
        path: PathBuf,
    },
    /// A selection from outside the keyboard/mouse navigation.
    SelectPath {
        path: PathBuf,
    },
    DirLoaded {
        path: PathBuf,
        entries: Vec<DirEntryInfo>,
    },
    DirLoadFailed {
        path: PathBuf,
        error: ServiceError,
    },

    OpenFile {
        path: PathBuf,
    },
    FileLoaded {
        ticket: LoadTicket,
        file: LoadedFile,
    },
    FileLoadFailed {
        ticket: LoadTicket,
        error: ServiceError,
    },
    ActivateTab {
        path: PathBuf,
    },
    NextTab,
    PrevTab,
    CloseTab {
        path: PathBuf,
    },
    CloseActiveTab,
    TogglePin {
        path: PathBuf,
    },
    TogglePinActive,
    Edit(BufferEdit),
    MoveCursor(CursorMove),
    SaveActive,
    FileSaved {
        ticket: SaveTicket,
        file: SavedFile,
    },
    FileSaveFailed {
        ticket: SaveTicket,
        error: ServiceError,
    },
    ReloadActive,

    RunActive,
    RunFinished {
        request_id: RequestId,
        result: ServiceResult<CompileOutput>,
    },

    SearchSetQuery(String),
    SearchAppend(char),
    SearchBackspace,
    SearchToggleCaseSensitive,
    SearchToggleRegex,
    SearchSetViewHeight {
        height: usize,
    },
    SearchMoveSelection {
        delta: isize,
    },
    SearchStart,
    SearchOpenSelected,
    SearchFinished {
        search_id: u64,
        result: ServiceResult<Vec<SearchMatch>>,
    },

    Notify {
        message: String,
        severity: Severity,
    },
    DismissNotification,
    ExpireNotification {
        generation: u64,
    },
}
