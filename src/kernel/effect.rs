use ropey::Rope;
use std::path::PathBuf;
use std::time::Duration;

use crate::kernel::buffer::{LoadTicket, RequestId, SaveTicket};
use crate::kernel::services::ports::SearchQuery;

/// Side effects requested by the store. They are executed outside the
/// reducer and report back as actions.
#[derive(Debug, Clone)]
pub enum Effect {
    ListDirectory(PathBuf),
    LoadFile(LoadTicket),
    SaveFile {
        ticket: SaveTicket,
        content: Rope,
    },
    CompileAndRun {
        request_id: RequestId,
        path: PathBuf,
    },
    SearchInFiles {
        search_id: u64,
        root: PathBuf,
        query: SearchQuery,
    },
    ScheduleNotificationExpiry {
        generation: u64,
        after: Duration,
    },
}
