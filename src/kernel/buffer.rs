//! Per-tab text buffers and the tickets that guard their async loads and saves.
//!
//! Every load or save gets a [`RequestId`] from a single counter. Only the
//! latest load ticket may commit, so a slow response for a file the user has
//! already moved away from can never overwrite the buffer that is on screen.
//! Saves are tracked per path rather than per buffer: closing, reopening or
//! reloading a file while its write is pending does not allow a second write.

use ropey::Rope;
use rustc_hash::FxHashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadIntent {
    /// First load of a path; a tab is created only if it succeeds.
    Open { display_name: String },
    /// Re-fetch of a path that already has a tab.
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub path: PathBuf,
    pub request_id: RequestId,
    pub intent: LoadIntent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub path: PathBuf,
    /// Buffer version at the moment the save started.
    pub version: u64,
    pub request_id: RequestId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveRejected {
    #[error("a save is already in progress for {}", .0.display())]
    InFlight(PathBuf),
    #[error("no open buffer for {}", .0.display())]
    NotOpen(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveCompletion {
    Clean,
    /// The buffer changed while the save was in flight.
    StillDirty,
    /// The write finished but the buffer it was taken from has since been
    /// closed or replaced by a reload.
    Detached,
    /// The ticket is not the in-flight save for its path.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferEdit {
    Replace(String),
    /// Inserts at a char index, clamped to the end of the buffer.
    Insert { at: usize, text: String },
    /// Deletes a char range, clamped to the buffer.
    Delete { range: Range<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocStart,
    DocEnd,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditOutcome {
    pub changed: bool,
    /// Set only on the clean → dirty transition.
    pub became_dirty: bool,
}

#[derive(Debug, Clone)]
pub struct Buffer {
    pub path: PathBuf,
    pub content: Rope,
    pub dirty: bool,
    pub version: u64,
    /// Char index.
    pub cursor: usize,
    /// Request id of the load that installed this buffer.
    generation: RequestId,
}

impl Buffer {
    fn new(path: PathBuf, content: &str, generation: RequestId) -> Self {
        Self {
            path,
            content: Rope::from_str(content),
            dirty: false,
            version: 0,
            cursor: 0,
            generation,
        }
    }

    pub fn text(&self) -> String {
        self.content.to_string()
    }

    /// Zero-based (line, column) of the cursor, in chars.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let cursor = self.cursor.min(self.content.len_chars());
        let line = self.content.char_to_line(cursor);
        (line, cursor - self.content.line_to_char(line))
    }

    fn apply(&mut self, edit: BufferEdit) -> bool {
        let len = self.content.len_chars();
        match edit {
            BufferEdit::Replace(text) => {
                self.content = Rope::from_str(&text);
                self.cursor = self.cursor.min(self.content.len_chars());
                true
            }
            BufferEdit::Insert { at, text } => {
                if text.is_empty() {
                    return false;
                }
                let at = at.min(len);
                self.content.insert(at, &text);
                self.cursor = at + text.chars().count();
                true
            }
            BufferEdit::Delete { range } => {
                let end = range.end.min(len);
                let start = range.start.min(end);
                if start == end {
                    return false;
                }
                self.content.remove(start..end);
                self.cursor = start;
                true
            }
        }
    }

    fn move_cursor(&mut self, movement: CursorMove) -> bool {
        let len = self.content.len_chars();
        let cursor = self.cursor.min(len);
        let (line, col) = self.cursor_line_col();
        let next = match movement {
            CursorMove::Left => cursor.saturating_sub(1),
            CursorMove::Right => (cursor + 1).min(len),
            CursorMove::Up if line == 0 => 0,
            CursorMove::Up => self.char_at(line - 1, col),
            CursorMove::Down if line + 1 >= self.content.len_lines() => len,
            CursorMove::Down => self.char_at(line + 1, col),
            CursorMove::LineStart => self.content.line_to_char(line),
            CursorMove::LineEnd => {
                self.content.line_to_char(line) + visible_line_len(&self.content, line)
            }
            CursorMove::DocStart => 0,
            CursorMove::DocEnd => len,
        };
        let changed = next != self.cursor;
        self.cursor = next;
        changed
    }

    fn char_at(&self, line: usize, col: usize) -> usize {
        self.content.line_to_char(line) + col.min(visible_line_len(&self.content, line))
    }
}

fn visible_line_len(rope: &Rope, line: usize) -> usize {
    let slice = rope.line(line);
    let mut len = slice.len_chars();
    if len > 0 && slice.char(len - 1) == '\n' {
        len -= 1;
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
    }
    len
}

#[derive(Debug, Clone, Copy)]
struct InFlightSave {
    request_id: RequestId,
    generation: RequestId,
}

#[derive(Debug, Default)]
pub struct BufferState {
    buffers: FxHashMap<PathBuf, Buffer>,
    saves: FxHashMap<PathBuf, InFlightSave>,
    pending_load: Option<LoadTicket>,
    next_request_id: RequestId,
}

impl BufferState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&Buffer> {
        self.buffers.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.buffers.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn save_in_flight(&self, path: &Path) -> bool {
        self.saves.contains_key(path)
    }

    pub fn pending_load(&self) -> Option<&LoadTicket> {
        self.pending_load.as_ref()
    }

    /// Issues a ticket for a new load. Any earlier pending ticket is
    /// superseded and its completion will be dropped.
    pub fn begin_load(&mut self, path: PathBuf, intent: LoadIntent) -> LoadTicket {
        let ticket = LoadTicket {
            path,
            request_id: self.next_id(),
            intent,
        };
        if let Some(prev) = self.pending_load.replace(ticket.clone()) {
            tracing::debug!(path = %prev.path.display(), request_id = prev.request_id, "load superseded");
        }
        ticket
    }

    pub fn is_current_load(&self, ticket: &LoadTicket) -> bool {
        self.pending_load
            .as_ref()
            .is_some_and(|pending| pending.request_id == ticket.request_id)
    }

    pub fn supersede_pending(&mut self) -> Option<LoadTicket> {
        self.pending_load.take()
    }

    /// Installs a clean buffer for a current ticket. Returns `false` and
    /// leaves every buffer untouched when the ticket is stale.
    pub fn finish_load(&mut self, ticket: &LoadTicket, content: &str) -> bool {
        if !self.is_current_load(ticket) {
            tracing::debug!(
                path = %ticket.path.display(),
                request_id = ticket.request_id,
                "dropping stale load"
            );
            return false;
        }
        self.pending_load = None;

        let version = self
            .buffers
            .get(&ticket.path)
            .map(|b| b.version.wrapping_add(1))
            .unwrap_or(0);
        let mut buffer = Buffer::new(ticket.path.clone(), content, ticket.request_id);
        buffer.version = version;
        self.buffers.insert(ticket.path.clone(), buffer);
        true
    }

    /// Clears a failed current ticket. Prior buffers are kept as they were.
    pub fn fail_load(&mut self, ticket: &LoadTicket) -> bool {
        if !self.is_current_load(ticket) {
            return false;
        }
        self.pending_load = None;
        true
    }

    pub fn edit(&mut self, path: &Path, edit: BufferEdit) -> EditOutcome {
        let Some(buffer) = self.buffers.get_mut(path) else {
            return EditOutcome::default();
        };
        if !buffer.apply(edit) {
            return EditOutcome::default();
        }
        buffer.version = buffer.version.wrapping_add(1);
        let became_dirty = !buffer.dirty;
        buffer.dirty = true;
        EditOutcome {
            changed: true,
            became_dirty,
        }
    }

    pub fn move_cursor(&mut self, path: &Path, movement: CursorMove) -> bool {
        self.buffers
            .get_mut(path)
            .is_some_and(|buffer| buffer.move_cursor(movement))
    }

    /// Rejects the request while any save of `path` is pending, whichever
    /// buffer is installed for it now.
    pub fn begin_save(&mut self, path: &Path) -> Result<SaveTicket, SaveRejected> {
        if self.saves.contains_key(path) {
            return Err(SaveRejected::InFlight(path.to_path_buf()));
        }
        let (version, generation) = self
            .buffers
            .get(path)
            .map(|buffer| (buffer.version, buffer.generation))
            .ok_or_else(|| SaveRejected::NotOpen(path.to_path_buf()))?;
        let request_id = self.next_id();
        self.saves.insert(
            path.to_path_buf(),
            InFlightSave {
                request_id,
                generation,
            },
        );
        Ok(SaveTicket {
            path: path.to_path_buf(),
            version,
            request_id,
        })
    }

    pub fn finish_save(&mut self, ticket: &SaveTicket) -> SaveCompletion {
        let Some(save) = self.take_save(ticket) else {
            return SaveCompletion::Stale;
        };
        let Some(buffer) = self
            .buffers
            .get_mut(&ticket.path)
            .filter(|buffer| buffer.generation == save.generation)
        else {
            return SaveCompletion::Detached;
        };
        if buffer.version == ticket.version {
            buffer.dirty = false;
            SaveCompletion::Clean
        } else {
            SaveCompletion::StillDirty
        }
    }

    /// Ends a failed save; dirty flags are left as they are. Returns `false`
    /// only for a ticket that is not the in-flight save of its path.
    pub fn fail_save(&mut self, ticket: &SaveTicket) -> bool {
        self.take_save(ticket).is_some()
    }

    pub fn remove(&mut self, path: &Path) -> Option<Buffer> {
        self.buffers.remove(path)
    }

    /// Drops every buffer. A pending load or save stays pending.
    pub fn clear(&mut self) {
        self.buffers.clear();
    }

    fn take_save(&mut self, ticket: &SaveTicket) -> Option<InFlightSave> {
        let save = *self.saves.get(&ticket.path)?;
        if save.request_id != ticket.request_id {
            return None;
        }
        self.saves.remove(&ticket.path)
    }

    fn next_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/buffer.rs"]
mod tests;
