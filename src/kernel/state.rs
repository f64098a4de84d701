use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::kernel::buffer::{BufferState, RequestId};
use crate::kernel::notification::NotificationState;
use crate::kernel::services::ports::{DirEntryInfo, EntryKind, Settings};
use crate::kernel::tabs::TabsState;
use crate::models::{
    ChildEntry, ExpandOutcome, FileTreeCache, FileTreeError, FileTreeRow, NodeId, NodeKind,
    Selection, ToggleOutcome,
};

use super::effect::Effect;
use super::search::SearchState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Explorer,
    Editor,
    Search,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub focus: FocusTarget,
    pub should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: FocusTarget::Explorer,
            should_quit: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub path: PathBuf,
    pub success: bool,
    pub output: String,
}

#[derive(Debug, Default)]
pub struct RunState {
    pub in_flight: Option<(RequestId, PathBuf)>,
    pub last: Option<RunReport>,
    next_request_id: RequestId,
}

impl RunState {
    /// Returns `None` while another run is still in flight.
    pub fn begin(&mut self, path: PathBuf) -> Option<RequestId> {
        if self.in_flight.is_some() {
            return None;
        }
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.in_flight = Some((self.next_request_id, path));
        Some(self.next_request_id)
    }

    pub fn finish(&mut self, request_id: RequestId) -> Option<PathBuf> {
        match self.in_flight.take() {
            Some((id, path)) if id == request_id => Some(path),
            other => {
                self.in_flight = other;
                None
            }
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub workspace_root: PathBuf,
    pub ui: UiState,
    pub explorer: ExplorerState,
    pub tabs: TabsState,
    pub buffers: BufferState,
    pub notifications: NotificationState,
    pub run: RunState,
    pub search: SearchState,
}

impl AppState {
    pub fn new(workspace_root: PathBuf, settings: &Settings) -> Self {
        let tree = FileTreeCache::new(workspace_root.clone());
        Self {
            workspace_root,
            ui: UiState::default(),
            explorer: ExplorerState::new(tree),
            tabs: TabsState::new(),
            buffers: BufferState::new(),
            notifications: NotificationState::new(settings.notification_ttl()),
            run: RunState::default(),
            search: SearchState::default(),
        }
    }
}

/// Explorer view over the [`FileTreeCache`]: visible rows, selection and
/// scroll position.
pub struct ExplorerState {
    tree: FileTreeCache,
    pub view_height: usize,
    pub scroll_offset: usize,
    pub rows: Vec<FileTreeRow>,
    selected: Option<NodeId>,
    index_by_id: FxHashMap<NodeId, usize>,
    last_click: Option<(Instant, NodeId)>,
}

impl std::fmt::Debug for ExplorerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerState")
            .field("tree", &self.tree)
            .field("scroll_offset", &self.scroll_offset)
            .field("rows_len", &self.rows.len())
            .field("selected", &self.selected)
            .finish()
    }
}

impl ExplorerState {
    const DOUBLE_CLICK_MS: u64 = 300;

    pub fn new(tree: FileTreeCache) -> Self {
        let mut state = Self {
            tree,
            view_height: 10,
            scroll_offset: 0,
            rows: Vec::new(),
            selected: None,
            index_by_id: FxHashMap::default(),
            last_click: None,
        };
        state.refresh_rows();
        state
    }

    pub fn tree(&self) -> &FileTreeCache {
        &self.tree
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
            .and_then(|id| self.index_by_id.get(&id).copied())
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selected.and_then(|id| self.tree.path_of(id))
    }

    pub fn select(&self, path: &Path) -> Result<Selection, FileTreeError> {
        self.tree.select(path)
    }

    pub fn set_view_height(&mut self, height: usize) -> bool {
        let height = height.max(1);
        if self.view_height == height {
            return false;
        }
        self.view_height = height;

        match self.selected_index() {
            Some(index) => self.keep_row_visible(index),
            None => self.clamp_scroll(),
        }

        true
    }

    pub fn move_selection(&mut self, delta: isize) -> bool {
        if self.rows.is_empty() || delta == 0 {
            return false;
        }

        let Some(current_index) = self.selected_index() else {
            let new_index = if delta < 0 { self.rows.len() - 1 } else { 0 };
            self.selected = Some(self.rows[new_index].id);
            self.keep_row_visible(new_index);
            return true;
        };

        let new_index = if delta < 0 {
            current_index.saturating_sub(delta.unsigned_abs())
        } else {
            (current_index + delta as usize).min(self.rows.len() - 1)
        };

        if new_index == current_index {
            return false;
        }

        self.selected = Some(self.rows[new_index].id);
        self.keep_row_visible(new_index);
        true
    }

    pub fn scroll(&mut self, delta: isize) -> bool {
        if self.rows.is_empty() || delta == 0 {
            return false;
        }

        let max_scroll = self.rows.len().saturating_sub(self.view_height.max(1));
        let prev = self.scroll_offset;

        if delta > 0 {
            self.scroll_offset = (self.scroll_offset + delta as usize).min(max_scroll);
        } else {
            self.scroll_offset = self.scroll_offset.saturating_sub(delta.unsigned_abs());
        }

        self.scroll_offset != prev
    }

    pub fn select_row(&mut self, row: usize) -> bool {
        let Some(node_id) = self.rows.get(row).map(|r| r.id) else {
            return false;
        };
        let prev = self.selected.replace(node_id);
        self.keep_row_visible(row);
        prev != Some(node_id)
    }

    /// Single click selects; a second click on the same row within the
    /// double-click window returns the row's path for activation.
    pub fn click_row(&mut self, row: usize, now: Instant) -> (bool, Option<PathBuf>) {
        let Some(node_id) = self.rows.get(row).map(|r| r.id) else {
            return (false, None);
        };

        let is_double_click = self.last_click.is_some_and(|(last_time, last_id)| {
            last_id == node_id
                && now.saturating_duration_since(last_time).as_millis() as u64
                    <= Self::DOUBLE_CLICK_MS
        });

        if is_double_click {
            self.last_click = None;
            return (false, self.tree.path_of(node_id).map(Path::to_path_buf));
        }

        self.last_click = Some((now, node_id));
        (self.select_row(row), None)
    }

    pub fn toggle_dir(&mut self, path: &Path) -> Result<(bool, Vec<Effect>), FileTreeError> {
        let outcome = self.tree.toggle(path)?;
        let effects = match outcome {
            ToggleOutcome::Expanded(expand) => fetch_effects(expand),
            ToggleOutcome::Collapsed => Vec::new(),
        };
        self.refresh_rows();
        Ok((true, effects))
    }

    pub fn expand(&mut self, path: &Path) -> Result<(bool, Vec<Effect>), FileTreeError> {
        let was_expanded = self.tree.is_expanded(path);
        let effects = fetch_effects(self.tree.expand(path)?);
        self.refresh_rows();
        Ok((!was_expanded, effects))
    }

    pub fn collapse_selected(&mut self) -> bool {
        let Some(path) = self.selected_path().map(Path::to_path_buf) else {
            return false;
        };
        if !self.tree.is_expanded(&path) {
            return false;
        }
        let collapsed = self.tree.collapse(&path).unwrap_or(false);
        self.refresh_rows();
        collapsed
    }

    /// Directory the refresh command applies to: the selected directory, the
    /// parent of the selected file, or the root.
    pub fn refresh_target(&self) -> PathBuf {
        let root = self.tree.root_path().to_path_buf();
        let Some(path) = self.selected_path() else {
            return root;
        };
        match self.tree.kind(path) {
            Some(NodeKind::Dir) => path.to_path_buf(),
            _ => self
                .tree
                .parent_of(path)
                .map(Path::to_path_buf)
                .unwrap_or(root),
        }
    }

    pub fn invalidate(&mut self, path: &Path) -> Result<(bool, Vec<Effect>), FileTreeError> {
        let was_expanded = self.tree.invalidate(path)?;
        let effects = if was_expanded {
            fetch_effects(self.tree.expand(path)?)
        } else {
            Vec::new()
        };
        self.refresh_rows();
        Ok((true, effects))
    }

    pub fn apply_dir_loaded(&mut self, path: &Path, entries: Vec<DirEntryInfo>) -> bool {
        let entries = entries
            .into_iter()
            .map(|entry| ChildEntry {
                name: entry.name,
                path: entry.path,
                kind: match entry.kind {
                    EntryKind::File => NodeKind::File,
                    EntryKind::Dir => NodeKind::Dir,
                },
                extension: entry.extension,
            })
            .collect();

        match self.tree.apply_listing(path, entries) {
            Ok(true) => {
                self.refresh_rows();
                true
            }
            Ok(false) => false,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "listing for unknown directory");
                false
            }
        }
    }

    pub fn apply_dir_load_error(&mut self, path: &Path) -> bool {
        let applied = self.tree.apply_listing_failed(path).unwrap_or(false);
        if applied {
            self.refresh_rows();
        }
        applied
    }

    fn refresh_rows(&mut self) {
        let prev_index = self.selected_index();
        self.rows = self.tree.flatten_for_view();

        self.index_by_id.clear();
        self.index_by_id.reserve(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            self.index_by_id.insert(row.id, i);
        }

        let still_visible = self
            .selected
            .is_some_and(|id| self.index_by_id.contains_key(&id));
        if !still_visible {
            self.selected = prev_index
                .filter(|_| !self.rows.is_empty())
                .map(|i| self.rows[i.min(self.rows.len() - 1)].id);
        }

        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let view_height = self.view_height.max(1);
        let max_scroll = self.rows.len().saturating_sub(view_height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
    }

    fn keep_row_visible(&mut self, row_index: usize) {
        let view_height = self.view_height.max(1);

        if row_index < self.scroll_offset {
            self.scroll_offset = row_index;
            self.clamp_scroll();
            return;
        }

        if row_index >= self.scroll_offset + view_height {
            self.scroll_offset = row_index.saturating_sub(view_height - 1);
        }

        self.clamp_scroll();
    }
}

fn fetch_effects(outcome: ExpandOutcome) -> Vec<Effect> {
    match outcome {
        ExpandOutcome::Fetch(path) => vec![Effect::ListDirectory(path)],
        ExpandOutcome::AlreadyLoading | ExpandOutcome::CacheHit => Vec::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
