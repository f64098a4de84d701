//! Lazily fetched directory tree.
//!
//! Directory children start out [`Children::Unfetched`]. The first expand
//! moves a directory to [`Children::Loading`] and asks the caller to fetch
//! its listing; the listing is stored in the order it was returned and is
//! reused by every later expand until the directory is invalidated.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Unfetched,
    Loading,
    Loaded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Children {
    Unfetched,
    Loading,
    Loaded(Vec<NodeId>),
}

impl Children {
    fn load_state(&self) -> LoadState {
        match self {
            Children::Unfetched => LoadState::Unfetched,
            Children::Loading => LoadState::Loading,
            Children::Loaded(_) => LoadState::Loaded,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileTreeError {
    #[error("unknown path: {}", .0.display())]
    UnknownPath(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone)]
enum NodeBody {
    File,
    Dir { children: Children, expanded: bool },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    path: PathBuf,
    extension: Option<String>,
    parent: Option<NodeId>,
    body: NodeBody,
}

impl Node {
    fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::File => NodeKind::File,
            NodeBody::Dir { .. } => NodeKind::Dir,
        }
    }
}

/// A listing entry handed to [`FileTreeCache::apply_listing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub extension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// The directory had never been fetched; the caller must list it.
    Fetch(PathBuf),
    /// A listing is already in flight.
    AlreadyLoading,
    CacheHit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Expanded(ExpandOutcome),
    Collapsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    File { path: PathBuf, name: String },
    Dir { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeRow {
    pub id: NodeId,
    pub path: PathBuf,
    pub depth: u16,
    pub name: String,
    pub is_dir: bool,
    pub is_expanded: bool,
    pub load_state: LoadState,
}

pub struct FileTreeCache {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
    id_by_path: FxHashMap<PathBuf, NodeId>,
}

impl std::fmt::Debug for FileTreeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTreeCache")
            .field("root", &self.root_path())
            .field("nodes", &self.arena.len())
            .finish()
    }
}

impl FileTreeCache {
    pub fn new(root_path: PathBuf) -> Self {
        let name = root_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| root_path.display().to_string());

        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node {
            name,
            path: root_path.clone(),
            extension: None,
            parent: None,
            body: NodeBody::Dir {
                children: Children::Unfetched,
                expanded: false,
            },
        });

        let mut id_by_path = FxHashMap::default();
        id_by_path.insert(root_path, root);

        Self {
            arena,
            root,
            id_by_path,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_path(&self) -> &Path {
        &self.arena[self.root].path
    }

    pub fn root_name(&self) -> &str {
        &self.arena[self.root].name
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.id_by_path.contains_key(path)
    }

    pub fn node_id(&self, path: &Path) -> Option<NodeId> {
        self.id_by_path.get(path).copied()
    }

    pub fn path_of(&self, id: NodeId) -> Option<&Path> {
        self.arena.get(id).map(|n| n.path.as_path())
    }

    pub fn kind(&self, path: &Path) -> Option<NodeKind> {
        self.node(path).ok().map(Node::kind)
    }

    pub fn extension(&self, path: &Path) -> Option<&str> {
        self.node(path).ok().and_then(|n| n.extension.as_deref())
    }

    pub fn load_state(&self, path: &Path) -> Option<LoadState> {
        match &self.node(path).ok()?.body {
            NodeBody::File => None,
            NodeBody::Dir { children, .. } => Some(children.load_state()),
        }
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        matches!(
            self.node(path).map(|n| &n.body),
            Ok(NodeBody::Dir { expanded: true, .. })
        )
    }

    /// Paths of the cached children, in listing order. `None` until fetched.
    pub fn children(&self, path: &Path) -> Option<Vec<&Path>> {
        match &self.node(path).ok()?.body {
            NodeBody::Dir {
                children: Children::Loaded(ids),
                ..
            } => Some(
                ids.iter()
                    .filter_map(|id| self.arena.get(*id))
                    .map(|n| n.path.as_path())
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn expand(&mut self, path: &Path) -> Result<ExpandOutcome, FileTreeError> {
        let (children, expanded) = self.dir_mut(path)?;
        *expanded = true;
        let outcome = match *children {
            Children::Unfetched => {
                *children = Children::Loading;
                ExpandOutcome::Fetch(path.to_path_buf())
            }
            Children::Loading => ExpandOutcome::AlreadyLoading,
            Children::Loaded(_) => ExpandOutcome::CacheHit,
        };
        Ok(outcome)
    }

    /// Collapses a directory. Cached children are kept.
    pub fn collapse(&mut self, path: &Path) -> Result<bool, FileTreeError> {
        let (_, expanded) = self.dir_mut(path)?;
        Ok(std::mem::replace(expanded, false))
    }

    pub fn toggle(&mut self, path: &Path) -> Result<ToggleOutcome, FileTreeError> {
        if self.is_expanded(path) {
            self.collapse(path)?;
            return Ok(ToggleOutcome::Collapsed);
        }
        self.expand(path).map(ToggleOutcome::Expanded)
    }

    pub fn select(&self, path: &Path) -> Result<Selection, FileTreeError> {
        let node = self.node(path)?;
        Ok(match node.body {
            NodeBody::File => Selection::File {
                path: node.path.clone(),
                name: node.name.clone(),
            },
            NodeBody::Dir { .. } => Selection::Dir {
                path: node.path.clone(),
            },
        })
    }

    /// Stores a listing for a directory that is waiting for one.
    ///
    /// Returns `Ok(false)` when the directory is not loading (the listing was
    /// superseded by an invalidation or a failure) and nothing was applied.
    pub fn apply_listing(
        &mut self,
        path: &Path,
        entries: Vec<ChildEntry>,
    ) -> Result<bool, FileTreeError> {
        let parent = self.node_id(path).ok_or_else(|| unknown(path))?;
        if self.load_state(path) != Some(LoadState::Loading) {
            return Ok(false);
        }

        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.id_by_path.contains_key(&entry.path) {
                continue;
            }
            let body = match entry.kind {
                NodeKind::File => NodeBody::File,
                NodeKind::Dir => NodeBody::Dir {
                    children: Children::Unfetched,
                    expanded: false,
                },
            };
            let id = self.arena.insert(Node {
                name: entry.name,
                path: entry.path.clone(),
                extension: entry.extension,
                parent: Some(parent),
                body,
            });
            self.id_by_path.insert(entry.path, id);
            ids.push(id);
        }

        let (children, _) = self.dir_mut(path)?;
        *children = Children::Loaded(ids);
        Ok(true)
    }

    /// A failed listing returns the directory to `Unfetched` so a later
    /// expand retries instead of staying stuck.
    pub fn apply_listing_failed(&mut self, path: &Path) -> Result<bool, FileTreeError> {
        let (children, expanded) = self.dir_mut(path)?;
        if *children != Children::Loading {
            return Ok(false);
        }
        *children = Children::Unfetched;
        *expanded = false;
        Ok(true)
    }

    /// Drops the cached subtree of a directory. Returns whether it was
    /// expanded, so the caller can re-expand (and re-fetch) it.
    pub fn invalidate(&mut self, path: &Path) -> Result<bool, FileTreeError> {
        let (children, expanded) = self.dir_mut(path)?;
        let was_expanded = std::mem::replace(expanded, false);
        let old = std::mem::replace(children, Children::Unfetched);
        if let Children::Loaded(ids) = old {
            for id in ids {
                self.remove_subtree(id);
            }
        }
        Ok(was_expanded)
    }

    pub fn parent_of(&self, path: &Path) -> Option<&Path> {
        let node = self.node(path).ok()?;
        node.parent
            .and_then(|p| self.arena.get(p))
            .map(|n| n.path.as_path())
    }

    pub fn flatten_for_view(&self) -> Vec<FileTreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, u16)> = Vec::new();
        self.push_visible_children(self.root, 0, &mut stack);

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            let (is_expanded, load_state) = match &node.body {
                NodeBody::File => (false, LoadState::Loaded),
                NodeBody::Dir { children, expanded } => (*expanded, children.load_state()),
            };
            rows.push(FileTreeRow {
                id,
                path: node.path.clone(),
                depth,
                name: node.name.clone(),
                is_dir: node.kind() == NodeKind::Dir,
                is_expanded,
                load_state,
            });
            self.push_visible_children(id, depth + 1, &mut stack);
        }

        rows
    }

    fn push_visible_children(&self, id: NodeId, depth: u16, stack: &mut Vec<(NodeId, u16)>) {
        if let Some(Node {
            body:
                NodeBody::Dir {
                    children: Children::Loaded(ids),
                    expanded: true,
                },
            ..
        }) = self.arena.get(id)
        {
            for child in ids.iter().rev() {
                stack.push((*child, depth));
            }
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.remove(node_id) else {
                continue;
            };
            self.id_by_path.remove(&node.path);
            if let NodeBody::Dir {
                children: Children::Loaded(ids),
                ..
            } = node.body
            {
                stack.extend(ids);
            }
        }
    }

    fn node(&self, path: &Path) -> Result<&Node, FileTreeError> {
        self.id_by_path
            .get(path)
            .and_then(|id| self.arena.get(*id))
            .ok_or_else(|| unknown(path))
    }

    fn dir_mut(&mut self, path: &Path) -> Result<(&mut Children, &mut bool), FileTreeError> {
        let id = self.node_id(path).ok_or_else(|| unknown(path))?;
        let node = self.arena.get_mut(id).ok_or_else(|| unknown(path))?;
        match &mut node.body {
            NodeBody::Dir { children, expanded } => Ok((children, expanded)),
            NodeBody::File => Err(FileTreeError::NotADirectory(path.to_path_buf())),
        }
    }
}

fn unknown(path: &Path) -> FileTreeError {
    FileTreeError::UnknownPath(path.to_path_buf())
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
