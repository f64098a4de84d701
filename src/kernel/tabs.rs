//! Open-file tabs: ordering, active pointer and pin/close policy.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub path: PathBuf,
    pub display_name: String,
    pub modified: bool,
    pub pinned: bool,
}

impl Tab {
    fn new(path: PathBuf, display_name: String) -> Self {
        Self {
            path,
            display_name,
            modified: false,
            pinned: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    NotOpen,
    Pinned,
    Closed {
        /// Set when the closed tab was active.
        next_active: Option<Option<PathBuf>>,
    },
}

/// Tabs in display order. The position in `tabs` is the tab's order.
#[derive(Debug, Default)]
pub struct TabsState {
    tabs: Vec<Tab>,
    active: Option<PathBuf>,
}

impl TabsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn get(&self, path: &Path) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.path == path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index_of(path).is_some()
    }

    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.tabs.iter().position(|t| t.path == path)
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.as_deref().and_then(|p| self.get(p))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.as_deref().and_then(|p| self.index_of(p))
    }

    /// Activates the tab for `path`, creating it at the end when it is not
    /// open yet. Returns whether the active tab changed.
    pub fn open(&mut self, path: PathBuf, display_name: String) -> bool {
        if !self.contains(&path) {
            self.tabs.push(Tab::new(path.clone(), display_name));
        }
        self.set_active(path)
    }

    pub fn activate(&mut self, path: &Path) -> bool {
        if !self.contains(path) {
            return false;
        }
        self.set_active(path.to_path_buf())
    }

    pub fn close(&mut self, path: &Path) -> CloseOutcome {
        let Some(index) = self.index_of(path) else {
            return CloseOutcome::NotOpen;
        };
        if self.tabs[index].pinned {
            return CloseOutcome::Pinned;
        }

        self.tabs.remove(index);
        if self.active.as_deref() != Some(path) {
            return CloseOutcome::Closed { next_active: None };
        }

        self.active = if self.tabs.is_empty() {
            None
        } else {
            let next = index.saturating_sub(1).min(self.tabs.len() - 1);
            Some(self.tabs[next].path.clone())
        };
        CloseOutcome::Closed {
            next_active: Some(self.active.clone()),
        }
    }

    /// Flips the pin flag. A newly pinned tab moves to the front, ahead of
    /// tabs pinned earlier; unpinning keeps the current position.
    pub fn toggle_pin(&mut self, path: &Path) -> Option<bool> {
        let index = self.index_of(path)?;
        let pinned = !self.tabs[index].pinned;
        self.tabs[index].pinned = pinned;
        if pinned && index != 0 {
            let tab = self.tabs.remove(index);
            self.tabs.insert(0, tab);
        }
        Some(pinned)
    }

    pub fn set_modified(&mut self, path: &Path, modified: bool) -> bool {
        match self.tabs.iter_mut().find(|t| t.path == path) {
            Some(tab) if tab.modified != modified => {
                tab.modified = modified;
                true
            }
            _ => false,
        }
    }

    pub fn next(&mut self) -> bool {
        self.cycle(1)
    }

    pub fn prev(&mut self) -> bool {
        self.cycle(-1)
    }

    fn cycle(&mut self, delta: isize) -> bool {
        let len = self.tabs.len();
        if len <= 1 {
            return false;
        }
        let current = self.active_index().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        self.set_active(self.tabs[next].path.clone())
    }

    fn set_active(&mut self, path: PathBuf) -> bool {
        if self.active.as_ref() == Some(&path) {
            return false;
        }
        self.active = Some(path);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/tabs.rs"]
mod tests;
