use crate::kernel::services::ports::SearchMatch;

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub query_cursor: usize,
    pub case_sensitive: bool,
    pub use_regex: bool,
    pub searching: bool,
    pub active_search_id: Option<u64>,
    pub results: Vec<SearchMatch>,
    pub selected_index: usize,
    pub view_height: usize,
    pub scroll_offset: usize,
    pub last_error: Option<String>,
    next_search_id: u64,
}

impl SearchState {
    /// Resets results and hands out the id that the upcoming results must carry.
    /// Returns `None` for an empty query.
    pub fn begin_search(&mut self) -> Option<u64> {
        if self.query.is_empty() {
            return None;
        }

        self.next_search_id = self.next_search_id.wrapping_add(1);
        self.searching = true;
        self.active_search_id = Some(self.next_search_id);
        self.results.clear();
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.last_error = None;
        self.active_search_id
    }

    pub fn is_active(&self, search_id: u64) -> bool {
        self.active_search_id == Some(search_id)
    }

    pub fn apply_results(&mut self, search_id: u64, results: Vec<SearchMatch>) -> bool {
        if !self.is_active(search_id) {
            tracing::debug!(search_id, "dropping stale search results");
            return false;
        }
        self.searching = false;
        self.results = results;
        self.selected_index = 0;
        self.scroll_offset = 0;
        true
    }

    pub fn apply_error(&mut self, search_id: u64, message: String) -> bool {
        if !self.is_active(search_id) {
            return false;
        }
        self.searching = false;
        self.results.clear();
        self.last_error = Some(message);
        true
    }

    pub fn set_query(&mut self, query: String) -> bool {
        if self.query == query {
            return false;
        }
        self.query_cursor = query.len();
        self.query = query;
        true
    }

    pub fn append_query_char(&mut self, ch: char) -> bool {
        if self.query_cursor >= self.query.len() {
            self.query.push(ch);
        } else {
            self.query.insert(self.query_cursor, ch);
        }
        self.query_cursor += ch.len_utf8();
        true
    }

    pub fn backspace_query(&mut self) -> bool {
        if self.query_cursor == 0 {
            return false;
        }
        let prev = self.query[..self.query_cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.query.remove(prev);
        self.query_cursor = prev;
        true
    }

    pub fn toggle_case_sensitive(&mut self) -> bool {
        self.case_sensitive = !self.case_sensitive;
        true
    }

    pub fn toggle_regex(&mut self) -> bool {
        self.use_regex = !self.use_regex;
        true
    }

    pub fn selected(&self) -> Option<&SearchMatch> {
        self.results.get(self.selected_index)
    }

    pub fn set_view_height(&mut self, height: usize) -> bool {
        let height = height.max(1);
        if self.view_height == height {
            return false;
        }
        self.view_height = height;
        self.keep_row_visible(self.selected_index);
        true
    }

    pub fn move_selection(&mut self, delta: isize) -> bool {
        if self.results.is_empty() || delta == 0 {
            return false;
        }

        let prev = self.selected_index;
        let len = self.results.len();

        if delta < 0 {
            if self.selected_index > 0 {
                self.selected_index -= 1;
            } else {
                self.selected_index = len - 1;
            }
        } else if self.selected_index + 1 < len {
            self.selected_index += 1;
        } else {
            self.selected_index = 0;
        }

        self.keep_row_visible(self.selected_index);
        self.selected_index != prev
    }

    fn keep_row_visible(&mut self, row: usize) {
        let view_height = self.view_height.max(1);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + view_height {
            self.scroll_offset = row + 1 - view_height;
        }
        let max_scroll = self.results.len().saturating_sub(view_height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/search.rs"]
mod tests;
