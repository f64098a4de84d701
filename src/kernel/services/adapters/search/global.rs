//! Workspace-wide text search.

use ignore::WalkBuilder;
use regex::{Regex, RegexBuilder};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::kernel::services::ports::{SearchMatch, SearchQuery, ServiceError, ServiceResult};

const MAX_LINE_CHARS: usize = 100;

pub fn build_matcher(query: &SearchQuery) -> ServiceResult<Regex> {
    let pattern = if query.use_regex {
        query.pattern.clone()
    } else {
        regex::escape(&query.pattern)
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(!query.case_sensitive)
        .build()
        .map_err(|e| ServiceError::unavailable(format!("Invalid regex pattern: {e}")))
}

/// Walks `root` in file-name order and collects at most `max_results`
/// matching lines. Hidden files, ignored names and files that are not UTF-8
/// text are skipped.
pub fn search_workspace(
    root: &Path,
    query: &SearchQuery,
    ignored_names: &[String],
    max_results: usize,
) -> ServiceResult<Vec<SearchMatch>> {
    let matcher = build_matcher(query)?;
    if !root.is_dir() {
        return Err(ServiceError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let ignored = ignored_names.to_vec();
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            !ignored.iter().any(|ignored| *ignored == name)
        })
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut results = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "search walk error");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let Some(content) = read_text(entry.path()) else {
            continue;
        };
        for (index, line) in content.lines().enumerate() {
            if !matcher.is_match(line) {
                continue;
            }
            results.push(SearchMatch {
                path: entry.path().to_path_buf(),
                line: index + 1,
                text: line.trim().chars().take(MAX_LINE_CHARS).collect(),
            });
            if results.len() >= max_results {
                return Ok(results);
            }
        }
    }

    Ok(results)
}

fn read_text(path: &Path) -> Option<String> {
    let mut bytes = Vec::new();
    File::open(path).ok()?.read_to_end(&mut bytes).ok()?;
    if is_likely_binary(&bytes) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

fn is_likely_binary(content: &[u8]) -> bool {
    content.iter().take(8192).any(|&b| b == 0)
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/global.rs"]
mod tests;
