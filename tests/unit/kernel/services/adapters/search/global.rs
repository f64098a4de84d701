use super::*;
use std::fs;
use tempfile::tempdir;

fn query(pattern: &str, case_sensitive: bool, use_regex: bool) -> SearchQuery {
    SearchQuery {
        pattern: pattern.to_string(),
        case_sensitive,
        use_regex,
    }
}

#[test]
fn literal_search_escapes_metacharacters() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.lvl"), "call(x)\ncall y\n").unwrap();

    let results = search_workspace(dir.path(), &query("call(", true, false), &[], 100).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].line, 1);
    assert_eq!(results[0].text, "call(x)");
}

#[test]
fn case_insensitive_regex_search() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.lvl"), "  Print 1\nprint 2\nput 3\n").unwrap();

    let results =
        search_workspace(dir.path(), &query("^\\s*print", false, true), &[], 100).unwrap();
    let lines: Vec<_> = results.iter().map(|m| (m.line, m.text.as_str())).collect();
    assert_eq!(lines, vec![(1, "Print 1"), (2, "print 2")]);
}

#[test]
fn results_are_capped_and_lines_truncated() {
    let dir = tempdir().unwrap();
    let long = format!("x{}", "y".repeat(300));
    let content = std::iter::repeat(long.as_str()).take(10).collect::<Vec<_>>().join("\n");
    fs::write(dir.path().join("a.lvl"), content).unwrap();

    let results = search_workspace(dir.path(), &query("x", true, false), &[], 3).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|m| m.text.chars().count() == 100));
}

#[test]
fn ignored_names_hidden_and_binary_files_are_skipped() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("node_modules")).unwrap();
    fs::write(dir.path().join("node_modules").join("dep.lvl"), "needle").unwrap();
    fs::write(dir.path().join(".hidden.lvl"), "needle").unwrap();
    fs::write(dir.path().join("bin.dat"), b"needle\0\0").unwrap();
    fs::write(dir.path().join("main.lvl"), "needle").unwrap();

    let ignored = vec!["node_modules".to_string()];
    let results =
        search_workspace(dir.path(), &query("needle", true, false), &ignored, 100).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].path.ends_with("main.lvl"));
}

#[test]
fn invalid_regex_is_reported() {
    let dir = tempdir().unwrap();
    let err = search_workspace(dir.path(), &query("(", true, true), &[], 100).unwrap_err();
    assert!(err.to_string().starts_with("Invalid regex pattern"));
}
