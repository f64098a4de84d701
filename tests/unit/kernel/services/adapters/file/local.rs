use super::*;
use std::fs;
use std::future::Future;
use tempfile::tempdir;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn workspace_with_compiler(compiler: &str) -> LocalWorkspace {
    let settings = Settings {
        compiler_command: compiler.to_string(),
        compile_timeout_secs: 1,
        ..Settings::default()
    };
    LocalWorkspace::new(&settings)
}

#[test]
fn list_directory_puts_directories_first_then_names_case_insensitively() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.lvl"), "").unwrap();
    fs::write(dir.path().join("A.lvl"), "").unwrap();
    fs::create_dir(dir.path().join("zeta")).unwrap();
    fs::create_dir(dir.path().join("Alpha")).unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();

    let entries = block_on(LocalWorkspace::default().list_directory(dir.path().to_path_buf()))
        .unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "zeta", "A.lvl", "b.lvl"]);
    assert_eq!(entries[2].extension.as_deref(), Some(".lvl"));
    assert_eq!(entries[0].path, dir.path().join("Alpha"));
}

#[test]
fn list_directory_errors() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("f.lvl");
    fs::write(&file, "").unwrap();
    let backend = LocalWorkspace::default();

    assert!(matches!(
        block_on(backend.list_directory(dir.path().join("missing"))),
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        block_on(backend.list_directory(file)),
        Err(ServiceError::NotADirectory { .. })
    ));
}

#[test]
fn load_file_returns_content_verbatim() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.lvl");
    fs::write(&path, "x = 1\r\n\ty = 2  \n").unwrap();

    let loaded = block_on(LocalWorkspace::default().load_file(path.clone())).unwrap();
    assert_eq!(loaded.content, "x = 1\r\n\ty = 2  \n");
    assert_eq!(loaded.resolved_path, fs::canonicalize(&path).unwrap());
}

#[test]
fn load_file_rejects_directories_and_invalid_utf8() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("bin.lvl");
    fs::write(&bin, [0xff, 0xfe, 0x00]).unwrap();
    let backend = LocalWorkspace::default();

    assert!(matches!(
        block_on(backend.load_file(dir.path().to_path_buf())),
        Err(ServiceError::NotAFile { .. })
    ));
    assert!(matches!(
        block_on(backend.load_file(bin)),
        Err(ServiceError::Encoding { .. })
    ));
    assert!(matches!(
        block_on(backend.load_file(dir.path().join("nope.lvl"))),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn save_file_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deep").join("a.lvl");

    let saved =
        block_on(LocalWorkspace::default().save_file(path.clone(), "a\r\nb".to_string())).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\r\nb");
    assert_eq!(saved.resolved_path, fs::canonicalize(&path).unwrap());
}

#[cfg(unix)]
#[test]
fn compile_and_run_collects_stdout_and_stderr() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prog.lvl");
    fs::write(&path, "echo out\necho err >&2\n").unwrap();

    let output = block_on(workspace_with_compiler("sh").compile_and_run(path)).unwrap();
    assert_eq!(output.output, "out\n\nerr\n");
}

#[cfg(unix)]
#[test]
fn compile_and_run_runs_in_file_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prog.lvl");
    fs::write(&path, "ls\n").unwrap();

    let output = block_on(workspace_with_compiler("sh").compile_and_run(path)).unwrap();
    assert!(output.output.contains("prog.lvl"));
}

#[cfg(unix)]
#[test]
fn compile_and_run_reports_empty_success() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quiet.lvl");
    fs::write(&path, "true\n").unwrap();

    let output = block_on(workspace_with_compiler("sh").compile_and_run(path)).unwrap();
    assert_eq!(output.output, "Compilation completed successfully.");
}

#[cfg(unix)]
#[test]
fn compile_and_run_nonzero_exit_is_failure_with_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.lvl");
    fs::write(&path, "echo broken >&2\nexit 3\n").unwrap();

    let err = block_on(workspace_with_compiler("sh").compile_and_run(path)).unwrap_err();
    assert_eq!(
        err,
        ServiceError::CompileFailure {
            code: Some(3),
            output: "\nbroken\n".to_string(),
        }
    );
    assert_eq!(err.output(), Some("\nbroken\n"));
}

#[cfg(unix)]
#[test]
fn compile_and_run_times_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slow.lvl");
    fs::write(&path, "sleep 5\n").unwrap();

    let err = block_on(workspace_with_compiler("sh").compile_and_run(path)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Compilation timed out after 1 seconds"
    );
}

#[test]
fn missing_compiler_is_service_unavailable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.lvl");
    fs::write(&path, "").unwrap();

    let err = block_on(
        workspace_with_compiler("levlang-missing-compiler-for-tests").compile_and_run(path),
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::ServiceUnavailable { .. }));
    assert!(err.to_string().contains("not found"));
}

#[test]
fn search_in_files_runs_on_blocking_pool() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.lvl"), "let needle = 1\n").unwrap();

    let results = block_on(LocalWorkspace::default().search_in_files(
        dir.path().to_path_buf(),
        SearchQuery {
            pattern: "NEEDLE".to_string(),
            case_sensitive: false,
            use_regex: false,
        },
    ))
    .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "let needle = 1");
}
