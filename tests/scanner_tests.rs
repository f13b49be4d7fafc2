//! Tests for task folder discovery on a real filesystem.

use std::fs;
use std::path::Path;
use task_folders::error::ErrorCode;
use task_folders::scanner::{is_task_folder_name, scan, scan_all, scan_root};
use tempfile::TempDir;

fn make_dirs(root: &Path, names: &[&str]) {
    for name in names {
        fs::create_dir(root.join(name)).unwrap();
    }
}

#[test]
fn name_validation_examples() {
    assert!(is_task_folder_name("2024-03-04_01_Report"));
    assert!(!is_task_folder_name("2024-09_01_Report"));
    assert!(!is_task_folder_name("2024-13-04_01_Report"));
    assert!(!is_task_folder_name("00-history"));
}

#[test]
fn scan_single_root_yields_matching_folder_only() {
    let root = TempDir::new().unwrap();
    make_dirs(root.path(), &["2024-09-04_01_任务名称", "notes"]);

    let found = scan_all([root.path()]).unwrap();

    assert_eq!(found.len(), 1);
    let desc = &found[0];
    assert_eq!(desc.date, "2024-09-04");
    assert_eq!(desc.title, "任务名称");
    assert_eq!(desc.sequence_number, 1);
    assert!(desc.folder_path.ends_with("2024-09-04_01_任务名称"));
    assert_eq!(desc.folder_path, root.path().join("2024-09-04_01_任务名称"));
    assert_eq!(desc.root_path, root.path());
}

#[test]
fn files_and_nested_folders_are_ignored() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("2024-01-01_01_file.txt"), "x").unwrap();
    make_dirs(root.path(), &["container"]);
    make_dirs(&root.path().join("container"), &["2024-01-02_01_nested"]);

    assert!(scan_root(root.path()).unwrap().is_empty());
}

#[test]
fn titles_keep_underscores() {
    let root = TempDir::new().unwrap();
    make_dirs(root.path(), &["2024-01-02_3_big_project_v2"]);

    let found = scan_root(root.path()).unwrap();
    assert_eq!(found[0].title, "big_project_v2");
    assert_eq!(found[0].sequence_number, 3);
}

#[test]
fn results_are_root_major_and_not_deduplicated() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    make_dirs(first.path(), &["2024-01-01_01_a", "2024-01-01_02_b"]);
    make_dirs(second.path(), &["2024-01-01_01_a"]);

    let found = scan_all([first.path(), second.path()]).unwrap();

    assert_eq!(found.len(), 3);
    assert!(found[..2].iter().all(|d| d.root_path == first.path()));
    assert_eq!(found[2].root_path, second.path());
    assert_eq!(found[2].title, "a");
}

#[test]
fn missing_root_is_filesystem_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    let err = scan_root(&missing).unwrap_err();
    assert_eq!(err.code, ErrorCode::FilesystemError);
}

#[test]
fn file_root_is_filesystem_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("plain");
    fs::write(&file, "").unwrap();

    let err = scan_root(&file).unwrap_err();
    assert_eq!(err.code, ErrorCode::FilesystemError);
}

#[test]
fn scan_stops_at_failing_root() {
    let good = TempDir::new().unwrap();
    let later = TempDir::new().unwrap();
    make_dirs(good.path(), &["2024-01-01_01_a"]);
    make_dirs(later.path(), &["2024-01-01_01_b"]);
    let missing = good.path().join("missing");

    let results: Vec<_> = scan([good.path(), missing.as_path(), later.path()]).collect();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().title, "a");
    assert_eq!(
        results[1].as_ref().unwrap_err().code,
        ErrorCode::FilesystemError
    );
}

#[test]
fn scan_is_lazy_per_root() {
    let good = TempDir::new().unwrap();
    make_dirs(good.path(), &["2024-01-01_01_a"]);
    let missing = good.path().join("missing");

    // The failing second root is only touched once the first is exhausted.
    let mut iter = scan([good.path(), missing.as_path()]);
    assert!(iter.next().unwrap().is_ok());
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
}

#[test]
fn empty_root_list_yields_nothing() {
    let roots: Vec<&Path> = Vec::new();
    assert!(scan_all(roots).unwrap().is_empty());
}
