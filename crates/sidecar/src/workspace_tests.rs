// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn resolves_in_bounds_relative_path() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
    let svc = WorkspaceService::new(dir.path());
    let resolved = svc.resolve("a.txt").unwrap();
    assert_eq!(resolved, dir.path().join("a.txt"));
}

#[test]
fn resolves_not_yet_existing_path_under_root() {
    let dir = tempdir().unwrap();
    let svc = WorkspaceService::new(dir.path());
    let resolved = svc.resolve("new/nested/file.txt").unwrap();
    assert_eq!(resolved, dir.path().join("new/nested/file.txt"));
}

#[test]
fn rejects_dot_dot_traversal() {
    let dir = tempdir().unwrap();
    let svc = WorkspaceService::new(dir.path());
    let err = svc.resolve("../../etc/passwd").unwrap_err();
    assert!(matches!(err, SidecarError::PathTraversal));
}

#[test]
fn size_bytes_sums_nested_files() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "1234").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub/b.txt"), "12").unwrap();
    let svc = WorkspaceService::new(dir.path());
    assert_eq!(svc.size_bytes(), 6);
}
