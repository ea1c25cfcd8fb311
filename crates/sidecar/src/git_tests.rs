// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use tokio::process::Command;

async fn init_repo(path: &std::path::Path) {
    git(path, &["init", "-q"]).await.unwrap();
    git(path, &["config", "user.name", "tester"]).await.unwrap();
    git(path, &["config", "user.email", "tester@example.com"]).await.unwrap();
    std::fs::write(path.join("README.md"), "hello\n").unwrap();
    git(path, &["add", "-A"]).await.unwrap();
    git(path, &["commit", "-q", "-m", "init"]).await.unwrap();
}

#[tokio::test]
async fn current_branch_and_commit_are_readable_after_init() {
    let dir = tempdir().unwrap();
    init_repo(dir.path()).await;
    let svc = GitService::new(dir.path());

    let branch = svc.current_branch().await.unwrap();
    assert!(!branch.is_empty());
    let sha = svc.current_commit().await.unwrap();
    assert_eq!(sha.len(), 40);
}

#[tokio::test]
async fn branch_create_then_diff_and_file_changes_against_base() {
    let dir = tempdir().unwrap();
    init_repo(dir.path()).await;
    let base = svc_current_branch(dir.path()).await;
    let svc = GitService::new(dir.path());

    svc.branch("shadow/t1", true, None).await.unwrap();
    std::fs::write(dir.path().join("a.txt"), "world\n").unwrap();
    git(dir.path(), &["add", "-A"]).await.unwrap();
    git(dir.path(), &["commit", "-q", "-m", "add a.txt"]).await.unwrap();

    let messages = svc.commit_messages(&base).await.unwrap();
    assert_eq!(messages, vec!["add a.txt".to_string()]);

    let files = svc.file_changes(&base).await.unwrap();
    assert_eq!(files, vec!["a.txt".to_string()]);

    let diff = svc.diff_against_base(&base).await.unwrap();
    assert!(diff.contains("a.txt"));
}

#[tokio::test]
async fn set_config_writes_local_git_config() {
    let dir = tempdir().unwrap();
    init_repo(dir.path()).await;
    let svc = GitService::new(dir.path());
    svc.set_config("user.name", "agent").await.unwrap();
    let name = git_output(dir.path(), &["config", "user.name"]).await.unwrap();
    assert_eq!(name.trim(), "agent");
}

async fn svc_current_branch(path: &std::path::Path) -> String {
    let out = Command::new("git").args(["rev-parse", "--abbrev-ref", "HEAD"]).current_dir(path).output().await.unwrap();
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}
