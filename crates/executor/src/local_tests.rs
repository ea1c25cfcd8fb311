// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sbx_wire::{CommitIdentity, ErrorCode};
use tempfile::TempDir;

fn executor() -> (LocalToolExecutor, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let executor = LocalToolExecutor::new(TaskId::new(), dir.path());
    (executor, dir)
}

fn init_repo(dir: &Path) {
    let run = |args: &[&str]| {
        std::process::Command::new("git").args(args).current_dir(dir).output().expect("git");
    };
    run(&["init", "-q"]);
    run(&["config", "user.name", "Test"]);
    run(&["config", "user.email", "test@example.com"]);
}

#[tokio::test]
async fn write_then_read_file_round_trips() {
    let (exec, _dir) = executor();
    let write = exec.write_file("notes.txt", WriteFileRequest { content: "hello\nworld".to_string(), instructions: String::new() }).await;
    assert!(write.success);
    assert!(write.is_new_file);
    assert_eq!(write.lines_added, 2);

    let read = exec.read_file("notes.txt", ReadFileRequest { entire: true, start_line: None, end_line: None }).await;
    assert!(read.success);
    assert_eq!(read.content.as_deref(), Some("hello\nworld"));
    assert_eq!(read.total_lines, 2);
}

#[tokio::test]
async fn read_file_rejects_path_traversal() {
    let (exec, _dir) = executor();
    let read = exec.read_file("../../etc/passwd", ReadFileRequest { entire: true, start_line: None, end_line: None }).await;
    assert!(!read.success);
    assert_eq!(read.error, Some(ErrorCode::SecurityError));
}

#[tokio::test]
async fn read_file_clamps_to_default_window_when_not_entire() {
    let (exec, _dir) = executor();
    let content: String = (1..=300).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
    exec.write_file("big.txt", WriteFileRequest { content, instructions: String::new() }).await;

    let read = exec.read_file("big.txt", ReadFileRequest { entire: false, start_line: None, end_line: None }).await;
    assert!(read.success);
    assert_eq!(read.start_line, 1);
    assert_eq!(read.end_line, MAX_LINES_PER_READ);
}

#[tokio::test]
async fn read_file_with_end_before_start_clamps_to_a_single_line_window() {
    let (exec, _dir) = executor();
    let content: String = (1..=10).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
    exec.write_file("lines.txt", WriteFileRequest { content, instructions: String::new() }).await;

    let read = exec.read_file("lines.txt", ReadFileRequest { entire: false, start_line: Some(5), end_line: Some(2) }).await;
    assert!(read.success);
    assert_eq!(read.start_line, 5);
    assert_eq!(read.end_line, 5);
    assert_eq!(read.content.as_deref(), Some("5"));
}

#[tokio::test]
async fn delete_file_is_idempotent() {
    let (exec, _dir) = executor();
    exec.write_file("gone.txt", WriteFileRequest { content: "x".to_string(), instructions: String::new() }).await;
    let first = exec.delete_file("gone.txt").await;
    assert!(first.success);
    assert!(!first.was_already_deleted);

    let second = exec.delete_file("gone.txt").await;
    assert!(second.success);
    assert!(second.was_already_deleted);
}

#[tokio::test]
async fn search_replace_rejects_empty_old_string() {
    let (exec, _dir) = executor();
    exec.write_file("f.txt", WriteFileRequest { content: "abc".to_string(), instructions: String::new() }).await;
    let result = exec.search_replace("f.txt", ReplaceRequest { old_string: String::new(), new_string: "x".to_string() }).await;
    assert!(!result.success);
    assert_eq!(result.error, Some(ErrorCode::EmptyOldString));
}

#[tokio::test]
async fn search_replace_rejects_identical_strings() {
    let (exec, _dir) = executor();
    exec.write_file("f.txt", WriteFileRequest { content: "abc".to_string(), instructions: String::new() }).await;
    let result = exec.search_replace("f.txt", ReplaceRequest { old_string: "abc".to_string(), new_string: "abc".to_string() }).await;
    assert!(!result.success);
    assert_eq!(result.error, Some(ErrorCode::IdenticalStrings));
}

#[tokio::test]
async fn search_replace_rejects_non_unique_match() {
    let (exec, _dir) = executor();
    exec.write_file("f.txt", WriteFileRequest { content: "abc abc".to_string(), instructions: String::new() }).await;
    let result = exec.search_replace("f.txt", ReplaceRequest { old_string: "abc".to_string(), new_string: "xyz".to_string() }).await;
    assert!(!result.success);
    assert_eq!(result.error, Some(ErrorCode::TextNotUnique));
}

#[tokio::test]
async fn search_replace_rejects_missing_match() {
    let (exec, _dir) = executor();
    exec.write_file("f.txt", WriteFileRequest { content: "abc".to_string(), instructions: String::new() }).await;
    let result = exec.search_replace("f.txt", ReplaceRequest { old_string: "zzz".to_string(), new_string: "xyz".to_string() }).await;
    assert!(!result.success);
    assert_eq!(result.error, Some(ErrorCode::TextNotFound));
}

#[tokio::test]
async fn search_replace_succeeds_on_unique_match() {
    let (exec, _dir) = executor();
    exec.write_file("f.txt", WriteFileRequest { content: "abc def".to_string(), instructions: String::new() }).await;
    let result = exec.search_replace("f.txt", ReplaceRequest { old_string: "abc".to_string(), new_string: "xyz".to_string() }).await;
    assert!(result.success);
    assert_eq!(result.occurrences, 1);
}

#[tokio::test]
async fn list_directory_recursive_skips_ignored_dirs_and_sorts_dirs_first() {
    let (exec, dir) = executor();
    tokio::fs::create_dir_all(dir.path().join("node_modules")).await.unwrap();
    tokio::fs::write(dir.path().join("node_modules/junk.js"), "x").await.unwrap();
    tokio::fs::create_dir_all(dir.path().join("src")).await.unwrap();
    tokio::fs::write(dir.path().join("src/main.rs"), "x").await.unwrap();
    tokio::fs::write(dir.path().join("README.md"), "x").await.unwrap();

    let listing = exec.list_directory_recursive(".").await;
    assert!(listing.success);
    let paths: Vec<&str> = listing.entries.iter().map(|e| e.path.as_str()).collect();
    assert!(!paths.iter().any(|p| p.contains("node_modules")));
    assert!(paths.contains(&"src"));
    assert_eq!(listing.entries[0].entry_type, EntryType::Directory);
}

#[tokio::test]
async fn execute_command_returns_exit_code_and_stdout() {
    let (exec, _dir) = executor();
    let response = exec.execute_command(ExecuteCommandRequest { command: "echo hi".to_string(), is_background: false, timeout_ms: None, cwd: None }).await;
    assert!(response.success);
    assert_eq!(response.exit_code, Some(0));
    assert_eq!(response.stdout.as_deref(), Some("hi\n"));
}

#[tokio::test]
async fn execute_command_kills_on_timeout() {
    let (exec, _dir) = executor();
    let response = exec.execute_command(ExecuteCommandRequest { command: "sleep 5".to_string(), is_background: false, timeout_ms: Some(50), cwd: None }).await;
    assert!(!response.success);
    assert!(response.timed_out);
}

#[tokio::test]
async fn git_status_reports_untracked_and_clean_state() {
    let (exec, dir) = executor();
    init_repo(dir.path());

    let before = exec.get_git_status().await;
    assert!(before.success);
    assert!(before.clean);

    tokio::fs::write(dir.path().join("new.txt"), "x").await.unwrap();
    let after = exec.get_git_status().await;
    assert!(!after.clean);
    assert_eq!(after.untracked, vec!["new.txt".to_string()]);
}

#[tokio::test]
async fn commit_changes_creates_a_commit_sha() {
    let (exec, dir) = executor();
    init_repo(dir.path());
    tokio::fs::write(dir.path().join("new.txt"), "x").await.unwrap();

    let response = exec
        .commit_changes(CommitRequest {
            user: CommitIdentity { name: "Agent".to_string(), email: "agent@example.com".to_string() },
            co_author: None,
            message: "add file".to_string(),
        })
        .await;
    assert!(response.success);
    assert!(response.commit_sha.is_some());
}

#[tokio::test]
async fn commit_changes_fails_when_nothing_staged() {
    let (exec, dir) = executor();
    init_repo(dir.path());

    let response = exec
        .commit_changes(CommitRequest {
            user: CommitIdentity { name: "Agent".to_string(), email: "agent@example.com".to_string() },
            co_author: None,
            message: "empty".to_string(),
        })
        .await;
    assert!(!response.success);
}

#[test]
fn is_remote_and_task_id_reflect_local_identity() {
    let task_id = TaskId::new();
    let executor = LocalToolExecutor::new(task_id, "/tmp/workspace");
    assert!(!executor.is_remote());
    assert_eq!(executor.get_task_id(), task_id);
    assert_eq!(executor.get_workspace_path(), "/tmp/workspace");
}
