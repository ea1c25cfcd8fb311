// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn write_then_read_round_trips_through_the_fake() {
    let fake = FakeToolExecutor::new(TaskId::new(), "/workspace");
    fake.write_file("a.txt", WriteFileRequest { content: "hi".to_string(), instructions: String::new() }).await;
    let read = fake.read_file("a.txt", ReadFileRequest { entire: true, start_line: None, end_line: None }).await;
    assert!(read.success);
    assert_eq!(read.content.as_deref(), Some("hi"));
}

#[tokio::test]
async fn read_missing_file_reports_file_not_found() {
    let fake = FakeToolExecutor::new(TaskId::new(), "/workspace");
    let read = fake.read_file("missing.txt", ReadFileRequest { entire: true, start_line: None, end_line: None }).await;
    assert!(!read.success);
    assert_eq!(read.error, Some(sbx_wire::ErrorCode::FileNotFound));
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let fake = FakeToolExecutor::new(TaskId::new(), "/workspace");
    fake.get_git_status().await;
    fake.get_git_diff().await;
    assert_eq!(*fake.calls.lock(), vec!["get_git_status".to_string(), "get_git_diff".to_string()]);
}

#[test]
fn remote_builder_flips_is_remote() {
    let fake = FakeToolExecutor::new(TaskId::new(), "/workspace").remote();
    assert!(fake.is_remote());
}
