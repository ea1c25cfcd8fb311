// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sbx_backends::{SidecarClient, SidecarClientConfig};
use sbx_core::{CircuitBreakerConfig, FakeClock};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config() -> SidecarClientConfig {
    SidecarClientConfig {
        request_timeout: Duration::from_secs(5),
        base_delay: Duration::from_millis(1),
        max_attempts: 2,
        breaker: CircuitBreakerConfig { threshold: 5, cooldown_ms: 60_000 },
    }
}

fn executor(server: &MockServer) -> RemoteToolExecutor<FakeClock> {
    let client = SidecarClient::with_config(FakeClock::new(), fast_config());
    RemoteToolExecutor::new(TaskId::new(), server.uri(), "/workspace", client)
}

#[tokio::test]
async fn read_file_returns_decoded_response_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files/notes.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "content": "hi",
            "total_lines": 1,
            "start_line": 1,
            "end_line": 1,
            "message": "ok",
        })))
        .mount(&server)
        .await;

    let exec = executor(&server);
    let resp = exec.read_file("notes.txt", ReadFileRequest { entire: true, start_line: None, end_line: None }).await;
    assert!(resp.success);
    assert_eq!(resp.content.as_deref(), Some("hi"));
}

#[tokio::test]
async fn read_file_falls_back_to_failure_shape_on_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/files/notes.txt")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let exec = executor(&server);
    let resp = exec.read_file("notes.txt", ReadFileRequest { entire: true, start_line: None, end_line: None }).await;
    assert!(!resp.success);
    assert!(resp.error.is_some());
}

#[tokio::test]
async fn write_file_posts_content_and_decodes_diff_counts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "is_new_file": true,
            "lines_added": 3,
            "lines_removed": 0,
            "message": "ok",
        })))
        .mount(&server)
        .await;

    let exec = executor(&server);
    let resp = exec.write_file("a.txt", WriteFileRequest { content: "a\nb\nc".to_string(), instructions: String::new() }).await;
    assert!(resp.success);
    assert_eq!(resp.lines_added, 3);
}

#[tokio::test]
async fn delete_file_uses_delete_method() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/files/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "was_already_deleted": false,
            "message": "ok",
        })))
        .mount(&server)
        .await;

    let exec = executor(&server);
    let resp = exec.delete_file("a.txt").await;
    assert!(resp.success);
}

#[tokio::test]
async fn grep_search_decodes_detailed_matches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/grep"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "matches": ["a.txt:1:hello"],
            "detailed_matches": [{"file": "a.txt", "line_number": 1, "content": "hello"}],
            "match_count": 1,
            "message": "ok",
        })))
        .mount(&server)
        .await;

    let exec = executor(&server);
    let resp = exec.grep_search(GrepRequest { query: "hello".to_string(), include_pattern: None, exclude_pattern: None, case_sensitive: false }).await;
    assert_eq!(resp.match_count, 1);
    assert_eq!(resp.detailed_matches[0].file, "a.txt");
}

#[tokio::test]
async fn is_remote_is_always_true() {
    let server = MockServer::start().await;
    let exec = executor(&server);
    assert!(exec.is_remote());
    assert_eq!(exec.get_workspace_path(), "/workspace");
}
