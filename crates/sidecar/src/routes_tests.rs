// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::build_router;
use crate::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use sbx_core::{FakeClock, TaskId};
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

fn state(root: &std::path::Path) -> AppState<FakeClock> {
    AppState::new(TaskId::new(), root, FakeClock::new())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// E1: write then grep finds the new line.
#[tokio::test]
async fn write_then_grep_finds_the_written_line() {
    let dir = tempdir().unwrap();
    let router = build_router(state(dir.path()));

    let write_req = Request::builder()
        .method("POST")
        .uri("/files/src/a.txt")
        .header("content-type", "application/json")
        .body(Body::from(json!({"content": "hello\nworld\n", "instructions": "make file"}).to_string()))
        .unwrap();
    let resp = router.clone().oneshot(write_req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["is_new_file"], true);
    assert_eq!(body["lines_added"], 2);

    let grep_req = Request::builder()
        .method("POST")
        .uri("/search/grep")
        .header("content-type", "application/json")
        .body(Body::from(json!({"query": "world", "case_sensitive": false}).to_string()))
        .unwrap();
    let resp = router.oneshot(grep_req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["match_count"], 1);
    assert!(body["detailed_matches"][0]["file"].as_str().unwrap().ends_with("src/a.txt"));
    assert_eq!(body["detailed_matches"][0]["line_number"], 2);
}

/// E2: search/replace against a file with a duplicate needle fails closed.
#[tokio::test]
async fn search_replace_rejects_non_unique_match() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("f.txt"), "x\nx\n").unwrap();
    let router = build_router(state(dir.path()));

    let req = Request::builder()
        .method("POST")
        .uri("/files/f.txt/replace")
        .header("content-type", "application/json")
        .body(Body::from(json!({"old_string": "x", "new_string": "y"}).to_string()))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "TEXT_NOT_UNIQUE");
    assert_eq!(body["occurrences"], 2);
    assert_eq!(std::fs::read_to_string(dir.path().join("f.txt")).unwrap(), "x\nx\n");
}

/// E3: deleting an absent file twice is idempotent, never an error.
#[tokio::test]
async fn delete_missing_file_is_idempotent() {
    let dir = tempdir().unwrap();
    let router = build_router(state(dir.path()));

    for _ in 0..2 {
        let req = Request::builder().method("DELETE").uri("/files/gone.txt").body(Body::empty()).unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["was_already_deleted"], true);
    }
}

/// E5: a traversal attempt is rejected with a typed security error and
/// never reaches the filesystem.
#[tokio::test]
async fn path_traversal_is_rejected_with_400() {
    let dir = tempdir().unwrap();
    let router = build_router(state(dir.path()));

    let req = Request::builder().method("DELETE").uri("/files/../../etc/passwd").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "SECURITY_ERROR");
}

/// Reading a file that does not exist is a `404`, not a `200` wrapping
/// `success: false`.
#[tokio::test]
async fn read_missing_file_returns_404() {
    let dir = tempdir().unwrap();
    let router = build_router(state(dir.path()));

    let req = Request::builder()
        .method("POST")
        .uri("/files/gone.txt")
        .header("content-type", "application/json")
        .body(Body::from(json!({"entire": true}).to_string()))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "FILE_NOT_FOUND");
}

/// `search_replace` against a missing file is also a `404`.
#[tokio::test]
async fn search_replace_against_missing_file_returns_404() {
    let dir = tempdir().unwrap();
    let router = build_router(state(dir.path()));

    let req = Request::builder()
        .method("POST")
        .uri("/files/gone.txt/replace")
        .header("content-type", "application/json")
        .body(Body::from(json!({"old_string": "x", "new_string": "y"}).to_string()))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "FILE_NOT_FOUND");
}

#[tokio::test]
async fn health_reports_success() {
    let dir = tempdir().unwrap();
    let router = build_router(state(dir.path()));
    let req = Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["healthy"], true);
}

#[tokio::test]
async fn list_directory_recursive_skips_ignored_dirs() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("node_modules")).unwrap();
    std::fs::write(dir.path().join("node_modules/pkg.json"), "{}").unwrap();
    std::fs::write(dir.path().join("kept.txt"), "x").unwrap();
    let router = build_router(state(dir.path()));

    let req = Request::builder().method("GET").uri("/directory/.?recursive=true").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let paths: Vec<&str> = body["entries"].as_array().unwrap().iter().map(|e| e["path"].as_str().unwrap()).collect();
    assert!(paths.contains(&"kept.txt"));
    assert!(!paths.iter().any(|p| p.contains("node_modules")));
}
