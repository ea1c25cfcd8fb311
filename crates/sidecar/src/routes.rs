// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP route table (§4.5, §6). One axum handler per route; each file and
//! directory handler resolves its path through [`crate::workspace::WorkspaceService`]
//! first so path traversal is rejected before `LocalToolExecutor` ever sees
//! the request, then delegates the actual operation to the shared executor
//! so the sidecar and the control plane's local-mode backend answer
//! identically for the same input (§4.3's clamping/error-code contract).

use crate::error::SidecarError;
use crate::AppState;
use axum::extract::{Path as AxPath, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use sbx_core::Clock;
use sbx_executor::ToolExecutor as _;
use sbx_wire::{
    BackgroundCommandResponse, BranchRequest, CloneRequest, CloneResponse,
    CommitMessagesResponse, CommitRequest, ConfigRequest, ConfigResponse, CurrentBranchResponse,
    CurrentCommitResponse, DiffAgainstBaseRequest, DiffResponse, ErrorCode, ExecuteCommandRequest,
    ExecuteCommandResponse, FileChangesResponse, FileSearchRequest, GitStatusResponse, GrepRequest,
    HealthDetails, HealthResponse, PushRequest, ReadFileRequest, ReplaceRequest, StatusResponse,
    WriteFileRequest,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Instant;

pub fn build_router<C: Clock + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health::<C>))
        .route("/status", get(status::<C>))
        .route("/files/{*path}", get(files_get::<C>).post(files_post::<C>).delete(files_delete::<C>))
        .route("/directory/{*path}", get(directory_get::<C>))
        .route("/search/files", post(search_files::<C>))
        .route("/search/grep", post(search_grep::<C>))
        .route("/execute/command", post(execute_command::<C>))
        .route("/commands/background", post(execute_background::<C>))
        .route("/api/git/clone", post(git_clone::<C>))
        .route("/api/git/config", post(git_config::<C>))
        .route("/api/git/branch", post(git_branch::<C>))
        .route("/api/git/checkout", post(git_checkout::<C>))
        .route("/api/git/status", get(git_status::<C>))
        .route("/api/git/diff", get(git_diff::<C>))
        .route("/api/git/diff-against-base", post(git_diff_against_base::<C>))
        .route("/api/git/commit", post(git_commit::<C>))
        .route("/api/git/push", post(git_push::<C>))
        .route("/api/git/current-branch", get(git_current_branch::<C>))
        .route("/api/git/current-commit", get(git_current_commit::<C>))
        .route("/api/git/commit-messages", get(git_commit_messages::<C>))
        .route("/api/git/file-changes", get(git_file_changes::<C>))
        .layer(axum::middleware::from_fn(request_log))
        .with_state(state)
}

async fn request_log(req: axum::extract::Request, next: axum::middleware::Next) -> impl IntoResponse {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let response = next.run(req).await;
    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}

// ---- health / status --------------------------------------------------

async fn health<C: Clock>(State(state): State<AppState<C>>) -> Json<HealthResponse> {
    let uptime_ms = state.clock.epoch_ms().saturating_sub(state.started_at_ms);
    Json(HealthResponse {
        success: true,
        healthy: true,
        message: "ok".to_string(),
        details: Some(HealthDetails { uptime_ms, pid: std::process::id(), memory_bytes: state.terminal.memory_bytes() as u64 }),
    })
}

async fn status<C: Clock>(State(state): State<AppState<C>>) -> Json<StatusResponse> {
    let exists = state.workspace.root().exists();
    Json(StatusResponse {
        success: true,
        workspace_path: state.workspace.root().display().to_string(),
        exists,
        size_bytes: exists.then(|| state.workspace.size_bytes()),
    })
}

// ---- files --------------------------------------------------------------

/// A POST to `/files/{path}` carries either a read request (no required
/// fields) or a write request (`content` required); the body shape alone
/// disambiguates which operation the caller meant, matching
/// `RemoteToolExecutor` sending both through the same route (§6).
#[derive(Deserialize)]
#[serde(untagged)]
enum FileOpRequest {
    Write(WriteFileRequest),
    Read(ReadFileRequest),
}

/// `FileNotFound` is the only tool-level error that should surface as a
/// distinct HTTP status rather than `200` with `success: false` — it's the
/// one case `WorkspaceService::resolve` can't catch up front, since a path
/// can be confined and still not exist.
fn status_for_error(error: Option<ErrorCode>) -> StatusCode {
    match error {
        Some(ErrorCode::FileNotFound) => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    }
}

async fn files_get<C: Clock>(State(state): State<AppState<C>>, AxPath(path): AxPath<String>) -> axum::response::Response {
    let Some(file_path) = path.strip_suffix("/stats") else {
        return SidecarError::NotFound(format!("no GET route for /files/{path}")).into_response();
    };
    if let Err(e) = state.workspace.resolve(file_path) {
        return e.into_response();
    }
    Json(state.executor.get_file_stats(file_path).await).into_response()
}

async fn files_post<C: Clock>(
    State(state): State<AppState<C>>,
    AxPath(path): AxPath<String>,
    body: axum::body::Bytes,
) -> axum::response::Response {
    if let Some(file_path) = path.strip_suffix("/replace") {
        if let Err(e) = state.workspace.resolve(file_path) {
            return e.into_response();
        }
        let req: ReplaceRequest = match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => return SidecarError::Validation(e.to_string()).into_response(),
        };
        let resp = state.executor.search_replace(file_path, req).await;
        return (status_for_error(resp.error), Json(resp)).into_response();
    }

    if let Err(e) = state.workspace.resolve(&path) {
        return e.into_response();
    }
    let op: FileOpRequest = match serde_json::from_slice(&body) {
        Ok(op) => op,
        Err(e) => return SidecarError::Validation(e.to_string()).into_response(),
    };
    match op {
        FileOpRequest::Write(req) => Json(state.executor.write_file(&path, req).await).into_response(),
        FileOpRequest::Read(req) => {
            let resp = state.executor.read_file(&path, req).await;
            (status_for_error(resp.error), Json(resp)).into_response()
        }
    }
}

async fn files_delete<C: Clock>(State(state): State<AppState<C>>, AxPath(path): AxPath<String>) -> axum::response::Response {
    if let Err(e) = state.workspace.resolve(&path) {
        return e.into_response();
    }
    Json(state.executor.delete_file(&path).await).into_response()
}

// ---- directory ------------------------------------------------------------

async fn directory_get<C: Clock>(
    State(state): State<AppState<C>>,
    AxPath(path): AxPath<String>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    if let Err(e) = state.workspace.resolve(&path) {
        return e.into_response();
    }
    let recursive = params.get("recursive").is_some_and(|v| v == "true");
    if recursive {
        Json(state.executor.list_directory_recursive(&path).await).into_response()
    } else {
        Json(state.executor.list_directory(&path).await).into_response()
    }
}

// ---- search ---------------------------------------------------------------

async fn search_files<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<FileSearchRequest>) -> impl IntoResponse {
    Json(state.executor.search_files(req).await)
}

async fn search_grep<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<GrepRequest>) -> impl IntoResponse {
    Json(state.executor.grep_search(req).await)
}

// ---- command ----------------------------------------------------------

async fn execute_command<C: Clock + 'static>(State(state): State<AppState<C>>, Json(req): Json<ExecuteCommandRequest>) -> impl IntoResponse {
    let timeout = req.timeout_ms.map(std::time::Duration::from_millis).unwrap_or(sbx_executor::constants::DEFAULT_COMMAND_TIMEOUT);
    let outcome = state.commands.exec(&req.command, req.cwd.as_deref(), timeout).await;
    Json(ExecuteCommandResponse {
        success: outcome.success,
        stdout: outcome.stdout,
        stderr: outcome.stderr,
        exit_code: outcome.exit_code,
        is_background: false,
        message: outcome.message,
        timed_out: outcome.timed_out,
    })
}

async fn execute_background<C: Clock + 'static>(State(state): State<AppState<C>>, Json(req): Json<ExecuteCommandRequest>) -> impl IntoResponse {
    let outcome = state.commands.exec_background(&req.command, req.cwd.as_deref());
    Json(BackgroundCommandResponse { success: outcome.success, process_id: outcome.process_id, message: outcome.message })
}

// ---- git ----------------------------------------------------------------

async fn git_clone<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<CloneRequest>) -> Json<CloneResponse> {
    match state.git.clone_repo(&req.repo_url, &req.base_branch, req.shadow_branch.as_deref()).await {
        Ok(()) => Json(CloneResponse { success: true, message: "ok".to_string(), error: None }),
        Err(e) => Json(CloneResponse { success: false, message: e, error: Some("CLONE_FAILED".to_string()) }),
    }
}

async fn git_config<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<ConfigRequest>) -> Json<ConfigResponse> {
    match state.git.set_config(&req.key, &req.value).await {
        Ok(()) => Json(ConfigResponse { success: true, message: "ok".to_string() }),
        Err(e) => Json(ConfigResponse { success: false, message: e }),
    }
}

async fn git_branch<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<BranchRequest>) -> impl IntoResponse {
    git_checkout_like(&state, req).await
}

async fn git_checkout<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<BranchRequest>) -> impl IntoResponse {
    git_checkout_like(&state, req).await
}

async fn git_checkout_like<C: Clock>(state: &AppState<C>, req: BranchRequest) -> Json<GitStatusResponse> {
    match state.git.branch(&req.branch, req.create, req.base.as_deref()).await {
        Ok(()) => Json(state.executor.get_git_status().await),
        Err(e) => Json(GitStatusResponse {
            success: false,
            branch: req.branch,
            clean: false,
            staged: vec![],
            modified: vec![],
            untracked: vec![],
            message: e,
        }),
    }
}

async fn git_status<C: Clock>(State(state): State<AppState<C>>) -> impl IntoResponse {
    Json(state.executor.get_git_status().await)
}

async fn git_diff<C: Clock>(State(state): State<AppState<C>>) -> impl IntoResponse {
    Json(state.executor.get_git_diff().await)
}

async fn git_diff_against_base<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<DiffAgainstBaseRequest>) -> Json<DiffResponse> {
    match state.git.diff_against_base(&req.base_branch).await {
        Ok(diff) => Json(DiffResponse { success: true, diff, message: "ok".to_string() }),
        Err(e) => Json(DiffResponse { success: false, diff: String::new(), message: e }),
    }
}

async fn git_commit<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<CommitRequest>) -> impl IntoResponse {
    Json(state.executor.commit_changes(req).await)
}

async fn git_push<C: Clock>(State(state): State<AppState<C>>, Json(req): Json<PushRequest>) -> impl IntoResponse {
    Json(state.executor.push_branch(req).await)
}

async fn git_current_branch<C: Clock>(State(state): State<AppState<C>>) -> Json<CurrentBranchResponse> {
    match state.git.current_branch().await {
        Ok(branch) => Json(CurrentBranchResponse { success: true, branch, message: "ok".to_string() }),
        Err(e) => Json(CurrentBranchResponse { success: false, branch: String::new(), message: e }),
    }
}

async fn git_current_commit<C: Clock>(State(state): State<AppState<C>>) -> Json<CurrentCommitResponse> {
    match state.git.current_commit().await {
        Ok(sha) => Json(CurrentCommitResponse { success: true, sha, message: "ok".to_string() }),
        Err(e) => Json(CurrentCommitResponse { success: false, sha: String::new(), message: e }),
    }
}

#[derive(Deserialize)]
struct BaseQuery {
    base: String,
}

async fn git_commit_messages<C: Clock>(State(state): State<AppState<C>>, Query(q): Query<BaseQuery>) -> Json<CommitMessagesResponse> {
    match state.git.commit_messages(&q.base).await {
        Ok(messages) => Json(CommitMessagesResponse { success: true, messages, message: "ok".to_string() }),
        Err(e) => Json(CommitMessagesResponse { success: false, messages: vec![], message: e }),
    }
}

async fn git_file_changes<C: Clock>(State(state): State<AppState<C>>, Query(q): Query<BaseQuery>) -> Json<FileChangesResponse> {
    match state.git.file_changes(&q.base).await {
        Ok(files) => Json(FileChangesResponse { success: true, files, message: "ok".to_string() }),
        Err(e) => Json(FileChangesResponse { success: false, files: vec![], message: e }),
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
