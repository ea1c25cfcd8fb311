// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RemoteToolExecutor` — routes every operation through [`SidecarClient`] to
//! a task's sidecar HTTP service instead of touching the filesystem directly
//! (§4.3, §4.4). Mirrors [`crate::local::LocalToolExecutor`]'s signatures
//! exactly; the wire DTOs are the same structs on both sides of the HTTP
//! boundary (§6).

use async_trait::async_trait;
use reqwest::Method;
use sbx_backends::SidecarClient;
use sbx_core::{Clock, TaskId};
use sbx_wire::{
    BackgroundCommandResponse, CommitRequest, CommitResponse, DeleteFileResponse, DiffResponse,
    ErrorCode, ExecuteCommandRequest, ExecuteCommandResponse, FileSearchRequest,
    FileSearchResponse, FileStatsResponse, GitStatusResponse, GrepRequest, GrepResponse,
    ListDirectoryResponse, PushRequest, PushResponse, ReadFileRequest, ReadFileResponse,
    ReplaceRequest, ReplaceResponse, WriteFileRequest, WriteFileResponse,
};

use crate::executor::ToolExecutor;

pub struct RemoteToolExecutor<C: Clock> {
    task_id: TaskId,
    base_url: String,
    workspace_path: String,
    client: SidecarClient<C>,
}

impl<C: Clock> RemoteToolExecutor<C> {
    pub fn new(task_id: TaskId, base_url: impl Into<String>, workspace_path: impl Into<String>, client: SidecarClient<C>) -> Self {
        Self { task_id, base_url: base_url.into(), workspace_path: workspace_path.into(), client }
    }

    async fn send<Req, Resp>(&self, method: Method, path: &str, body: Option<&Req>) -> Result<Resp, sbx_backends::TransportError>
    where
        Req: serde::Serialize + ?Sized,
        Resp: serde::de::DeserializeOwned,
    {
        self.client.request(&self.task_id, &self.base_url, method, path, body).await
    }
}

#[async_trait]
impl<C: Clock + 'static> ToolExecutor for RemoteToolExecutor<C> {
    async fn read_file(&self, path: &str, req: ReadFileRequest) -> ReadFileResponse {
        match self.send(Method::POST, &format!("/files/{path}"), Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => ReadFileResponse {
                success: false,
                content: None,
                total_lines: 0,
                start_line: 0,
                end_line: 0,
                message: e.to_string(),
                error: Some(transport_error_code(&e)),
            },
        }
    }

    async fn get_file_stats(&self, path: &str) -> FileStatsResponse {
        match self.send::<(), _>(Method::GET, &format!("/files/{path}/stats"), None).await {
            Ok(resp) => resp,
            Err(e) => FileStatsResponse { success: false, exists: false, size_bytes: None, line_count: None, message: e.to_string() },
        }
    }

    async fn write_file(&self, path: &str, req: WriteFileRequest) -> WriteFileResponse {
        match self.send(Method::POST, &format!("/files/{path}"), Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => WriteFileResponse { success: false, is_new_file: false, lines_added: 0, lines_removed: 0, message: e.to_string() },
        }
    }

    async fn delete_file(&self, path: &str) -> DeleteFileResponse {
        match self.send::<(), _>(Method::DELETE, &format!("/files/{path}"), None).await {
            Ok(resp) => resp,
            Err(e) => DeleteFileResponse { success: false, was_already_deleted: false, message: e.to_string() },
        }
    }

    async fn search_replace(&self, path: &str, req: ReplaceRequest) -> ReplaceResponse {
        match self.send(Method::POST, &format!("/files/{path}/replace"), Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => ReplaceResponse {
                success: false,
                occurrences: 0,
                old_length: 0,
                new_length: 0,
                lines_added: 0,
                lines_removed: 0,
                message: e.to_string(),
                error: Some(transport_error_code(&e)),
            },
        }
    }

    async fn list_directory(&self, path: &str) -> ListDirectoryResponse {
        match self.send::<(), _>(Method::GET, &format!("/directory/{path}"), None).await {
            Ok(resp) => resp,
            Err(e) => ListDirectoryResponse { success: false, entries: vec![], message: e.to_string() },
        }
    }

    async fn list_directory_recursive(&self, path: &str) -> ListDirectoryResponse {
        match self.send::<(), _>(Method::GET, &format!("/directory/{path}?recursive=true"), None).await {
            Ok(resp) => resp,
            Err(e) => ListDirectoryResponse { success: false, entries: vec![], message: e.to_string() },
        }
    }

    async fn search_files(&self, req: FileSearchRequest) -> FileSearchResponse {
        match self.send(Method::POST, "/search/files", Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => FileSearchResponse { success: false, paths: vec![], message: e.to_string() },
        }
    }

    async fn grep_search(&self, req: GrepRequest) -> GrepResponse {
        match self.send(Method::POST, "/search/grep", Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => GrepResponse { success: false, matches: vec![], detailed_matches: vec![], match_count: 0, message: e.to_string() },
        }
    }

    async fn execute_command(&self, req: ExecuteCommandRequest) -> ExecuteCommandResponse {
        match self.send(Method::POST, "/execute/command", Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => ExecuteCommandResponse {
                success: false,
                stdout: None,
                stderr: None,
                exit_code: None,
                is_background: false,
                message: e.to_string(),
                timed_out: matches!(e, sbx_backends::TransportError::Timeout(_)),
            },
        }
    }

    async fn execute_background_command(&self, req: ExecuteCommandRequest) -> BackgroundCommandResponse {
        match self.send(Method::POST, "/commands/background", Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => BackgroundCommandResponse { success: false, process_id: 0, message: e.to_string() },
        }
    }

    async fn get_git_status(&self) -> GitStatusResponse {
        match self.send::<(), _>(Method::GET, "/api/git/status", None).await {
            Ok(resp) => resp,
            Err(e) => GitStatusResponse { success: false, branch: String::new(), clean: false, staged: vec![], modified: vec![], untracked: vec![], message: e.to_string() },
        }
    }

    async fn get_git_diff(&self) -> DiffResponse {
        match self.send::<(), _>(Method::GET, "/api/git/diff", None).await {
            Ok(resp) => resp,
            Err(e) => DiffResponse { success: false, diff: String::new(), message: e.to_string() },
        }
    }

    async fn commit_changes(&self, req: CommitRequest) -> CommitResponse {
        match self.send(Method::POST, "/api/git/commit", Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => CommitResponse { success: false, commit_sha: None, message: e.to_string(), error: Some("TRANSPORT_ERROR".to_string()) },
        }
    }

    async fn push_branch(&self, req: PushRequest) -> PushResponse {
        match self.send(Method::POST, "/api/git/push", Some(&req)).await {
            Ok(resp) => resp,
            Err(e) => PushResponse { success: false, message: e.to_string(), error: Some("TRANSPORT_ERROR".to_string()) },
        }
    }

    fn get_workspace_path(&self) -> &str {
        &self.workspace_path
    }

    fn is_remote(&self) -> bool {
        true
    }

    fn get_task_id(&self) -> TaskId {
        self.task_id
    }
}

fn transport_error_code(_err: &sbx_backends::TransportError) -> ErrorCode {
    ErrorCode::InternalError
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
