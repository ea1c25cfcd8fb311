// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `FakeToolExecutor` — an in-memory, canned-response double for tests that
//! need a `ToolExecutor` but shouldn't exercise a real filesystem or HTTP
//! call. Gated behind `test-support`, the same way `executor.rs` gates its
//! own mock seam.

use crate::executor::ToolExecutor;
use async_trait::async_trait;
use parking_lot::Mutex;
use sbx_core::TaskId;
use sbx_wire::{
    BackgroundCommandResponse, CommitRequest, CommitResponse, DeleteFileResponse, DiffResponse,
    ExecuteCommandRequest, ExecuteCommandResponse, FileSearchRequest, FileSearchResponse,
    FileStatsResponse, GitStatusResponse, GrepRequest, GrepResponse, ListDirectoryResponse,
    PushRequest, PushResponse, ReadFileRequest, ReadFileResponse, ReplaceRequest, ReplaceResponse,
    WriteFileRequest, WriteFileResponse,
};
use std::collections::HashMap;

/// Calls recorded for assertions, keyed by operation name.
#[derive(Default)]
pub struct FakeToolExecutor {
    task_id: TaskId,
    workspace_path: String,
    is_remote: bool,
    pub files: Mutex<HashMap<String, String>>,
    pub calls: Mutex<Vec<String>>,
    pub command_response: Mutex<Option<ExecuteCommandResponse>>,
}

impl FakeToolExecutor {
    pub fn new(task_id: TaskId, workspace_path: impl Into<String>) -> Self {
        Self {
            task_id,
            workspace_path: workspace_path.into(),
            is_remote: false,
            files: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            command_response: Mutex::new(None),
        }
    }

    pub fn remote(mut self) -> Self {
        self.is_remote = true;
        self
    }

    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.lock().insert(path.into(), content.into());
        self
    }

    pub fn set_command_response(&self, response: ExecuteCommandResponse) {
        *self.command_response.lock() = Some(response);
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }
}

#[async_trait]
impl ToolExecutor for FakeToolExecutor {
    async fn read_file(&self, path: &str, _req: ReadFileRequest) -> ReadFileResponse {
        self.record("read_file");
        match self.files.lock().get(path) {
            Some(content) => {
                let total_lines = content.lines().count() as u32;
                ReadFileResponse { success: true, content: Some(content.clone()), total_lines, start_line: 1, end_line: total_lines, message: "ok".to_string(), error: None }
            }
            None => ReadFileResponse {
                success: false,
                content: None,
                total_lines: 0,
                start_line: 0,
                end_line: 0,
                message: format!("not found: {path}"),
                error: Some(sbx_wire::ErrorCode::FileNotFound),
            },
        }
    }

    async fn get_file_stats(&self, path: &str) -> FileStatsResponse {
        self.record("get_file_stats");
        match self.files.lock().get(path) {
            Some(content) => FileStatsResponse { success: true, exists: true, size_bytes: Some(content.len() as u64), line_count: Some(content.lines().count() as u32), message: "ok".to_string() },
            None => FileStatsResponse { success: true, exists: false, size_bytes: None, line_count: None, message: "not found".to_string() },
        }
    }

    async fn write_file(&self, path: &str, req: WriteFileRequest) -> WriteFileResponse {
        self.record("write_file");
        let is_new_file = !self.files.lock().contains_key(path);
        self.files.lock().insert(path.to_string(), req.content);
        WriteFileResponse { success: true, is_new_file, lines_added: 0, lines_removed: 0, message: "ok".to_string() }
    }

    async fn delete_file(&self, path: &str) -> DeleteFileResponse {
        self.record("delete_file");
        let was_already_deleted = self.files.lock().remove(path).is_none();
        DeleteFileResponse { success: true, was_already_deleted, message: "ok".to_string() }
    }

    async fn search_replace(&self, path: &str, req: ReplaceRequest) -> ReplaceResponse {
        self.record("search_replace");
        let mut files = self.files.lock();
        match files.get_mut(path) {
            Some(content) if content.contains(&req.old_string) => {
                *content = content.replacen(&req.old_string, &req.new_string, 1);
                ReplaceResponse { success: true, occurrences: 1, old_length: req.old_string.len(), new_length: req.new_string.len(), lines_added: 0, lines_removed: 0, message: "ok".to_string(), error: None }
            }
            _ => ReplaceResponse { success: false, occurrences: 0, old_length: 0, new_length: 0, lines_added: 0, lines_removed: 0, message: "not found".to_string(), error: Some(sbx_wire::ErrorCode::TextNotFound) },
        }
    }

    async fn list_directory(&self, _path: &str) -> ListDirectoryResponse {
        self.record("list_directory");
        ListDirectoryResponse { success: true, entries: vec![], message: "ok".to_string() }
    }

    async fn list_directory_recursive(&self, _path: &str) -> ListDirectoryResponse {
        self.record("list_directory_recursive");
        ListDirectoryResponse { success: true, entries: vec![], message: "ok".to_string() }
    }

    async fn search_files(&self, _req: FileSearchRequest) -> FileSearchResponse {
        self.record("search_files");
        FileSearchResponse { success: true, paths: self.files.lock().keys().cloned().collect(), message: "ok".to_string() }
    }

    async fn grep_search(&self, _req: GrepRequest) -> GrepResponse {
        self.record("grep_search");
        GrepResponse { success: true, matches: vec![], detailed_matches: vec![], match_count: 0, message: "ok".to_string() }
    }

    async fn execute_command(&self, _req: ExecuteCommandRequest) -> ExecuteCommandResponse {
        self.record("execute_command");
        self.command_response.lock().clone().unwrap_or(ExecuteCommandResponse {
            success: true,
            stdout: Some(String::new()),
            stderr: Some(String::new()),
            exit_code: Some(0),
            is_background: false,
            message: "ok".to_string(),
            timed_out: false,
        })
    }

    async fn execute_background_command(&self, _req: ExecuteCommandRequest) -> BackgroundCommandResponse {
        self.record("execute_background_command");
        BackgroundCommandResponse { success: true, process_id: 1, message: "started".to_string() }
    }

    async fn get_git_status(&self) -> GitStatusResponse {
        self.record("get_git_status");
        GitStatusResponse { success: true, branch: "shadow/test".to_string(), clean: true, staged: vec![], modified: vec![], untracked: vec![], message: "ok".to_string() }
    }

    async fn get_git_diff(&self) -> DiffResponse {
        self.record("get_git_diff");
        DiffResponse { success: true, diff: String::new(), message: "ok".to_string() }
    }

    async fn commit_changes(&self, _req: CommitRequest) -> CommitResponse {
        self.record("commit_changes");
        CommitResponse { success: true, commit_sha: Some("deadbeef".to_string()), message: "ok".to_string(), error: None }
    }

    async fn push_branch(&self, _req: PushRequest) -> PushResponse {
        self.record("push_branch");
        PushResponse { success: true, message: "ok".to_string(), error: None }
    }

    fn get_workspace_path(&self) -> &str {
        &self.workspace_path
    }

    fn is_remote(&self) -> bool {
        self.is_remote
    }

    fn get_task_id(&self) -> TaskId {
        self.task_id
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
