// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ToolExecutor` — the uniform facade every tool call is routed through,
//! regardless of which backend hosts the sandbox (§4.3).
//!
//! A trait object with two production implementations ([`crate::local::LocalToolExecutor`],
//! [`crate::remote::RemoteToolExecutor`]) — mode-polymorphic rather than a
//! three-way enum with a baked-in mock branch. The mock used by other
//! crates' tests lives under `test-support` (`crate::mock::FakeToolExecutor`).

use async_trait::async_trait;
use sbx_core::TaskId;
use sbx_wire::{
    BackgroundCommandResponse, CommitRequest, CommitResponse, DeleteFileResponse,
    DiffResponse, ExecuteCommandRequest, ExecuteCommandResponse, FileSearchRequest,
    FileSearchResponse, FileStatsResponse, GitStatusResponse, GrepRequest, GrepResponse,
    ListDirectoryResponse, PushRequest, PushResponse, ReadFileRequest, ReadFileResponse,
    ReplaceRequest, ReplaceResponse, WriteFileRequest, WriteFileResponse,
};

/// Every operation returns a structured result (`success`, `message`,
/// optional `error`) rather than an exception — tool-level failures never
/// surface as `Err` (§7's propagation policy).
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn read_file(&self, path: &str, req: ReadFileRequest) -> ReadFileResponse;
    async fn get_file_stats(&self, path: &str) -> FileStatsResponse;
    async fn write_file(&self, path: &str, req: WriteFileRequest) -> WriteFileResponse;
    async fn delete_file(&self, path: &str) -> DeleteFileResponse;
    async fn search_replace(&self, path: &str, req: ReplaceRequest) -> ReplaceResponse;
    async fn list_directory(&self, path: &str) -> ListDirectoryResponse;
    async fn list_directory_recursive(&self, path: &str) -> ListDirectoryResponse;

    async fn search_files(&self, req: FileSearchRequest) -> FileSearchResponse;
    async fn grep_search(&self, req: GrepRequest) -> GrepResponse;
    /// No embeddings index is specified anywhere in the system this trait
    /// models; this delegates to a name-based search over `repo` as the
    /// closest available signal rather than fabricating a vector store.
    async fn semantic_search(&self, query: &str, repo: &str) -> FileSearchResponse {
        self.search_files(FileSearchRequest { query: query.to_string(), target_dirs: vec![repo.to_string()] }).await
    }

    async fn execute_command(&self, req: ExecuteCommandRequest) -> ExecuteCommandResponse;
    async fn execute_background_command(&self, req: ExecuteCommandRequest) -> BackgroundCommandResponse;

    async fn get_git_status(&self) -> GitStatusResponse;
    async fn get_git_diff(&self) -> DiffResponse;
    async fn commit_changes(&self, req: CommitRequest) -> CommitResponse;
    async fn push_branch(&self, req: PushRequest) -> PushResponse;

    fn get_workspace_path(&self) -> &str;
    fn is_remote(&self) -> bool;
    fn get_task_id(&self) -> TaskId;
}
