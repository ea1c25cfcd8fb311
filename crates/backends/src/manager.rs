// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WorkspaceManager` — the sandbox lifecycle contract shared by the three
//! backends (§4.2).

use crate::error::BackendError;
use async_trait::async_trait;
use sbx_core::{TaskConfig, TaskId, WorkspaceInfo, WorkspaceStatus};

/// Lifecycle operations a backend must implement. Every method that can
/// fail returns a typed `BackendError`; `getWorkspaceStatus` never throws
/// (§4.2).
#[async_trait]
pub trait WorkspaceManager: Send + Sync {
    async fn prepare_workspace(&self, config: &TaskConfig) -> Result<WorkspaceInfo, BackendError>;

    async fn get_workspace_status(&self, task_id: &TaskId) -> WorkspaceStatus;

    /// Idempotent: calling twice on an already-absent sandbox still succeeds.
    async fn cleanup_workspace(&self, task_id: &TaskId) -> Result<(), BackendError>;

    async fn get_workspace_path(&self, task_id: &TaskId) -> Result<String, BackendError>;

    /// Look up the descriptor for an already-provisioned sandbox, without
    /// re-provisioning it — the registry-lookup half of `getExecutor`
    /// (`sbx-executor`'s `ExecutorFactory` builds the actual `ToolExecutor`
    /// from this, since that trait isn't visible from this crate). `NotFound`
    /// if the task has no registered sandbox, `NotRunning` if it has no
    /// usable endpoint yet (or, for the local backend, isn't `Ready` yet).
    async fn get_workspace_info(&self, task_id: &TaskId) -> Result<WorkspaceInfo, BackendError>;

    async fn health_check(&self, task_id: &TaskId) -> (bool, String);

    /// Whether calls to this backend's executor cross a network boundary.
    fn is_remote(&self) -> bool;
}
