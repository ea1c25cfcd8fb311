// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ExecutorFactory` — completes the Backend Factory contract's other half
//! (§3's "picking a `WorkspaceManager` and `ToolExecutor` pair").
//!
//! [`sbx_backends::BackendFactory`] alone can only build a `WorkspaceManager`:
//! pairing it with a `ToolExecutor` from inside `sbx-backends` would force
//! that crate to depend on `sbx-executor`'s trait while `sbx-executor`
//! already depends on `sbx-backends`, a cycle. This type lives on the
//! `sbx-executor` side of that boundary instead, holding both a
//! `BackendFactory` and a `SidecarClient` and handing back a matched
//! `(WorkspaceManager, ToolExecutor)` pair for one task after provisioning.

use crate::error::ExecutorError;
use crate::executor::ToolExecutor;
use crate::local::LocalToolExecutor;
use crate::remote::RemoteToolExecutor;
use sbx_backends::{BackendFactory, SandboxMode, SidecarClient, WorkspaceManager};
use sbx_core::{Clock, TaskConfig};
use std::sync::Arc;

pub struct ExecutorFactory<C: Clock> {
    backends: BackendFactory<C>,
    sidecar: SidecarClient<C>,
}

impl<C: Clock + 'static> ExecutorFactory<C> {
    pub fn new(clock: C) -> Self {
        let sidecar = SidecarClient::new(clock.clone());
        Self { backends: BackendFactory::new(clock), sidecar }
    }

    pub fn with_sidecar_client(clock: C, sidecar: SidecarClient<C>) -> Self {
        Self { backends: BackendFactory::new(clock), sidecar }
    }

    /// Provision a workspace for `config` and pair it with the matching
    /// executor: a [`LocalToolExecutor`] for the local backend, a
    /// [`RemoteToolExecutor`] routed through the shared `SidecarClient`
    /// otherwise.
    pub async fn create(
        &self,
        config: &TaskConfig,
        mode: Option<SandboxMode>,
    ) -> Result<(Arc<dyn WorkspaceManager>, Arc<dyn ToolExecutor>), ExecutorError> {
        let manager = self.backends.create_workspace_manager(mode).await?;
        let info = manager.prepare_workspace(config).await?;

        let executor: Arc<dyn ToolExecutor> = if info.is_remote() {
            let endpoint = info.endpoint.clone().ok_or(ExecutorError::NotRunning)?;
            Arc::new(RemoteToolExecutor::new(config.task_id, endpoint, info.workspace_path.clone(), self.sidecar.clone()))
        } else {
            Arc::new(LocalToolExecutor::new(config.task_id, info.workspace_path.clone()))
        };

        Ok((manager, executor))
    }

    /// Fetch a `ToolExecutor` for a sandbox `manager` has already
    /// provisioned, without re-provisioning it (`getExecutor`). `manager`
    /// must be the same instance `create` returned for this task — each
    /// backend's registry is process-local, not shared.
    pub async fn get_executor(
        &self,
        manager: &Arc<dyn WorkspaceManager>,
        config: &TaskConfig,
    ) -> Result<Arc<dyn ToolExecutor>, ExecutorError> {
        let info = manager.get_workspace_info(&config.task_id).await?;

        let executor: Arc<dyn ToolExecutor> = if info.is_remote() {
            let endpoint = info.endpoint.clone().ok_or(ExecutorError::NotRunning)?;
            Arc::new(RemoteToolExecutor::new(config.task_id, endpoint, info.workspace_path.clone(), self.sidecar.clone()))
        } else {
            Arc::new(LocalToolExecutor::new(config.task_id, info.workspace_path.clone()))
        };

        Ok(executor)
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
