// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LocalWorkspaceManager` — process-local sandbox, no network boundary.
//!
//! Provisioning follows the same two-phase shape as `adapters::workspace`'s
//! `LocalWorkspaceAdapter`: create the directory,
//! clone the repo, then report ready/failed — unified here behind the same
//! `WorkspaceManager` trait the remote backends implement, instead of a
//! parallel ad hoc code path (REDESIGN FLAGS, "Git operations in local
//! mode").

use crate::error::BackendError;
use crate::manager::WorkspaceManager;
use crate::registry::SandboxRegistry;
use async_trait::async_trait;
use sbx_core::{BackendKind, Clock, Sandbox, SandboxPhase, TaskConfig, TaskId, WorkspaceInfo, WorkspaceStatus};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Root directory under which every local sandbox gets its own subdirectory.
///
/// `SBX_WORKSPACE_ROOT` env var, falling back to a temp-dir sibling of the
/// process.
pub fn workspace_root() -> PathBuf {
    std::env::var("SBX_WORKSPACE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("sbx-workspaces"))
}

pub struct LocalWorkspaceManager<C: Clock> {
    registry: SandboxRegistry,
    clock: C,
    root: PathBuf,
}

impl<C: Clock> LocalWorkspaceManager<C> {
    pub fn new(clock: C) -> Self {
        Self { registry: SandboxRegistry::new(), clock, root: workspace_root() }
    }

    fn path_for(&self, config: &TaskConfig) -> PathBuf {
        self.root.join(config.sandbox_name())
    }

    async fn clone_and_checkout(&self, config: &TaskConfig, path: &PathBuf) -> Result<(), BackendError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BackendError::Infra(format!("failed to create workspace root: {e}")))?;

        let clone_output = Command::new("git")
            .args(["clone", "--branch", &config.base_branch, &config.repo_url])
            .arg(path)
            .output()
            .await
            .map_err(|e| BackendError::CloneFailed(e.to_string()))?;
        if !clone_output.status.success() {
            return Err(BackendError::CloneFailed(
                String::from_utf8_lossy(&clone_output.stderr).trim().to_string(),
            ));
        }

        let checkout = Command::new("git")
            .args(["checkout", "-b", &config.shadow_branch])
            .current_dir(path)
            .output()
            .await
            .map_err(|e| BackendError::CloneFailed(e.to_string()))?;
        if !checkout.status.success() {
            return Err(BackendError::CloneFailed(
                String::from_utf8_lossy(&checkout.stderr).trim().to_string(),
            ));
        }

        for (key, value) in [("user.name", "sbx-agent"), ("user.email", "sbx-agent@sandbox.invalid")] {
            let _ = Command::new("git").args(["config", key, value]).current_dir(path).output().await;
        }

        Ok(())
    }
}

#[async_trait]
impl<C: Clock> WorkspaceManager for LocalWorkspaceManager<C> {
    async fn prepare_workspace(&self, config: &TaskConfig) -> Result<WorkspaceInfo, BackendError> {
        let path = self.path_for(config);

        if let Some(existing) = self.registry.get(&config.task_id) {
            if existing.phase.is_ready() {
                return Ok(WorkspaceInfo {
                    task_id: config.task_id,
                    backend: BackendKind::Local,
                    workspace_path: existing.workspace_path,
                    endpoint: None,
                });
            }
            // Booting, Draining, or Failed: the directory is either absent
            // or half-cloned. Clear it so the clone below starts clean
            // instead of failing into a non-empty directory.
            if path.exists() {
                tokio::fs::remove_dir_all(&path)
                    .await
                    .map_err(|e| BackendError::Infra(format!("failed to clear stale workspace: {e}")))?;
            }
        }

        let mut sandbox = Sandbox::new(config.task_id, BackendKind::Local, path.display().to_string());
        sandbox.phase = SandboxPhase::Booting;
        sandbox.boot_started_at_ms = Some(self.clock.epoch_ms());
        self.registry.insert(sandbox);

        match self.clone_and_checkout(config, &path).await {
            Ok(()) => {
                self.registry.update(&config.task_id, |sbx| {
                    sbx.phase = SandboxPhase::Ready;
                    sbx.boot_completed_at_ms = Some(self.clock.epoch_ms());
                });
                Ok(WorkspaceInfo {
                    task_id: config.task_id,
                    backend: BackendKind::Local,
                    workspace_path: path.display().to_string(),
                    endpoint: None,
                })
            }
            Err(err) => {
                self.registry.update(&config.task_id, |sbx| sbx.phase = SandboxPhase::Failed);
                Err(err)
            }
        }
    }

    async fn get_workspace_status(&self, task_id: &TaskId) -> WorkspaceStatus {
        match self.registry.get(task_id) {
            Some(sandbox) => WorkspaceStatus::from_phase(sandbox.phase),
            None => WorkspaceStatus::not_found(),
        }
    }

    async fn cleanup_workspace(&self, task_id: &TaskId) -> Result<(), BackendError> {
        if let Some(sandbox) = self.registry.remove(task_id) {
            let path = PathBuf::from(&sandbox.workspace_path);
            if path.exists() {
                let _ = tokio::fs::remove_dir_all(&path).await;
            }
        }
        Ok(())
    }

    async fn get_workspace_path(&self, task_id: &TaskId) -> Result<String, BackendError> {
        self.registry
            .get(task_id)
            .map(|sbx| sbx.workspace_path)
            .ok_or_else(|| BackendError::NotFound(task_id.to_string()))
    }

    async fn get_workspace_info(&self, task_id: &TaskId) -> Result<WorkspaceInfo, BackendError> {
        let sandbox = self.registry.get(task_id).ok_or_else(|| BackendError::NotFound(task_id.to_string()))?;
        if !sandbox.phase.is_ready() {
            return Err(BackendError::NotRunning);
        }
        Ok(WorkspaceInfo {
            task_id: *task_id,
            backend: BackendKind::Local,
            workspace_path: sandbox.workspace_path,
            endpoint: None,
        })
    }

    async fn health_check(&self, task_id: &TaskId) -> (bool, String) {
        match self.registry.get(task_id) {
            Some(sandbox) if sandbox.phase.is_ready() => (true, "ready".to_string()),
            Some(sandbox) => (false, format!("phase={}", sandbox.phase)),
            None => (false, "no sandbox registered".to_string()),
        }
    }

    fn is_remote(&self) -> bool {
        false
    }
}

/// Default overall deadline for `prepare_workspace` on slow clones, matching
/// the remote-backend readiness deadline default (§4.2).
pub const DEFAULT_PREPARE_TIMEOUT: Duration = Duration::from_secs(120);

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
