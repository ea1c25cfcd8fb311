// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MicroVmWorkspaceManager` — sandbox hosted in a microVM running the
//! sidecar.
//!
//! No example in the retrieval pack drives a microVM API directly, so this
//! is generalized from [`crate::pod`]'s Pod pattern (create → wait-for-
//! network → poll sidecar readiness → register) behind a [`VmLauncher`]
//! seam instead of a concrete hypervisor binding (recorded as an open
//! decision in DESIGN.md). The launcher shells out to an external VM CLI
//! the same way other adapters shell out to `docker`/`git` via
//! `tokio::process::Command`.

use crate::env;
use crate::error::BackendError;
use crate::manager::WorkspaceManager;
use crate::registry::SandboxRegistry;
use async_trait::async_trait;
use sbx_core::{BackendKind, Clock, Sandbox, SandboxPhase, TaskConfig, TaskId, WorkspaceInfo, WorkspaceStatus};
use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::process::Command;

const IN_VM_WORKSPACE: &str = "/workspace";

/// A running VM instance's launcher-assigned handle and network address.
#[derive(Debug, Clone)]
pub struct VmHandle {
    pub vm_id: String,
    pub ip: String,
}

/// Seam between `MicroVmWorkspaceManager` and a concrete hypervisor binding.
///
/// `ProcessVmLauncher` is the only production implementation; tests use a
/// fake launcher so they don't depend on a real microVM runtime.
#[async_trait]
pub trait VmLauncher: Send + Sync {
    async fn launch(&self, vm_name: &str, config: &TaskConfig) -> Result<VmHandle, BackendError>;
    async fn terminate(&self, handle: &VmHandle) -> Result<(), BackendError>;
}

/// Launches microVMs via an external CLI (`SBX_VM_LAUNCHER_BIN`, default
/// `sbx-vm-launcher`), passing image/CPU/memory limits as arguments and
/// parsing the assigned IP from stdout.
pub struct ProcessVmLauncher;

#[async_trait]
impl VmLauncher for ProcessVmLauncher {
    async fn launch(&self, vm_name: &str, config: &TaskConfig) -> Result<VmHandle, BackendError> {
        let bin = std::env::var("SBX_VM_LAUNCHER_BIN").unwrap_or_else(|_| "sbx-vm-launcher".to_string());
        let output = Command::new(&bin)
            .args([
                "launch",
                "--name",
                vm_name,
                "--image",
                &env::vm_image(),
                "--cpus",
                &env::vm_cpu().to_string(),
                "--memory-mb",
                &env::vm_memory_mb().to_string(),
                "--repo-url",
                &config.repo_url,
                "--base-branch",
                &config.base_branch,
                "--shadow-branch",
                &config.shadow_branch,
            ])
            .output()
            .await
            .map_err(|e| BackendError::Infra(format!("vm launcher spawn failed: {e}")))?;

        if !output.status.success() {
            return Err(BackendError::Infra(format!(
                "vm launcher exited with failure: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let ip = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if ip.is_empty() {
            return Err(BackendError::Infra("vm launcher produced no IP".to_string()));
        }
        Ok(VmHandle { vm_id: vm_name.to_string(), ip })
    }

    async fn terminate(&self, handle: &VmHandle) -> Result<(), BackendError> {
        let bin = std::env::var("SBX_VM_LAUNCHER_BIN").unwrap_or_else(|_| "sbx-vm-launcher".to_string());
        let output = Command::new(&bin)
            .args(["terminate", "--name", &handle.vm_id])
            .output()
            .await
            .map_err(|e| BackendError::Infra(format!("vm launcher spawn failed: {e}")))?;
        if !output.status.success() {
            return Err(BackendError::Infra(format!(
                "vm terminate failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

pub struct MicroVmWorkspaceManager<C: Clock> {
    launcher: Arc<dyn VmLauncher>,
    registry: SandboxRegistry,
    handles: Arc<Mutex<HashMap<TaskId, VmHandle>>>,
    clock: C,
}

impl<C: Clock> MicroVmWorkspaceManager<C> {
    pub fn new(clock: C) -> Self {
        Self::with_launcher(Arc::new(ProcessVmLauncher), clock)
    }

    pub fn with_launcher(launcher: Arc<dyn VmLauncher>, clock: C) -> Self {
        Self { launcher, registry: SandboxRegistry::new(), handles: Arc::new(Mutex::new(HashMap::new())), clock }
    }

    async fn provision(&self, config: &TaskConfig) -> Result<WorkspaceInfo, BackendError> {
        let vm_name = format!("sbx-vm-{}", config.sandbox_name());
        let handle = self.launcher.launch(&vm_name, config).await?;
        let endpoint = format!("http://{}:{}", handle.ip, env::sidecar_port());
        wait_for_sidecar_ready(&endpoint).await?;
        self.handles.lock().insert(config.task_id, handle);
        Ok(WorkspaceInfo {
            task_id: config.task_id,
            backend: BackendKind::MicroVm,
            workspace_path: IN_VM_WORKSPACE.to_string(),
            endpoint: Some(endpoint),
        })
    }
}

async fn wait_for_sidecar_ready(endpoint: &str) -> Result<(), BackendError> {
    let poll_interval = env::ready_poll_interval();
    let max_attempts = env::ready_max_attempts();
    let http = reqwest::Client::new();
    for attempt in 0..max_attempts {
        if attempt > 0 {
            tokio::time::sleep(poll_interval).await;
        }
        if let Ok(resp) = http.get(format!("{endpoint}/health")).timeout(std::time::Duration::from_secs(5)).send().await {
            if resp.status().is_success() {
                return Ok(());
            }
        }
    }
    Err(BackendError::BootTimeout)
}

#[async_trait]
impl<C: Clock> WorkspaceManager for MicroVmWorkspaceManager<C> {
    async fn prepare_workspace(&self, config: &TaskConfig) -> Result<WorkspaceInfo, BackendError> {
        if let Some(existing) = self.registry.get(&config.task_id) {
            if existing.phase.is_ready() {
                return Ok(WorkspaceInfo {
                    task_id: config.task_id,
                    backend: BackendKind::MicroVm,
                    workspace_path: existing.workspace_path,
                    endpoint: existing.endpoint,
                });
            }
            // Booting, Draining, or Failed: tear down any half-launched VM
            // before launching a fresh one under the same task id.
            if let Some(handle) = self.handles.lock().remove(&config.task_id) {
                if let Err(e) = self.launcher.terminate(&handle).await {
                    tracing::warn!(task_id = %config.task_id, vm_id = %handle.vm_id, error = %e, "failed to terminate stale microVM before re-provisioning");
                }
            }
        }

        let mut sandbox = Sandbox::new(config.task_id, BackendKind::MicroVm, IN_VM_WORKSPACE);
        sandbox.phase = SandboxPhase::Booting;
        sandbox.boot_started_at_ms = Some(self.clock.epoch_ms());
        self.registry.insert(sandbox);

        match self.provision(config).await {
            Ok(info) => {
                self.registry.update(&config.task_id, |sbx| {
                    sbx.phase = SandboxPhase::Ready;
                    sbx.endpoint = info.endpoint.clone();
                    sbx.boot_completed_at_ms = Some(self.clock.epoch_ms());
                });
                Ok(info)
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
        self.registry.remove(task_id);
        if let Some(handle) = self.handles.lock().remove(task_id) {
            if let Err(e) = self.launcher.terminate(&handle).await {
                tracing::warn!(%task_id, vm_id = %handle.vm_id, error = %e, "failed to terminate microVM");
            }
        }
        Ok(())
    }

    async fn get_workspace_path(&self, task_id: &TaskId) -> Result<String, BackendError> {
        self.registry.get(task_id).map(|sbx| sbx.workspace_path).ok_or_else(|| BackendError::NotFound(task_id.to_string()))
    }

    async fn get_workspace_info(&self, task_id: &TaskId) -> Result<WorkspaceInfo, BackendError> {
        let sandbox = self.registry.get(task_id).ok_or_else(|| BackendError::NotFound(task_id.to_string()))?;
        let endpoint = sandbox.endpoint.clone().ok_or(BackendError::NotRunning)?;
        Ok(WorkspaceInfo { task_id: *task_id, backend: BackendKind::MicroVm, workspace_path: sandbox.workspace_path, endpoint: Some(endpoint) })
    }

    async fn health_check(&self, task_id: &TaskId) -> (bool, String) {
        let Some(sandbox) = self.registry.get(task_id) else {
            return (false, "no sandbox registered".to_string());
        };
        let Some(endpoint) = sandbox.endpoint else {
            return (false, "no endpoint assigned".to_string());
        };
        match reqwest::Client::new()
            .get(format!("{endpoint}/health"))
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => (true, "ready".to_string()),
            Ok(resp) => (false, format!("sidecar returned {}", resp.status())),
            Err(e) => (false, format!("sidecar unreachable: {e}")),
        }
    }

    fn is_remote(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "vm_tests.rs"]
mod tests;
