// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `BackendFactory` — picks a [`WorkspaceManager`] from the configured mode.
//!
//! Mode resolution order: explicit argument, process configuration
//! (`SBX_AGENT_MODE`), default `local`. This crate only ever hands back a
//! `WorkspaceManager`; pairing one with a `ToolExecutor` (the
//! `createToolExecutor` half of the factory contract) happens one layer up
//! in `sbx-executor`, which depends on this crate rather than the other way
//! around — see DESIGN.md for why the single-factory contract is split
//! across the two crates.

use crate::error::BackendError;
use crate::local::LocalWorkspaceManager;
use crate::manager::WorkspaceManager;
use crate::pod::PodWorkspaceManager;
use crate::vm::MicroVmWorkspaceManager;
use sbx_core::Clock;
use std::str::FromStr;
use std::sync::Arc;

/// Backend mode a sandbox is provisioned under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxMode {
    Local,
    Remote,
    Vm,
}

impl FromStr for SandboxMode {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            "vm" => Ok(Self::Vm),
            other => Err(BackendError::Infra(format!("unknown sandbox mode {other:?}"))),
        }
    }
}

/// Process-configured default mode (`SBX_AGENT_MODE`, default `local`).
pub fn configured_mode() -> SandboxMode {
    std::env::var("SBX_AGENT_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(SandboxMode::Local)
}

pub struct BackendFactory<C: Clock> {
    clock: C,
}

impl<C: Clock> BackendFactory<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Resolve `mode` (explicit arg, else process configuration, else
    /// `local`) and construct the corresponding `WorkspaceManager`.
    pub async fn create_workspace_manager(
        &self,
        mode: Option<SandboxMode>,
    ) -> Result<Arc<dyn WorkspaceManager>, BackendError> {
        let mode = mode.unwrap_or_else(configured_mode);
        match mode {
            SandboxMode::Local => Ok(Arc::new(LocalWorkspaceManager::new(self.clock.clone()))),
            SandboxMode::Remote => Ok(Arc::new(PodWorkspaceManager::new(self.clock.clone()).await?)),
            SandboxMode::Vm => Ok(Arc::new(MicroVmWorkspaceManager::new(self.clock.clone()))),
        }
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
