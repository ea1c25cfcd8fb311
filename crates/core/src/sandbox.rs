// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sandbox: the isolated execution unit dedicated to one task.

use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Unique identifier for a sandbox instance.
    pub struct SandboxId("sbx-");
}

/// Which concrete backend hosts a sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Local,
    Pod,
    MicroVm,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Local => "local",
            Self::Pod => "pod",
            Self::MicroVm => "micro_vm",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle state of a sandbox.
///
/// `Pending` -> `Booting` -> `Ready` -> `Draining` -> `Terminated`, with a
/// fatal signal from any state moving to the terminal `Failed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxPhase {
    Pending,
    Booting,
    Ready,
    Draining,
    Terminated,
    Failed,
}

impl SandboxPhase {
    /// Whether the sandbox exists from the caller's point of view.
    ///
    /// `Failed` is terminal but still `exists=true, isReady=false` per the
    /// lifecycle contract — it is reported, not silently treated as absent.
    pub fn exists(self) -> bool {
        !matches!(self, Self::Terminated)
    }

    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether `cleanupWorkspace` has anything left to release.
    pub fn is_cleanable(self) -> bool {
        !matches!(self, Self::Terminated)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated | Self::Failed)
    }
}

impl fmt::Display for SandboxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Booting => "booting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A live or recently-live sandbox, tracked by the backend's registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sandbox {
    pub id: SandboxId,
    pub task_id: crate::task::TaskId,
    pub backend: BackendKind,
    pub phase: SandboxPhase,
    /// Pod/VM IP once discovered; `None` before readiness or for `Local`.
    pub endpoint: Option<String>,
    pub workspace_path: String,
    pub restart_count: u32,
    pub boot_started_at_ms: Option<u64>,
    pub boot_completed_at_ms: Option<u64>,
}

impl Sandbox {
    pub fn new(task_id: crate::task::TaskId, backend: BackendKind, workspace_path: impl Into<String>) -> Self {
        Self {
            id: SandboxId::new(),
            task_id,
            backend,
            phase: SandboxPhase::Pending,
            endpoint: None,
            workspace_path: workspace_path.into(),
            restart_count: 0,
            boot_started_at_ms: None,
            boot_completed_at_ms: None,
        }
    }

    pub fn boot_duration_ms(&self) -> Option<u64> {
        match (self.boot_started_at_ms, self.boot_completed_at_ms) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
