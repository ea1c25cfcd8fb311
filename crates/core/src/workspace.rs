// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace descriptors returned by `WorkspaceManager` operations.

use crate::sandbox::BackendKind;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

/// Static description of a provisioned workspace.
///
/// Returned alongside a successful `prepareWorkspace` and reused by
/// `getWorkspacePath`/`getExecutor` — the fields a caller needs to route
/// subsequent tool calls without re-querying the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub task_id: TaskId,
    pub backend: BackendKind,
    pub workspace_path: String,
    /// `http://<host>:<port>` once the sidecar endpoint is known.
    pub endpoint: Option<String>,
}

impl WorkspaceInfo {
    pub fn is_remote(&self) -> bool {
        !matches!(self.backend, BackendKind::Local)
    }
}

/// Point-in-time snapshot returned by `getWorkspaceStatus`.
///
/// Never throws: a task with no known sandbox yields `exists=false` rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceStatus {
    pub exists: bool,
    pub is_ready: bool,
    pub phase: Option<crate::sandbox::SandboxPhase>,
    pub message: String,
}

impl WorkspaceStatus {
    pub fn not_found() -> Self {
        Self {
            exists: false,
            is_ready: false,
            phase: None,
            message: "no sandbox registered for this task".to_string(),
        }
    }

    pub fn from_phase(phase: crate::sandbox::SandboxPhase) -> Self {
        Self {
            exists: phase.exists(),
            is_ready: phase.is_ready(),
            phase: Some(phase),
            message: phase.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
