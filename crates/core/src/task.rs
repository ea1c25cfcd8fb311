// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task configuration — the immutable input to sandbox provisioning.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a task.
    ///
    /// A `TaskId` maps to exactly one live sandbox. The sanitized form
    /// (see [`sanitize_task_id`]) is used as the DNS-safe sandbox name.
    pub struct TaskId("task-");
}

/// Immutable configuration for provisioning a sandbox.
///
/// Created once by the caller and never mutated; every `WorkspaceManager`
/// operation that needs task context takes a reference to one of these or
/// to the `task_id` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub task_id: TaskId,
    pub repo_url: String,
    /// `owner/name` form of the repository.
    pub repo_full_name: String,
    pub base_branch: String,
    /// The agent's working branch, created from `base_branch`.
    pub shadow_branch: String,
    pub user_id: String,
}

impl TaskConfig {
    pub fn new(
        task_id: impl Into<String>,
        repo_url: impl Into<String>,
        repo_full_name: impl Into<String>,
        base_branch: impl Into<String>,
        shadow_branch: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            task_id: TaskId::from_string(task_id.into()),
            repo_url: repo_url.into(),
            repo_full_name: repo_full_name.into(),
            base_branch: base_branch.into(),
            shadow_branch: shadow_branch.into(),
            user_id: user_id.into(),
        }
    }

    /// DNS-safe sandbox name derived from `task_id`.
    ///
    /// Must be stable across factory calls for the same `task_id` (§4.2).
    pub fn sandbox_name(&self) -> String {
        sanitize_task_id(self.task_id.as_str())
    }
}

/// Lowercase a task id and replace characters invalid for DNS labels with `-`.
///
/// Matches the naming rule in spec §3/§4.2: "lowercasing and replacing
/// characters invalid for DNS labels" (e.g. `_` -> `-`).
pub fn sanitize_task_id(task_id: &str) -> String {
    let mut out = String::with_capacity(task_id.len());
    for c in task_id.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push('-');
        }
    }
    // Collapse leading/trailing dashes; DNS labels can't start or end with one.
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "task".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
