// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared in-memory sandbox registry used by each backend's `WorkspaceManager`.
//!
//! Each backend owns one of these exclusively (§3's ownership rule) — there
//! is no cross-backend registry sharing.

use parking_lot::Mutex;
use sbx_core::{Sandbox, TaskId};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct SandboxRegistry {
    inner: Arc<Mutex<HashMap<TaskId, Sandbox>>>,
}

impl SandboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, sandbox: Sandbox) {
        self.inner.lock().insert(sandbox.task_id, sandbox);
    }

    pub fn get(&self, task_id: &TaskId) -> Option<Sandbox> {
        self.inner.lock().get(task_id).cloned()
    }

    pub fn remove(&self, task_id: &TaskId) -> Option<Sandbox> {
        self.inner.lock().remove(task_id)
    }

    pub fn update(&self, task_id: &TaskId, f: impl FnOnce(&mut Sandbox)) {
        if let Some(sandbox) = self.inner.lock().get_mut(task_id) {
            f(sandbox);
        }
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.inner.lock().contains_key(task_id)
    }

    /// Snapshot of all tracked sandboxes, for the health monitor's fleet sweep.
    pub fn snapshot(&self) -> Vec<Sandbox> {
        self.inner.lock().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbx_core::BackendKind;

    #[test]
    fn insert_get_remove_round_trips() {
        let reg = SandboxRegistry::new();
        let task_id = TaskId::new();
        let sandbox = Sandbox::new(task_id, BackendKind::Local, "/workspace");
        reg.insert(sandbox.clone());
        assert!(reg.contains(&task_id));
        assert_eq!(reg.get(&task_id).unwrap().id, sandbox.id);
        assert!(reg.remove(&task_id).is_some());
        assert!(!reg.contains(&task_id));
    }

    #[test]
    fn update_mutates_in_place() {
        let reg = SandboxRegistry::new();
        let task_id = TaskId::new();
        reg.insert(Sandbox::new(task_id, BackendKind::Local, "/workspace"));
        reg.update(&task_id, |sbx| sbx.restart_count += 1);
        assert_eq!(reg.get(&task_id).unwrap().restart_count, 1);
    }
}
