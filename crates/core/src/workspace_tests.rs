// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sandbox::SandboxPhase;

#[test]
fn local_backend_is_not_remote() {
    let info = WorkspaceInfo {
        task_id: TaskId::new(),
        backend: BackendKind::Local,
        workspace_path: "/workspace".to_string(),
        endpoint: None,
    };
    assert!(!info.is_remote());
}

#[test]
fn pod_and_vm_backends_are_remote() {
    for backend in [BackendKind::Pod, BackendKind::MicroVm] {
        let info = WorkspaceInfo {
            task_id: TaskId::new(),
            backend,
            workspace_path: "/workspace".to_string(),
            endpoint: Some("http://10.0.0.1:8080".to_string()),
        };
        assert!(info.is_remote());
    }
}

#[test]
fn not_found_status_never_ready() {
    let status = WorkspaceStatus::not_found();
    assert!(!status.exists);
    assert!(!status.is_ready);
    assert!(status.phase.is_none());
}

#[test]
fn failed_status_exists_but_not_ready() {
    let status = WorkspaceStatus::from_phase(SandboxPhase::Failed);
    assert!(status.exists);
    assert!(!status.is_ready);
}

#[test]
fn ready_status_is_ready() {
    let status = WorkspaceStatus::from_phase(SandboxPhase::Ready);
    assert!(status.exists);
    assert!(status.is_ready);
}
