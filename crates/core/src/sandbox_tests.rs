// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::task::TaskId;

#[test]
fn failed_exists_but_not_ready() {
    assert!(SandboxPhase::Failed.exists());
    assert!(!SandboxPhase::Failed.is_ready());
    assert!(SandboxPhase::Failed.is_cleanable());
}

#[test]
fn terminated_does_not_exist_and_is_not_cleanable() {
    assert!(!SandboxPhase::Terminated.exists());
    assert!(!SandboxPhase::Terminated.is_cleanable());
}

#[test]
fn only_ready_is_ready() {
    for phase in [
        SandboxPhase::Pending,
        SandboxPhase::Booting,
        SandboxPhase::Draining,
        SandboxPhase::Terminated,
        SandboxPhase::Failed,
    ] {
        assert!(!phase.is_ready());
    }
    assert!(SandboxPhase::Ready.is_ready());
}

#[test]
fn terminal_states_are_terminated_and_failed_only() {
    assert!(SandboxPhase::Terminated.is_terminal());
    assert!(SandboxPhase::Failed.is_terminal());
    assert!(!SandboxPhase::Ready.is_terminal());
}

#[test]
fn backend_kind_display() {
    assert_eq!(BackendKind::Local.to_string(), "local");
    assert_eq!(BackendKind::Pod.to_string(), "pod");
    assert_eq!(BackendKind::MicroVm.to_string(), "micro_vm");
}

#[test]
fn new_sandbox_starts_pending_with_no_endpoint() {
    let sbx = Sandbox::new(TaskId::new(), BackendKind::Local, "/workspace");
    assert_eq!(sbx.phase, SandboxPhase::Pending);
    assert!(sbx.endpoint.is_none());
    assert_eq!(sbx.restart_count, 0);
}

#[test]
fn boot_duration_requires_both_timestamps() {
    let mut sbx = Sandbox::new(TaskId::new(), BackendKind::Pod, "/workspace");
    assert_eq!(sbx.boot_duration_ms(), None);
    sbx.boot_started_at_ms = Some(1_000);
    assert_eq!(sbx.boot_duration_ms(), None);
    sbx.boot_completed_at_ms = Some(1_500);
    assert_eq!(sbx.boot_duration_ms(), Some(500));
}
