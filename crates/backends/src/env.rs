// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for backend provisioning.
//!
//! One function per setting with a documented default.

use std::time::Duration;

/// Kubernetes namespace agent pods are created in.
pub fn k8s_namespace() -> String {
    std::env::var("SBX_K8S_NAMESPACE").unwrap_or_else(|_| "default".to_string())
}

/// Container image for sidecar-hosted pods.
pub fn pod_image() -> String {
    std::env::var("SBX_POD_IMAGE").unwrap_or_else(|_| "sbx-sidecar:latest".to_string())
}

/// Port the sidecar listens on inside the pod/VM.
pub fn sidecar_port() -> u16 {
    std::env::var("SBX_SIDECAR_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080)
}

/// Credential secret name for code-host auth injected into pods.
pub fn credential_secret() -> Option<String> {
    std::env::var("SBX_K8S_CREDENTIAL_SECRET").ok()
}

/// SSH deploy-key secret name, mounted read-only for private clones.
pub fn ssh_secret() -> Option<String> {
    std::env::var("SBX_K8S_SSH_SECRET").ok()
}

/// Poll interval while waiting for a pod IP / sidecar readiness.
pub fn ready_poll_interval() -> Duration {
    std::env::var("SBX_K8S_READY_POLL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(500))
}

/// Max poll attempts before `BootTimeout` (default 120 * 500ms = 60s).
pub fn ready_max_attempts() -> usize {
    std::env::var("SBX_K8S_READY_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(120)
}

/// MicroVM CPU limit (vCPUs) passed through to the VM launcher.
pub fn vm_cpu() -> u32 {
    std::env::var("SBX_VM_CPU").ok().and_then(|v| v.parse().ok()).unwrap_or(2)
}

/// MicroVM memory limit in MiB.
pub fn vm_memory_mb() -> u32 {
    std::env::var("SBX_VM_MEMORY_MB").ok().and_then(|v| v.parse().ok()).unwrap_or(2048)
}

/// MicroVM root filesystem image registry/tag.
pub fn vm_image() -> String {
    std::env::var("SBX_VM_IMAGE").unwrap_or_else(|_| "sbx-vm:latest".to_string())
}
