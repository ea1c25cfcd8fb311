// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HealthMonitor` — periodically grades each active sandbox and the
//! underlying infrastructure (§4.9).
//!
//! A `tokio::time::interval` sweep over the sandbox registry, the same
//! polling-loop idiom as a per-job liveness timer generalized from per-job
//! liveness to a fleet-wide sweep that logs and counts rather than emitting
//! job events. It grades, it never terminates — a stuck sandbox produces a
//! `Warning`, not a kill.

use parking_lot::Mutex;
use sbx_backends::{SandboxRegistry, WorkspaceManager};
use sbx_core::{Clock, SandboxPhase, TaskId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthLevel {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone)]
pub struct TaskHealth {
    pub task_id: TaskId,
    pub level: HealthLevel,
    pub response_time_ms: Option<u64>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    pub response_time_warning_ms: u64,
    pub boot_time_warning_ms: u64,
    pub quota_warning_pct: u8,
    pub quota_critical_pct: u8,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            response_time_warning_ms: 1_000,
            boot_time_warning_ms: 180_000,
            quota_warning_pct: 75,
            quota_critical_pct: 90,
        }
    }
}

/// Backend-node and cluster-wide signals, independent of any one sandbox.
#[derive(Debug, Clone, Default)]
pub struct InfraHealth {
    pub nodes_ready: bool,
    pub disk_pressure: bool,
    pub memory_pressure: bool,
    pub pid_pressure: bool,
    pub kvm_available: Option<bool>,
    pub runtime_class_ok: bool,
    pub namespace_quota_pct: Option<u8>,
    pub volume_phases_ok: bool,
    pub vm_image_configured: bool,
}

impl InfraHealth {
    pub fn level(&self, thresholds: &HealthThresholds) -> HealthLevel {
        if !self.nodes_ready || !self.runtime_class_ok || !self.volume_phases_ok {
            return HealthLevel::Critical;
        }
        if let Some(pct) = self.namespace_quota_pct {
            if pct >= thresholds.quota_critical_pct {
                return HealthLevel::Critical;
            }
            if pct >= thresholds.quota_warning_pct {
                return HealthLevel::Warning;
            }
        }
        if self.disk_pressure || self.memory_pressure || self.pid_pressure {
            return HealthLevel::Warning;
        }
        HealthLevel::Healthy
    }
}

pub struct HealthMonitor<C: Clock> {
    manager: Arc<dyn WorkspaceManager>,
    registry: SandboxRegistry,
    clock: C,
    thresholds: HealthThresholds,
    last_results: Arc<Mutex<HashMap<TaskId, TaskHealth>>>,
    warning_count: Arc<Mutex<u64>>,
    critical_count: Arc<Mutex<u64>>,
}

impl<C: Clock + 'static> HealthMonitor<C> {
    pub fn new(manager: Arc<dyn WorkspaceManager>, registry: SandboxRegistry, clock: C) -> Self {
        Self {
            manager,
            registry,
            clock,
            thresholds: HealthThresholds::default(),
            last_results: Arc::new(Mutex::new(HashMap::new())),
            warning_count: Arc::new(Mutex::new(0)),
            critical_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Grade every tracked sandbox once. Public so callers (and tests) can
    /// drive a single sweep without waiting on the periodic loop.
    pub async fn sweep(&self) -> Vec<TaskHealth> {
        let mut results = Vec::new();
        for sandbox in self.registry.snapshot() {
            let health = self.grade_one(&sandbox).await;
            match health.level {
                HealthLevel::Warning => {
                    *self.warning_count.lock() += 1;
                    warn!(task_id = %sandbox.task_id.as_str(), reason = %health.reason, "sandbox health warning");
                }
                HealthLevel::Critical => {
                    *self.critical_count.lock() += 1;
                    warn!(task_id = %sandbox.task_id.as_str(), reason = %health.reason, "sandbox health critical");
                }
                HealthLevel::Healthy => {
                    debug!(task_id = %sandbox.task_id.as_str(), "sandbox healthy");
                }
            }
            self.last_results.lock().insert(sandbox.task_id, health.clone());
            results.push(health);
        }
        results
    }

    async fn grade_one(&self, sandbox: &sbx_core::Sandbox) -> TaskHealth {
        if sandbox.phase == SandboxPhase::Failed {
            return TaskHealth {
                task_id: sandbox.task_id,
                level: HealthLevel::Critical,
                response_time_ms: None,
                reason: "sandbox phase is failed".to_string(),
            };
        }
        if !sandbox.phase.is_ready() {
            return TaskHealth {
                task_id: sandbox.task_id,
                level: HealthLevel::Critical,
                response_time_ms: None,
                reason: format!("sandbox not ready (phase: {})", sandbox.phase),
            };
        }

        let started = self.clock.now();
        let (healthy, message) = self.manager.health_check(&sandbox.task_id).await;
        let response_time_ms = self.clock.now().saturating_duration_since(started).as_millis() as u64;

        if !healthy {
            return TaskHealth {
                task_id: sandbox.task_id,
                level: HealthLevel::Critical,
                response_time_ms: Some(response_time_ms),
                reason: format!("sidecar unreachable: {message}"),
            };
        }

        if sandbox.restart_count > 0 {
            return TaskHealth {
                task_id: sandbox.task_id,
                level: HealthLevel::Warning,
                response_time_ms: Some(response_time_ms),
                reason: format!("{} restart(s) observed", sandbox.restart_count),
            };
        }
        if response_time_ms > self.thresholds.response_time_warning_ms {
            return TaskHealth {
                task_id: sandbox.task_id,
                level: HealthLevel::Warning,
                response_time_ms: Some(response_time_ms),
                reason: format!("slow health response ({response_time_ms}ms)"),
            };
        }
        if let Some(boot_ms) = sandbox.boot_duration_ms() {
            if boot_ms > self.thresholds.boot_time_warning_ms {
                return TaskHealth {
                    task_id: sandbox.task_id,
                    level: HealthLevel::Warning,
                    response_time_ms: Some(response_time_ms),
                    reason: format!("slow boot ({boot_ms}ms)"),
                };
            }
        }

        TaskHealth { task_id: sandbox.task_id, level: HealthLevel::Healthy, response_time_ms: Some(response_time_ms), reason: "ok".to_string() }
    }

    pub fn last_result(&self, task_id: &TaskId) -> Option<TaskHealth> {
        self.last_results.lock().get(task_id).cloned()
    }

    pub fn warning_count(&self) -> u64 {
        *self.warning_count.lock()
    }

    pub fn critical_count(&self) -> u64 {
        *self.critical_count.lock()
    }

    /// Run the periodic sweep forever at `interval`, logging and counting —
    /// never force-terminating a sandbox, per §4.9.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            info!("running fleet health sweep");
            self.sweep().await;
        }
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
