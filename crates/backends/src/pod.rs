// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PodWorkspaceManager` — sandbox hosted in a Kubernetes pod running the
//! sidecar, reached over TCP.
//!
//! Grounded in `adapters::agent::k8s::mod`'s `KubernetesAdapter`: pod
//! creation via `kube-rs`, polling for a
//! pod IP, an init container that provisions the workspace before the main
//! container starts, and a `refresh_pod_ip` path for recovering from pod
//! rescheduling. Generalized here from "spawn an agent container" to
//! "spawn a sidecar container" and from TCP/WebSocket framing to the
//! sidecar's HTTP surface.

use crate::env;
use crate::error::BackendError;
use crate::manager::WorkspaceManager;
use crate::registry::SandboxRegistry;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EmptyDirVolumeSource, EnvVar, EnvVarSource, Pod, PodSpec,
    SecretKeySelector, SecretVolumeSource, Volume, VolumeMount,
};
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use parking_lot::Mutex;
use sbx_core::{BackendKind, Clock, Sandbox, SandboxPhase, TaskConfig, TaskId, WorkspaceInfo, WorkspaceStatus};
use std::collections::HashMap;
use std::sync::Arc;

/// In-container workspace path, identical across every pod.
const IN_POD_WORKSPACE: &str = "/workspace";

#[derive(Clone)]
struct PodMeta {
    pod_name: String,
    namespace: String,
}

pub struct PodWorkspaceManager<C: Clock> {
    client: Client,
    registry: SandboxRegistry,
    meta: Arc<Mutex<HashMap<TaskId, PodMeta>>>,
    clock: C,
}

impl<C: Clock> PodWorkspaceManager<C> {
    pub async fn new(clock: C) -> Result<Self, BackendError> {
        let client = Client::try_default()
            .await
            .map_err(|e| BackendError::Infra(format!("failed to create kube client: {e}")))?;
        Ok(Self { client, registry: SandboxRegistry::new(), meta: Arc::new(Mutex::new(HashMap::new())), clock })
    }

    fn pods_api(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Re-query the Kubernetes API for a task's current pod IP and update
    /// the registered endpoint. Used after a sidecar call fails, to recover
    /// from pod rescheduling without tearing down the sandbox.
    pub async fn refresh_pod_ip(&self, task_id: &TaskId) -> bool {
        let Some(meta) = self.meta.lock().get(task_id).cloned() else { return false };
        let pods = self.pods_api(&meta.namespace);
        let pod = match pods.get(&meta.pod_name).await {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(%task_id, error = %e, "pod lookup failed during IP refresh");
                return false;
            }
        };
        let Some(ip) = pod.status.as_ref().and_then(|s| s.pod_ip.as_ref()) else { return false };
        let endpoint = format!("http://{ip}:{}", env::sidecar_port());
        self.registry.update(task_id, |sbx| sbx.endpoint = Some(endpoint.clone()));
        tracing::info!(%task_id, %endpoint, "refreshed pod endpoint");
        true
    }

    async fn provision(&self, config: &TaskConfig) -> Result<WorkspaceInfo, BackendError> {
        let sandbox_name = config.sandbox_name();
        let pod_name = format!("shadow-agent-{sandbox_name}");
        let namespace = env::k8s_namespace();
        let port = env::sidecar_port() as i32;

        let pod_spec = build_pod(&PodParams {
            pod_name: pod_name.clone(),
            image: env::pod_image(),
            container_port: port,
            repo_url: config.repo_url.clone(),
            base_branch: config.base_branch.clone(),
            shadow_branch: config.shadow_branch.clone(),
            credential_secret: env::credential_secret(),
            ssh_secret: env::ssh_secret(),
        });

        let pods = self.pods_api(&namespace);
        tracing::info!(task_id = %config.task_id, %pod_name, %namespace, "creating sandbox pod");
        pods.create(&PostParams::default(), &pod_spec)
            .await
            .map_err(|e| BackendError::Infra(format!("pod creation failed: {e}")))?;

        let result = async {
            let ip = wait_for_pod_ip(&pods, &pod_name).await?;
            let endpoint = format!("http://{ip}:{port}");
            wait_for_sidecar_ready(&endpoint).await?;
            Ok(endpoint)
        }
        .await;

        match result {
            Ok(endpoint) => {
                self.meta.lock().insert(config.task_id, PodMeta { pod_name, namespace });
                Ok(WorkspaceInfo {
                    task_id: config.task_id,
                    backend: BackendKind::Pod,
                    workspace_path: IN_POD_WORKSPACE.to_string(),
                    endpoint: Some(endpoint),
                })
            }
            Err(err) => {
                if let Err(del_err) = pods.delete(&pod_name, &DeleteParams::default()).await {
                    tracing::warn!(%pod_name, error = %del_err, "failed to clean up pod after provisioning failure");
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl<C: Clock> WorkspaceManager for PodWorkspaceManager<C> {
    async fn prepare_workspace(&self, config: &TaskConfig) -> Result<WorkspaceInfo, BackendError> {
        if let Some(existing) = self.registry.get(&config.task_id) {
            if existing.phase.is_ready() {
                return Ok(WorkspaceInfo {
                    task_id: config.task_id,
                    backend: BackendKind::Pod,
                    workspace_path: existing.workspace_path,
                    endpoint: existing.endpoint,
                });
            }
            // Booting, Draining, or Failed: delete any half-created pod
            // before creating a fresh one under the same task id.
            if let Some(meta) = self.meta.lock().remove(&config.task_id) {
                let pods = self.pods_api(&meta.namespace);
                if let Err(e) = pods.delete(&meta.pod_name, &DeleteParams::default()).await {
                    tracing::warn!(task_id = %config.task_id, pod = %meta.pod_name, error = %e, "failed to delete stale pod before re-provisioning");
                }
            }
        }

        let mut sandbox = Sandbox::new(config.task_id, BackendKind::Pod, IN_POD_WORKSPACE);
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
        if let Some(meta) = self.meta.lock().remove(task_id) {
            let pods = self.pods_api(&meta.namespace);
            if let Err(e) = pods.delete(&meta.pod_name, &DeleteParams::default()).await {
                tracing::warn!(%task_id, pod = %meta.pod_name, error = %e, "failed to delete pod");
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
        Ok(WorkspaceInfo { task_id: *task_id, backend: BackendKind::Pod, workspace_path: sandbox.workspace_path, endpoint: Some(endpoint) })
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

/// Orphan sweep: delete pods this manager's registry no longer tracks.
///
/// Mirrors `cleanup_stale_resources`, scoped to sandbox pods by their
/// `app=sbx-agent` label.
pub async fn cleanup_stale_pods<C: Clock>(manager: &PodWorkspaceManager<C>, known: &[TaskId]) {
    let namespace = env::k8s_namespace();
    let pods = manager.pods_api(&namespace);
    let list_params = ListParams::default().labels("app=sbx-agent");
    let pod_list = match pods.list(&list_params).await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(error = %e, "failed to list pods for stale resource cleanup");
            return;
        }
    };
    let known_names: std::collections::HashSet<String> =
        known.iter().map(|id| format!("shadow-agent-{}", sbx_core::sanitize_task_id(id.as_str()))).collect();
    for pod in pod_list {
        let Some(pod_name) = pod.metadata.name else { continue };
        if !known_names.contains(&pod_name) {
            tracing::info!(%pod_name, "deleting orphaned sandbox pod");
            if let Err(e) = pods.delete(&pod_name, &DeleteParams::default()).await {
                tracing::warn!(%pod_name, error = %e, "failed to delete orphaned pod");
            }
        }
    }
}

struct PodParams {
    pod_name: String,
    image: String,
    container_port: i32,
    repo_url: String,
    base_branch: String,
    shadow_branch: String,
    credential_secret: Option<String>,
    ssh_secret: Option<String>,
}

fn build_pod(params: &PodParams) -> Pod {
    let mut volumes = vec![Volume {
        name: "workspace".to_string(),
        empty_dir: Some(EmptyDirVolumeSource::default()),
        ..Default::default()
    }];
    let mut init_volume_mounts =
        vec![VolumeMount { name: "workspace".to_string(), mount_path: IN_POD_WORKSPACE.to_string(), ..Default::default() }];

    if let Some(ref ssh_secret) = params.ssh_secret {
        volumes.push(Volume {
            name: "ssh-key".to_string(),
            secret: Some(SecretVolumeSource {
                secret_name: Some(ssh_secret.clone()),
                default_mode: Some(0o400),
                ..Default::default()
            }),
            ..Default::default()
        });
        init_volume_mounts.push(VolumeMount {
            name: "ssh-key".to_string(),
            mount_path: "/root/.ssh".to_string(),
            read_only: Some(true),
            ..Default::default()
        });
    }

    let clone_cmd = vec![
        "sh".to_string(),
        "-c".to_string(),
        format!(
            "git clone --branch {} {} {dir} && cd {dir} && git checkout -b {}",
            params.base_branch,
            params.repo_url,
            params.shadow_branch,
            dir = IN_POD_WORKSPACE,
        ),
    ];
    let init_container = Container {
        name: "clone".to_string(),
        image: Some(params.image.clone()),
        command: Some(clone_cmd),
        volume_mounts: Some(init_volume_mounts),
        ..Default::default()
    };

    let mut env = vec![EnvVar {
        name: "SBX_WORKSPACE_DIR".to_string(),
        value: Some(IN_POD_WORKSPACE.to_string()),
        ..Default::default()
    }];
    if let Some(ref secret_name) = params.credential_secret {
        env.push(EnvVar {
            name: "SBX_GIT_TOKEN".to_string(),
            value_from: Some(EnvVarSource {
                secret_key_ref: Some(SecretKeySelector {
                    name: secret_name.clone(),
                    key: "token".to_string(),
                    optional: Some(true),
                }),
                ..Default::default()
            }),
            ..Default::default()
        });
    }

    let main_container = Container {
        name: "sidecar".to_string(),
        image: Some(params.image.clone()),
        env: Some(env),
        ports: Some(vec![ContainerPort { container_port: params.container_port, ..Default::default() }]),
        volume_mounts: Some(vec![VolumeMount {
            name: "workspace".to_string(),
            mount_path: IN_POD_WORKSPACE.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    };

    Pod {
        metadata: k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
            name: Some(params.pod_name.clone()),
            labels: Some([("app".to_string(), "sbx-agent".to_string())].into_iter().collect()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            init_containers: Some(vec![init_container]),
            containers: vec![main_container],
            volumes: Some(volumes),
            restart_policy: Some("Never".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

async fn wait_for_pod_ip(pods: &Api<Pod>, name: &str) -> Result<String, BackendError> {
    let poll_interval = env::ready_poll_interval();
    let max_attempts = env::ready_max_attempts();
    for attempt in 0..max_attempts {
        if attempt > 0 {
            tokio::time::sleep(poll_interval).await;
        }
        if let Ok(pod) = pods.get(name).await {
            if let Some(ip) = pod.status.as_ref().and_then(|s| s.pod_ip.as_ref()) {
                if !ip.is_empty() {
                    tracing::info!(%name, %ip, attempt, "pod IP assigned");
                    return Ok(ip.clone());
                }
            }
        }
    }
    Err(BackendError::BootTimeout)
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

#[cfg(test)]
#[path = "pod_tests.rs"]
mod tests;
