// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sbx sandbox` — drive a `WorkspaceManager` through `prepareWorkspace` /
//! `cleanupWorkspace` / `getWorkspaceStatus` (§4.2) from the command line.
//!
//! One-shot only: each invocation is its own process, so a `Local` backend's
//! in-memory `SandboxRegistry` does not survive between commands. `prepare`
//! prints the `workspacePath` the operator needs for follow-up `sbx tool`
//! calls; `status`/`cleanup` against a `Local` sandbox from a fresh process
//! report "not found" per the idempotence invariant (§8 invariant 2) —
//! there is nothing stale to leak.

use anyhow::Result;
use clap::{Args, Subcommand};
use sbx_backends::{BackendFactory, SandboxMode, WorkspaceManager};
use sbx_core::{SystemClock, TaskConfig, TaskId};
use serde::Serialize;

use crate::color;
use crate::output::{emit, OutputFormat};

#[derive(Args)]
pub struct SandboxArgs {
    #[command(subcommand)]
    pub command: SandboxCommand,
}

#[derive(Subcommand)]
pub enum SandboxCommand {
    /// Provision a sandbox: clone the repo, check out the shadow branch.
    Prepare {
        #[arg(long)]
        task_id: String,
        #[arg(long)]
        repo_url: String,
        #[arg(long)]
        repo_full_name: String,
        #[arg(long, default_value = "main")]
        base_branch: String,
        #[arg(long)]
        shadow_branch: String,
        #[arg(long)]
        user_id: String,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Query a sandbox's point-in-time status. Never fails: a missing
    /// sandbox is reported as `exists: false` (§4.2).
    Status {
        #[arg(long)]
        task_id: String,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Tear a sandbox down. Idempotent: calling this twice both succeed.
    Cleanup {
        #[arg(long)]
        task_id: String,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    Local,
    Remote,
    Vm,
}

impl From<ModeArg> for SandboxMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Local => Self::Local,
            ModeArg::Remote => Self::Remote,
            ModeArg::Vm => Self::Vm,
        }
    }
}

#[derive(Serialize)]
struct PrepareOutcome {
    task_id: String,
    backend: String,
    workspace_path: String,
    endpoint: Option<String>,
}

#[derive(Serialize)]
struct StatusOutcome {
    task_id: String,
    exists: bool,
    is_ready: bool,
    phase: Option<String>,
    message: String,
}

#[derive(Serialize)]
struct CleanupOutcome {
    task_id: String,
    cleaned: bool,
}

pub async fn run(args: SandboxArgs) -> Result<()> {
    match args.command {
        SandboxCommand::Prepare {
            task_id,
            repo_url,
            repo_full_name,
            base_branch,
            shadow_branch,
            user_id,
            mode,
            format,
        } => prepare(task_id, repo_url, repo_full_name, base_branch, shadow_branch, user_id, mode, format).await,
        SandboxCommand::Status { task_id, mode, format } => status(task_id, mode, format).await,
        SandboxCommand::Cleanup { task_id, mode, format } => cleanup(task_id, mode, format).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn prepare(
    task_id: String,
    repo_url: String,
    repo_full_name: String,
    base_branch: String,
    shadow_branch: String,
    user_id: String,
    mode: Option<ModeArg>,
    format: OutputFormat,
) -> Result<()> {
    let config = TaskConfig::new(task_id, repo_url, repo_full_name, base_branch, shadow_branch, user_id);
    let factory = BackendFactory::new(SystemClock);
    let manager = factory.create_workspace_manager(mode.map(SandboxMode::from)).await?;
    let info = manager.prepare_workspace(&config).await?;

    let outcome = PrepareOutcome {
        task_id: info.task_id.to_string(),
        backend: info.backend.to_string(),
        workspace_path: info.workspace_path.clone(),
        endpoint: info.endpoint.clone(),
    };
    emit(format, &outcome, |o| {
        format!(
            "{} sandbox ready for {}\n  backend:   {}\n  workspace: {}\n  endpoint:  {}",
            color::good("✓"),
            color::literal(&o.task_id),
            o.backend,
            o.workspace_path,
            o.endpoint.as_deref().unwrap_or("-"),
        )
    })
}

async fn status(task_id: String, mode: Option<ModeArg>, format: OutputFormat) -> Result<()> {
    let factory = BackendFactory::new(SystemClock);
    let manager = factory.create_workspace_manager(mode.map(SandboxMode::from)).await?;
    let task_id = TaskId::from_string(task_id);
    let snapshot = manager.get_workspace_status(&task_id).await;

    let outcome = StatusOutcome {
        task_id: task_id.to_string(),
        exists: snapshot.exists,
        is_ready: snapshot.is_ready,
        phase: snapshot.phase.map(|p| p.to_string()),
        message: snapshot.message.clone(),
    };
    emit(format, &outcome, |o| {
        let badge = if o.is_ready { color::good("ready") } else if o.exists { color::warn("not ready") } else { color::muted("absent") };
        format!("{}: {} ({})", o.task_id, badge, o.message)
    })
}

async fn cleanup(task_id: String, mode: Option<ModeArg>, format: OutputFormat) -> Result<()> {
    let factory = BackendFactory::new(SystemClock);
    let manager = factory.create_workspace_manager(mode.map(SandboxMode::from)).await?;
    let task_id = TaskId::from_string(task_id);
    manager.cleanup_workspace(&task_id).await?;

    let outcome = CleanupOutcome { task_id: task_id.to_string(), cleaned: true };
    emit(format, &outcome, |o| format!("{} cleaned up {}", color::good("✓"), o.task_id))
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
