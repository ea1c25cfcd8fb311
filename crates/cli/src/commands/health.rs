// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sbx health` — grade a single sandbox (§4.9).
//!
//! `endpoint` hits a sidecar's `GET /health` directly through the same
//! `SidecarClient` the remote executor uses, so an operator sees exactly
//! the retry/circuit-breaker behavior a real tool call would. `local`
//! reports a `Local` backend's in-process readiness via `health_check`.

use anyhow::Result;
use clap::{Args, Subcommand};
use reqwest::Method;
use sbx_backends::{BackendFactory, SandboxMode, SidecarClient, WorkspaceManager};
use sbx_core::{SystemClock, TaskId};
use sbx_wire::HealthResponse;
use serde::Serialize;

use crate::color;
use crate::output::{emit, OutputFormat};

#[derive(Args)]
pub struct HealthArgs {
    #[command(subcommand)]
    pub command: HealthCommand,
}

#[derive(Subcommand)]
pub enum HealthCommand {
    /// Check a sidecar's `/health` route at a known endpoint.
    Endpoint {
        #[arg(long)]
        task_id: String,
        /// `http://host:port` the sidecar listens on.
        #[arg(long)]
        url: String,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Check a `Local`-backend sandbox's readiness in this process.
    Local {
        #[arg(long)]
        task_id: String,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
struct EndpointOutcome {
    task_id: String,
    healthy: bool,
    message: String,
}

#[derive(Serialize)]
struct LocalOutcome {
    task_id: String,
    healthy: bool,
    message: String,
}

pub async fn run(args: HealthArgs) -> Result<()> {
    match args.command {
        HealthCommand::Endpoint { task_id, url, format } => endpoint(task_id, url, format).await,
        HealthCommand::Local { task_id, format } => local(task_id, format).await,
    }
}

async fn endpoint(task_id: String, url: String, format: OutputFormat) -> Result<()> {
    let task_id = TaskId::from_string(task_id);
    let client = SidecarClient::new(SystemClock);
    let result = client.request::<(), HealthResponse>(&task_id, &url, Method::GET, "/health", None).await;

    let outcome = match result {
        Ok(resp) => EndpointOutcome { task_id: task_id.to_string(), healthy: resp.healthy, message: resp.message },
        Err(err) => EndpointOutcome { task_id: task_id.to_string(), healthy: false, message: err.to_string() },
    };
    emit(format, &outcome, |o| render(&o.task_id, o.healthy, &o.message))
}

async fn local(task_id: String, format: OutputFormat) -> Result<()> {
    let task_id = TaskId::from_string(task_id);
    let factory = BackendFactory::new(SystemClock);
    let manager = factory.create_workspace_manager(Some(SandboxMode::Local)).await?;
    let (healthy, message) = manager.health_check(&task_id).await;

    let outcome = LocalOutcome { task_id: task_id.to_string(), healthy, message };
    emit(format, &outcome, |o| render(&o.task_id, o.healthy, &o.message))
}

fn render(task_id: &str, healthy: bool, message: &str) -> String {
    let badge = if healthy { color::good("healthy") } else { color::bad("unhealthy") };
    format!("{task_id}: {badge} — {message}")
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
