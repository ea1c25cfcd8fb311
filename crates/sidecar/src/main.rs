// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sbxd` entry point: read configuration from the environment, prepare the
//! workspace, wire the HTTP router, and (when an upstream control plane is
//! configured) start the filesystem watcher and the websocket channel that
//! streams its events out.

use sbx_core::SystemClock;
use sbx_sidecar::socket::{SocketClient, SocketConfig};
use sbx_sidecar::watcher::{FileSystemWatcher, WatcherConfig};
use sbx_sidecar::{env, routes, startup, AppState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(env::log_level())).init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "sbxd exited");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let workspace_dir = env::workspace_dir();
    let clock = SystemClock;
    let task_id = env::task_id().map(sbx_core::TaskId::from_string).unwrap_or_else(sbx_core::TaskId::new);

    startup::configure_workspace(std::path::Path::new(&workspace_dir), &env::default_commit_name(), &env::default_commit_email()).await;

    let state = AppState::new(task_id.clone(), &workspace_dir, clock.clone());

    if let Some(upstream_url) = env::upstream_url() {
        let (watcher, mut events) = FileSystemWatcher::new(
            workspace_dir.clone(),
            WatcherConfig { debounce_ms: env::watcher_debounce_ms() },
            clock.clone(),
        );
        if let Err(e) = watcher.start() {
            tracing::warn!(error = %e, "failed to start filesystem watcher");
        }

        let socket = Arc::new(SocketClient::new(SocketConfig {
            url: upstream_url,
            task_id: task_id.as_str().to_string(),
            heartbeat_interval: env::heartbeat_interval(),
            max_reconnect_attempts: env::upstream_max_reconnect_attempts(),
            base_delay: env::upstream_reconnect_base_delay(),
            max_delay: env::upstream_reconnect_max_delay(),
        }));

        let socket_for_run = socket.clone();
        let clock_for_run = clock.clone();
        tokio::spawn(async move { socket_for_run.run(clock_for_run).await });

        tokio::spawn(async move {
            while let Some(batch) = events.recv().await {
                for event in batch {
                    socket.send_fs_change(event);
                }
            }
        });
    }

    let router = routes::build_router(state);
    let addr = format!("0.0.0.0:{}", env::port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, task_id = %task_id, workspace = %workspace_dir, "sbxd listening");
    axum::serve(listener, router).await?;
    Ok(())
}
