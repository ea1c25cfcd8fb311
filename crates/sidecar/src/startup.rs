// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-time workspace setup performed when the sidecar boots (§4.5): mark
//! the workspace as a git safe directory (containers commonly run as a
//! different uid than the one that cloned the repo, which git refuses to
//! operate on without this) and apply a default commit identity so an
//! agent's first commit doesn't fail for lack of `user.name`/`user.email`.

use std::path::Path;
use tokio::process::Command;
use tracing::warn;

pub async fn configure_workspace(workspace_path: &Path, default_name: &str, default_email: &str) {
    if let Err(e) = run_git(&["config", "--global", "--add", "safe.directory", &workspace_path.display().to_string()]).await {
        warn!(error = %e, "failed to register workspace as a git safe directory");
    }
    if let Err(e) = run_git_in(workspace_path, &["config", "user.name", default_name]).await {
        warn!(error = %e, "failed to set default commit user.name");
    }
    if let Err(e) = run_git_in(workspace_path, &["config", "user.email", default_email]).await {
        warn!(error = %e, "failed to set default commit user.email");
    }
}

async fn run_git(args: &[&str]) -> Result<(), String> {
    let output = Command::new("git").args(args).output().await.map_err(|e| e.to_string())?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    Ok(())
}

async fn run_git_in(cwd: &Path, args: &[&str]) -> Result<(), String> {
    let output = Command::new("git").args(args).current_dir(cwd).output().await.map_err(|e| e.to_string())?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    Ok(())
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
