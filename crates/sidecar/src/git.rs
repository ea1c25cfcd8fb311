// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git operations exposed over `/api/git/*` that go beyond what
//! [`sbx_executor::ToolExecutor`] needs for the control plane's own
//! local-mode executor (clone, config, branch/checkout, diff against an
//! arbitrary base, current branch/commit, and per-branch commit/file
//! history) — the sidecar talks to the workspace's git checkout directly
//! since it already owns the filesystem.

use std::path::{Path, PathBuf};
use tokio::process::Command;

pub struct GitService {
    workspace_path: PathBuf,
}

impl GitService {
    pub fn new(workspace_path: impl Into<PathBuf>) -> Self {
        Self { workspace_path: workspace_path.into() }
    }

    pub async fn clone_repo(&self, repo_url: &str, base_branch: &str, shadow_branch: Option<&str>) -> Result<(), String> {
        let parent = self.workspace_path.parent().unwrap_or(Path::new("/"));
        git_in(parent, &["clone", "--branch", base_branch, repo_url, &self.workspace_path.display().to_string()]).await?;
        if let Some(shadow) = shadow_branch {
            git(&self.workspace_path, &["checkout", "-b", shadow]).await?;
        }
        Ok(())
    }

    pub async fn set_config(&self, key: &str, value: &str) -> Result<(), String> {
        git(&self.workspace_path, &["config", key, value]).await
    }

    pub async fn branch(&self, branch: &str, create: bool, base: Option<&str>) -> Result<(), String> {
        if create {
            let mut args = vec!["checkout", "-b", branch];
            if let Some(base) = base {
                args.push(base);
            }
            git(&self.workspace_path, &args).await
        } else {
            git(&self.workspace_path, &["checkout", branch]).await
        }
    }

    pub async fn diff_against_base(&self, base_branch: &str) -> Result<String, String> {
        let range = format!("{base_branch}...HEAD");
        git_output(&self.workspace_path, &["diff", &range]).await
    }

    pub async fn current_branch(&self) -> Result<String, String> {
        git_output(&self.workspace_path, &["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    pub async fn current_commit(&self) -> Result<String, String> {
        git_output(&self.workspace_path, &["rev-parse", "HEAD"]).await
    }

    pub async fn commit_messages(&self, base_branch: &str) -> Result<Vec<String>, String> {
        let range = format!("{base_branch}..HEAD");
        let out = git_output(&self.workspace_path, &["log", "--pretty=format:%s", &range]).await?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    pub async fn file_changes(&self, base_branch: &str) -> Result<Vec<String>, String> {
        let range = format!("{base_branch}...HEAD");
        let out = git_output(&self.workspace_path, &["diff", "--name-only", &range]).await?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }
}

async fn git(cwd: &Path, args: &[&str]) -> Result<(), String> {
    let output = Command::new("git").args(args).current_dir(cwd).output().await.map_err(|e| e.to_string())?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    Ok(())
}

async fn git_in(cwd: &Path, args: &[&str]) -> Result<(), String> {
    git(cwd, args).await
}

async fn git_output(cwd: &Path, args: &[&str]) -> Result<String, String> {
    let output = Command::new("git").args(args).current_dir(cwd).output().await.map_err(|e| e.to_string())?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
