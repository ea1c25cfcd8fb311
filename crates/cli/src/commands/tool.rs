// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sbx tool` — exercise the uniform `ToolExecutor` contract (§4.3) directly
//! against a workspace path, without an agent driver in the loop. Useful
//! for reproducing a tool call an agent made, or smoke-testing a sandbox
//! after `sbx sandbox prepare`.
//!
//! Every operation here returns a structured, `success`-tagged result
//! rather than an `Err` — tool-level failures are never exceptions (§7).
//! `sbx` only maps a *construction* failure (bad path, can't reach a
//! sidecar) to a process exit code; the wire response itself is always
//! printed.

use anyhow::Result;
use clap::{Args, Subcommand};
use sbx_core::TaskId;
use sbx_executor::{LocalToolExecutor, ToolExecutor};
use sbx_wire::{ExecuteCommandRequest, GrepRequest, ReadFileRequest, ReplaceRequest, WriteFileRequest};

use crate::output::{emit, OutputFormat};

#[derive(Args)]
pub struct ToolArgs {
    /// Workspace root the operation is rooted at (a sandbox's `workspacePath`).
    #[arg(long)]
    pub workspace_path: String,
    /// Task id the operation is attributed to; need not be a live sandbox.
    #[arg(long, default_value = "task-cli")]
    pub task_id: String,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: ToolCommand,
}

#[derive(Subcommand)]
pub enum ToolCommand {
    /// Read a file, optionally clamped to a line range (§4.3's read-range rule).
    ReadFile {
        path: String,
        #[arg(long)]
        entire: bool,
        #[arg(long)]
        start_line: Option<u32>,
        #[arg(long)]
        end_line: Option<u32>,
    },
    /// Write (create or overwrite) a file.
    WriteFile {
        path: String,
        content: String,
        #[arg(long, default_value = "")]
        instructions: String,
    },
    /// Delete a file. Missing files are not an error (`wasAlreadyDeleted`).
    DeleteFile { path: String },
    /// Replace exactly one occurrence of `old` with `new`.
    SearchReplace { path: String, old: String, new: String },
    ListDirectory { path: String },
    ListDirectoryRecursive { path: String },
    SearchFiles {
        query: String,
        #[arg(long = "dir")]
        target_dirs: Vec<String>,
    },
    Grep {
        query: String,
        #[arg(long)]
        include: Option<String>,
        #[arg(long)]
        exclude: Option<String>,
        #[arg(long)]
        case_sensitive: bool,
    },
    /// Run a foreground command with a timeout (default 30s, §4.3).
    Exec {
        command: String,
        #[arg(long)]
        cwd: Option<String>,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    GitStatus,
    GitDiff,
}

pub async fn run(args: ToolArgs) -> Result<()> {
    let executor = LocalToolExecutor::new(TaskId::from_string(args.task_id), args.workspace_path);
    let format = args.format;

    match args.command {
        ToolCommand::ReadFile { path, entire, start_line, end_line } => {
            let resp = executor.read_file(&path, ReadFileRequest { entire, start_line, end_line }).await;
            emit(format, &resp, |r| r.content.clone().unwrap_or_else(|| r.message.clone()))
        }
        ToolCommand::WriteFile { path, content, instructions } => {
            let resp = executor.write_file(&path, WriteFileRequest { content, instructions }).await;
            emit(format, &resp, |r| r.message.clone())
        }
        ToolCommand::DeleteFile { path } => {
            let resp = executor.delete_file(&path).await;
            emit(format, &resp, |r| r.message.clone())
        }
        ToolCommand::SearchReplace { path, old, new } => {
            let resp = executor.search_replace(&path, ReplaceRequest { old_string: old, new_string: new }).await;
            emit(format, &resp, |r| r.message.clone())
        }
        ToolCommand::ListDirectory { path } => {
            let resp = executor.list_directory(&path).await;
            emit(format, &resp, render_directory)
        }
        ToolCommand::ListDirectoryRecursive { path } => {
            let resp = executor.list_directory_recursive(&path).await;
            emit(format, &resp, render_directory)
        }
        ToolCommand::SearchFiles { query, target_dirs } => {
            let resp = executor.search_files(sbx_wire::FileSearchRequest { query, target_dirs }).await;
            emit(format, &resp, |r| r.paths.join("\n"))
        }
        ToolCommand::Grep { query, include, exclude, case_sensitive } => {
            let resp = executor
                .grep_search(GrepRequest { query, include_pattern: include, exclude_pattern: exclude, case_sensitive })
                .await;
            emit(format, &resp, |r| {
                r.detailed_matches.iter().map(|m| format!("{}:{}:{}", m.file, m.line_number, m.content)).collect::<Vec<_>>().join("\n")
            })
        }
        ToolCommand::Exec { command, cwd, timeout_ms } => {
            let resp = executor.execute_command(ExecuteCommandRequest { command, is_background: false, timeout_ms, cwd }).await;
            emit(format, &resp, |r| {
                let mut out = String::new();
                if let Some(stdout) = &r.stdout {
                    out.push_str(stdout);
                }
                if let Some(stderr) = &r.stderr {
                    out.push_str(stderr);
                }
                if out.is_empty() {
                    out = r.message.clone();
                }
                out
            })
        }
        ToolCommand::GitStatus => {
            let resp = executor.get_git_status().await;
            emit(format, &resp, |r| format!("branch {} ({})", r.branch, if r.clean { "clean" } else { "dirty" }))
        }
        ToolCommand::GitDiff => {
            let resp = executor.get_git_diff().await;
            emit(format, &resp, |r| r.diff.clone())
        }
    }
}

fn render_directory(resp: &sbx_wire::ListDirectoryResponse) -> String {
    resp.entries
        .iter()
        .map(|e| match e.entry_type {
            sbx_wire::EntryType::Directory => format!("{}/", e.path),
            sbx_wire::EntryType::File => e.path.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
