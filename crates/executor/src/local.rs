// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LocalToolExecutor` — operates directly on the host filesystem rooted at
//! `workspace_path`, the same shape the sidecar's own `WorkspaceService`
//! uses, just in-process instead of behind HTTP (§4.3).

use crate::constants::{GREP_MAX_COUNT, MAX_FILE_SEARCH_RESULTS, MAX_LINES_PER_READ};
use crate::diff::line_diff_counts;
use crate::executor::ToolExecutor;
use async_trait::async_trait;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use sbx_core::{GrepMatch, TaskId, MAX_GREP_MATCHES};
use sbx_wire::{
    BackgroundCommandResponse, CommitRequest, CommitResponse, DeleteFileResponse, DiffResponse,
    DirectoryEntry, EntryType, ErrorCode, ExecuteCommandRequest, ExecuteCommandResponse,
    FileSearchRequest, FileSearchResponse, FileStatsResponse, GitStatusResponse, GrepRequest,
    GrepResponse, ListDirectoryResponse, PushRequest, PushResponse, ReadFileRequest,
    ReadFileResponse, ReplaceRequest, ReplaceResponse, WriteFileRequest, WriteFileResponse,
};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub struct LocalToolExecutor {
    task_id: TaskId,
    workspace_path: PathBuf,
}

impl LocalToolExecutor {
    pub fn new(task_id: TaskId, workspace_path: impl Into<PathBuf>) -> Self {
        Self { task_id, workspace_path: workspace_path.into() }
    }

    /// Resolve `rel` against the workspace root, rejecting anything that
    /// escapes it. The sole path boundary every operation below goes
    /// through, matching the sidecar's `resolvePath` choke point (§4.5).
    fn resolve(&self, rel: &str) -> Result<PathBuf, ErrorCode> {
        let candidate = self.workspace_path.join(rel.trim_start_matches('/'));
        let root = dunce_canonicalize(&self.workspace_path);
        // The target need not exist yet (writeFile on a new path), so walk
        // up to the first existing ancestor to canonicalize against.
        let mut probe = candidate.clone();
        while !probe.exists() {
            match probe.parent() {
                Some(p) if p != probe => probe = p.to_path_buf(),
                _ => break,
            }
        }
        let canon_probe = dunce_canonicalize(&probe);
        if !canon_probe.starts_with(&root) {
            return Err(ErrorCode::SecurityError);
        }
        Ok(candidate)
    }

    async fn read_to_string(&self, path: &Path) -> Option<String> {
        tokio::fs::read_to_string(path).await.ok()
    }
}

fn dunce_canonicalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[async_trait]
impl ToolExecutor for LocalToolExecutor {
    async fn read_file(&self, path: &str, req: ReadFileRequest) -> ReadFileResponse {
        let Ok(full) = self.resolve(path) else {
            return ReadFileResponse {
                success: false,
                content: None,
                total_lines: 0,
                start_line: 0,
                end_line: 0,
                message: "Path traversal detected".to_string(),
                error: Some(ErrorCode::SecurityError),
            };
        };
        let Some(content) = self.read_to_string(&full).await else {
            return ReadFileResponse {
                success: false,
                content: None,
                total_lines: 0,
                start_line: 0,
                end_line: 0,
                message: format!("file not found: {path}"),
                error: Some(ErrorCode::FileNotFound),
            };
        };

        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len() as u32;

        if req.entire {
            return ReadFileResponse {
                success: true,
                content: Some(content),
                total_lines,
                start_line: 1,
                end_line: total_lines,
                message: "ok".to_string(),
                error: None,
            };
        }

        let start = req.start_line.unwrap_or(1).clamp(1, total_lines.max(1));
        let default_end = start.saturating_add(MAX_LINES_PER_READ).saturating_sub(1);
        let end = req.end_line.unwrap_or(default_end).min(default_end).min(total_lines).max(start);

        let slice = if total_lines == 0 {
            String::new()
        } else {
            lines[(start as usize - 1)..(end as usize)].join("\n")
        };

        ReadFileResponse {
            success: true,
            content: Some(slice),
            total_lines,
            start_line: start,
            end_line: end,
            message: "ok".to_string(),
            error: None,
        }
    }

    async fn get_file_stats(&self, path: &str) -> FileStatsResponse {
        let Ok(full) = self.resolve(path) else {
            return FileStatsResponse { success: false, exists: false, size_bytes: None, line_count: None, message: "Path traversal detected".to_string() };
        };
        match tokio::fs::metadata(&full).await {
            Ok(meta) => {
                let line_count = self.read_to_string(&full).await.map(|s| s.lines().count() as u32);
                FileStatsResponse { success: true, exists: true, size_bytes: Some(meta.len()), line_count, message: "ok".to_string() }
            }
            Err(_) => FileStatsResponse { success: true, exists: false, size_bytes: None, line_count: None, message: "file does not exist".to_string() },
        }
    }

    async fn write_file(&self, path: &str, req: WriteFileRequest) -> WriteFileResponse {
        let Ok(full) = self.resolve(path) else {
            return WriteFileResponse { success: false, is_new_file: false, lines_added: 0, lines_removed: 0, message: "Path traversal detected".to_string() };
        };
        let is_new_file = !full.exists();
        let old_content = if is_new_file { String::new() } else { self.read_to_string(&full).await.unwrap_or_default() };

        if let Some(parent) = full.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return WriteFileResponse { success: false, is_new_file, lines_added: 0, lines_removed: 0, message: format!("failed to create parent directory: {e}") };
            }
        }
        if let Err(e) = tokio::fs::write(&full, &req.content).await {
            return WriteFileResponse { success: false, is_new_file, lines_added: 0, lines_removed: 0, message: format!("failed to write file: {e}") };
        }

        let (lines_added, lines_removed) = line_diff_counts(&old_content, &req.content);
        WriteFileResponse { success: true, is_new_file, lines_added, lines_removed, message: "ok".to_string() }
    }

    async fn delete_file(&self, path: &str) -> DeleteFileResponse {
        let Ok(full) = self.resolve(path) else {
            return DeleteFileResponse { success: false, was_already_deleted: false, message: "Path traversal detected".to_string() };
        };
        if !full.exists() {
            return DeleteFileResponse { success: true, was_already_deleted: true, message: "file did not exist".to_string() };
        }
        match tokio::fs::remove_file(&full).await {
            Ok(()) => DeleteFileResponse { success: true, was_already_deleted: false, message: "ok".to_string() },
            Err(e) => DeleteFileResponse { success: false, was_already_deleted: false, message: format!("failed to delete file: {e}") },
        }
    }

    async fn search_replace(&self, path: &str, req: ReplaceRequest) -> ReplaceResponse {
        let fail = |error: ErrorCode, message: &str| ReplaceResponse {
            success: false,
            occurrences: 0,
            old_length: 0,
            new_length: 0,
            lines_added: 0,
            lines_removed: 0,
            message: message.to_string(),
            error: Some(error),
        };

        if req.old_string.is_empty() {
            return fail(ErrorCode::EmptyOldString, "old_string must not be empty");
        }
        if req.old_string == req.new_string {
            return fail(ErrorCode::IdenticalStrings, "old_string and new_string are identical");
        }
        let Ok(full) = self.resolve(path) else {
            return fail(ErrorCode::SecurityError, "Path traversal detected");
        };
        let Some(content) = self.read_to_string(&full).await else {
            return fail(ErrorCode::FileNotFound, &format!("file not found: {path}"));
        };

        let occurrences = content.matches(req.old_string.as_str()).count();
        if occurrences == 0 {
            return fail(ErrorCode::TextNotFound, "old_string not found in file");
        }
        if occurrences > 1 {
            return fail(ErrorCode::TextNotUnique, "old_string occurs more than once in file");
        }

        let new_content = content.replacen(&req.old_string, &req.new_string, 1);
        if let Err(e) = tokio::fs::write(&full, &new_content).await {
            return ReplaceResponse {
                success: false,
                occurrences: 0,
                old_length: 0,
                new_length: 0,
                lines_added: 0,
                lines_removed: 0,
                message: format!("failed to write file: {e}"),
                error: None,
            };
        }

        let (lines_added, lines_removed) = line_diff_counts(&content, &new_content);
        ReplaceResponse {
            success: true,
            occurrences: occurrences as u32,
            old_length: req.old_string.len(),
            new_length: req.new_string.len(),
            lines_added,
            lines_removed,
            message: "ok".to_string(),
            error: None,
        }
    }

    async fn list_directory(&self, path: &str) -> ListDirectoryResponse {
        let Ok(full) = self.resolve(path) else {
            return ListDirectoryResponse { success: false, entries: vec![], message: "Path traversal detected".to_string() };
        };
        let mut entries = match tokio::fs::read_dir(&full).await {
            Ok(mut rd) => {
                let mut out = Vec::new();
                while let Ok(Some(entry)) = rd.next_entry().await {
                    let Ok(file_type) = entry.file_type().await else { continue };
                    let rel = entry.path().strip_prefix(&self.workspace_path).unwrap_or(&entry.path()).display().to_string();
                    out.push(DirectoryEntry {
                        path: rel,
                        entry_type: if file_type.is_dir() { EntryType::Directory } else { EntryType::File },
                    });
                }
                out
            }
            Err(e) => return ListDirectoryResponse { success: false, entries: vec![], message: format!("failed to read directory: {e}") },
        };
        sort_entries(&mut entries);
        ListDirectoryResponse { success: true, entries, message: "ok".to_string() }
    }

    async fn list_directory_recursive(&self, path: &str) -> ListDirectoryResponse {
        let Ok(full) = self.resolve(path) else {
            return ListDirectoryResponse { success: false, entries: vec![], message: "Path traversal detected".to_string() };
        };
        let mut entries = Vec::new();
        walk_recursive(&full, &self.workspace_path, &mut entries);
        sort_entries(&mut entries);
        ListDirectoryResponse { success: true, entries, message: "ok".to_string() }
    }

    async fn search_files(&self, req: FileSearchRequest) -> FileSearchResponse {
        let roots: Vec<PathBuf> = if req.target_dirs.is_empty() {
            vec![self.workspace_path.clone()]
        } else {
            req.target_dirs.iter().map(|d| self.workspace_path.join(d)).collect()
        };

        let mut paths = Vec::new();
        for root in roots {
            let mut entries = Vec::new();
            walk_recursive(&root, &self.workspace_path, &mut entries);
            for entry in entries {
                if entry.entry_type == EntryType::File && entry.path.contains(&req.query) {
                    paths.push(entry.path);
                    if paths.len() >= MAX_FILE_SEARCH_RESULTS {
                        return FileSearchResponse { success: true, paths, message: "ok".to_string() };
                    }
                }
            }
        }
        FileSearchResponse { success: true, paths, message: "ok".to_string() }
    }

    async fn grep_search(&self, req: GrepRequest) -> GrepResponse {
        let mut cmd = Command::new("rg");
        cmd.args(["-n", "--with-filename", "--max-count", &GREP_MAX_COUNT.to_string()]);
        if !req.case_sensitive {
            cmd.arg("-i");
        }
        if let Some(include) = &req.include_pattern {
            cmd.args(["-g", include]);
        }
        if let Some(exclude) = &req.exclude_pattern {
            cmd.args(["-g", &format!("!{exclude}")]);
        }
        cmd.arg(&req.query).current_dir(&self.workspace_path).stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = match cmd.output().await {
            Ok(o) => o,
            Err(e) => {
                return GrepResponse { success: false, matches: vec![], detailed_matches: vec![], match_count: 0, message: format!("failed to run search: {e}") };
            }
        };

        // Exit code 1 means "no matches" for ripgrep — a successful empty result.
        if !output.status.success() && output.status.code() != Some(1) {
            return GrepResponse {
                success: false,
                matches: vec![],
                detailed_matches: vec![],
                match_count: 0,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            };
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut detailed = Vec::new();
        let mut matches = Vec::new();
        for line in stdout.lines().take(MAX_GREP_MATCHES) {
            let mut parts = line.splitn(3, ':');
            let (Some(file), Some(line_no), Some(content)) = (parts.next(), parts.next(), parts.next()) else { continue };
            let Ok(line_number) = line_no.parse::<u32>() else { continue };
            let absolute = dunce_canonicalize(&self.workspace_path.join(file)).display().to_string();
            detailed.push(GrepMatch::new(absolute, line_number, content));
            matches.push(line.to_string());
        }

        GrepResponse { success: true, match_count: detailed.len(), matches, detailed_matches: detailed, message: "ok".to_string() }
    }

    async fn execute_command(&self, req: ExecuteCommandRequest) -> ExecuteCommandResponse {
        let timeout = req.timeout_ms.map(Duration::from_millis).unwrap_or(crate::constants::DEFAULT_COMMAND_TIMEOUT);
        let cwd = req.cwd.as_deref().map(|c| self.workspace_path.join(c)).unwrap_or_else(|| self.workspace_path.clone());

        let child = match Command::new("sh")
            .args(["-c", &req.command])
            .current_dir(&cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => {
                return ExecuteCommandResponse {
                    success: false,
                    stdout: None,
                    stderr: None,
                    exit_code: None,
                    is_background: false,
                    message: format!("failed to spawn command: {e}"),
                    timed_out: false,
                };
            }
        };
        let pid = child.id();

        // `wait_with_output` drains stdout/stderr concurrently with the wait;
        // reading either pipe to EOF first would block until the child closes
        // it, which a child that never exits would do never, starving the
        // timeout branch below.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => ExecuteCommandResponse {
                success: output.status.success(),
                stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
                stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
                exit_code: output.status.code(),
                is_background: false,
                message: "ok".to_string(),
                timed_out: false,
            },
            Ok(Err(e)) => ExecuteCommandResponse {
                success: false,
                stdout: None,
                stderr: None,
                exit_code: None,
                is_background: false,
                message: format!("failed to wait on command: {e}"),
                timed_out: false,
            },
            Err(_) => {
                if let Some(pid) = pid {
                    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
                }
                ExecuteCommandResponse {
                    success: false,
                    stdout: None,
                    stderr: None,
                    exit_code: None,
                    is_background: false,
                    message: format!("command timed out after {}ms", timeout.as_millis()),
                    timed_out: true,
                }
            }
        }
    }

    async fn execute_background_command(&self, req: ExecuteCommandRequest) -> BackgroundCommandResponse {
        let cwd = req.cwd.as_deref().map(|c| self.workspace_path.join(c)).unwrap_or_else(|| self.workspace_path.clone());
        match Command::new("sh")
            .args(["-c", &req.command])
            .current_dir(&cwd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                let process_id = child.id().unwrap_or(0);
                // Detached: we don't wait on it. The sidecar's process
                // registry (S2 CommandService) tracks it for shutdown.
                std::mem::forget(child);
                BackgroundCommandResponse { success: true, process_id, message: "started".to_string() }
            }
            Err(e) => BackgroundCommandResponse { success: false, process_id: 0, message: format!("failed to spawn command: {e}") },
        }
    }

    async fn get_git_status(&self) -> GitStatusResponse {
        let branch = git_output(&self.workspace_path, &["rev-parse", "--abbrev-ref", "HEAD"]).await.unwrap_or_default();
        let porcelain = git_output(&self.workspace_path, &["status", "--porcelain"]).await.unwrap_or_default();

        let mut staged = Vec::new();
        let mut modified = Vec::new();
        let mut untracked = Vec::new();
        for line in porcelain.lines() {
            if line.len() < 3 {
                continue;
            }
            let (index, worktree) = (line.as_bytes()[0], line.as_bytes()[1]);
            let file = line[3..].to_string();
            if index == b'?' && worktree == b'?' {
                untracked.push(file);
            } else if worktree != b' ' {
                modified.push(file);
            } else {
                staged.push(file);
            }
        }

        GitStatusResponse {
            success: true,
            clean: staged.is_empty() && modified.is_empty() && untracked.is_empty(),
            branch: branch.trim().to_string(),
            staged,
            modified,
            untracked,
            message: "ok".to_string(),
        }
    }

    async fn get_git_diff(&self) -> DiffResponse {
        match git_output(&self.workspace_path, &["diff"]).await {
            Some(diff) => DiffResponse { success: true, diff, message: "ok".to_string() },
            None => DiffResponse { success: false, diff: String::new(), message: "git diff failed".to_string() },
        }
    }

    async fn commit_changes(&self, req: CommitRequest) -> CommitResponse {
        let _ = git(&self.workspace_path, &["config", "user.name", &req.user.name]).await;
        let _ = git(&self.workspace_path, &["config", "user.email", &req.user.email]).await;
        let _ = git(&self.workspace_path, &["add", "-A"]).await;

        let message = match &req.co_author {
            Some(co) => format!("{}\n\nCo-authored-by: {} <{}>", req.message, co.name, co.email),
            None => req.message.clone(),
        };
        match git(&self.workspace_path, &["commit", "-m", &message]).await {
            Ok(true) => match git_output(&self.workspace_path, &["rev-parse", "HEAD"]).await {
                Some(sha) => CommitResponse { success: true, commit_sha: Some(sha.trim().to_string()), message: "ok".to_string(), error: None },
                None => CommitResponse { success: true, commit_sha: None, message: "committed".to_string(), error: None },
            },
            Ok(false) => CommitResponse { success: false, commit_sha: None, message: "nothing to commit".to_string(), error: Some("EMPTY_COMMIT".to_string()) },
            Err(e) => CommitResponse { success: false, commit_sha: None, message: e, error: Some("COMMAND_FAILED".to_string()) },
        }
    }

    async fn push_branch(&self, req: PushRequest) -> PushResponse {
        let mut args = vec!["push", "origin", req.branch.as_str()];
        if req.force {
            args.insert(1, "--force");
        }
        match git(&self.workspace_path, &args).await {
            Ok(true) => PushResponse { success: true, message: "ok".to_string(), error: None },
            Ok(false) | Err(_) => PushResponse { success: false, message: "push failed".to_string(), error: Some("COMMAND_FAILED".to_string()) },
        }
    }

    fn get_workspace_path(&self) -> &str {
        self.workspace_path.to_str().unwrap_or_default()
    }

    fn is_remote(&self) -> bool {
        false
    }

    fn get_task_id(&self) -> TaskId {
        self.task_id
    }
}

fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| match (a.entry_type, b.entry_type) {
        (EntryType::Directory, EntryType::File) => std::cmp::Ordering::Less,
        (EntryType::File, EntryType::Directory) => std::cmp::Ordering::Greater,
        _ => a.path.cmp(&b.path),
    });
}

fn walk_recursive(dir: &Path, root: &Path, out: &mut Vec<DirectoryEntry>) {
    let Ok(rd) = std::fs::read_dir(dir) else { return };
    for entry in rd.flatten() {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if crate::constants::RECURSIVE_LIST_IGNORE.contains(&name_str.as_ref()) {
            continue;
        }
        let Ok(file_type) = entry.file_type() else { continue };
        let rel = entry.path().strip_prefix(root).unwrap_or(&entry.path()).display().to_string();
        if file_type.is_dir() {
            out.push(DirectoryEntry { path: rel, entry_type: EntryType::Directory });
            walk_recursive(&entry.path(), root, out);
        } else {
            out.push(DirectoryEntry { path: rel, entry_type: EntryType::File });
        }
    }
}

async fn git(cwd: &Path, args: &[&str]) -> Result<bool, String> {
    let output = Command::new("git").args(args).current_dir(cwd).output().await.map_err(|e| e.to_string())?;
    Ok(output.status.success())
}

async fn git_output(cwd: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).current_dir(cwd).output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
