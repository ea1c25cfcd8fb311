// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CommandService` — shell execution with a process registry so the
//! sidecar can terminate every child it spawned on shutdown (§4.5).
//!
//! Foreground commands run with a timeout that SIGKILLs the child on
//! expiry; background commands are detached but tracked in the registry
//! instead of forgotten outright, unlike `LocalToolExecutor`'s in-process
//! variant which has no shutdown hook to answer to.

use crate::terminal::TerminalBuffer;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use sbx_core::terminal::TerminalStream;
use sbx_core::Clock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub success: bool,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BackgroundOutcome {
    pub success: bool,
    pub process_id: u32,
    pub message: String,
}

/// Tracks spawned background children by pid so [`ProcessRegistry::kill_all`]
/// can terminate every one of them, the shared-mutable-state exception
/// called out for the sidecar's command service.
#[derive(Clone, Default)]
pub struct ProcessRegistry {
    children: Arc<Mutex<HashMap<u32, Child>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&self, child: Child) -> Option<u32> {
        let pid = child.id()?;
        self.children.lock().insert(pid, child);
        Some(pid)
    }

    pub fn untrack(&self, pid: u32) {
        self.children.lock().remove(&pid);
    }

    pub fn len(&self) -> usize {
        self.children.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// SIGKILL every tracked child. Used on workspace cleanup/sidecar
    /// shutdown; background commands have no other cancellation path.
    pub fn kill_all(&self) {
        let mut children = self.children.lock();
        for (pid, _) in children.drain() {
            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                warn!(pid, error = %e, "failed to kill tracked process");
            } else {
                info!(pid, "killed tracked background process");
            }
        }
    }
}

/// Read `pipe` to EOF line by line, pushing each line into `terminal` as it
/// arrives. Spawned once per background child per stream; exits on its own
/// once the child closes the pipe.
fn spawn_line_forwarder<C, R>(terminal: TerminalBuffer<C>, stream: TerminalStream, pipe: R, process_id: Option<u32>)
where
    C: Clock + 'static,
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            terminal.add_entry_with_pid(stream, line, process_id);
        }
    });
}

pub struct CommandService<C: Clock> {
    workspace_path: PathBuf,
    registry: ProcessRegistry,
    terminal: TerminalBuffer<C>,
}

impl<C: Clock + 'static> CommandService<C> {
    pub fn new(workspace_path: impl Into<PathBuf>, registry: ProcessRegistry, terminal: TerminalBuffer<C>) -> Self {
        Self { workspace_path: workspace_path.into(), registry, terminal }
    }

    fn resolve_cwd(&self, cwd: Option<&str>) -> PathBuf {
        cwd.map(|c| self.workspace_path.join(c)).unwrap_or_else(|| self.workspace_path.clone())
    }

    /// Run `command` to completion under `timeout`, capturing stdout/stderr.
    /// On timeout, SIGKILLs the child before returning.
    ///
    /// Uses `wait_with_output` so stdout/stderr are drained concurrently with
    /// the wait instead of sequentially before it — reading a pipe to EOF
    /// blocks until the child closes it, which for a child that never exits
    /// would stall forever and never reach the timeout branch below.
    pub async fn exec(&self, command: &str, cwd: Option<&str>, timeout: Duration) -> CommandOutcome {
        let cwd = self.resolve_cwd(cwd);
        let child = match Command::new("sh").args(["-c", command]).current_dir(&cwd).stdout(Stdio::piped()).stderr(Stdio::piped()).spawn() {
            Ok(c) => c,
            Err(e) => {
                self.terminal.add_entry(TerminalStream::System, format!("failed to spawn: {e}"));
                return CommandOutcome { success: false, stdout: None, stderr: None, exit_code: None, timed_out: false, message: format!("failed to spawn command: {e}") };
            }
        };
        let pid = child.id();
        self.terminal.add_entry_with_pid(TerminalStream::Command, format!("$ {command}"), pid);

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                if !stdout.is_empty() {
                    self.terminal.add_entry_with_pid(TerminalStream::Stdout, stdout.clone(), pid);
                }
                if !stderr.is_empty() {
                    self.terminal.add_entry_with_pid(TerminalStream::Stderr, stderr.clone(), pid);
                }
                self.terminal.add_entry_with_pid(TerminalStream::System, format!("exited with {:?}", output.status.code()), pid);
                CommandOutcome {
                    success: output.status.success(),
                    stdout: Some(stdout),
                    stderr: Some(stderr),
                    exit_code: output.status.code(),
                    timed_out: false,
                    message: "ok".to_string(),
                }
            }
            Ok(Err(e)) => {
                self.terminal.add_entry_with_pid(TerminalStream::System, format!("failed to wait on command: {e}"), pid);
                CommandOutcome {
                    success: false,
                    stdout: None,
                    stderr: None,
                    exit_code: None,
                    timed_out: false,
                    message: format!("failed to wait on command: {e}"),
                }
            }
            Err(_) => {
                if let Some(pid) = pid {
                    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
                }
                self.terminal.add_entry_with_pid(TerminalStream::System, format!("timed out after {}ms", timeout.as_millis()), pid);
                CommandOutcome {
                    success: false,
                    stdout: None,
                    stderr: None,
                    exit_code: None,
                    timed_out: true,
                    message: format!("command timed out after {}ms", timeout.as_millis()),
                }
            }
        }
    }

    /// Spawn `command` detached and register it so shutdown can reach it.
    /// Its stdout/stderr are forwarded into the terminal buffer line by line
    /// as they arrive, since a background command has no caller left
    /// waiting on its output.
    pub fn exec_background(&self, command: &str, cwd: Option<&str>) -> BackgroundOutcome {
        let cwd = self.resolve_cwd(cwd);
        let mut child = match Command::new("sh").args(["-c", command]).current_dir(&cwd).stdout(Stdio::piped()).stderr(Stdio::piped()).stdin(Stdio::null()).spawn() {
            Ok(c) => c,
            Err(e) => {
                self.terminal.add_entry(TerminalStream::System, format!("failed to spawn: {e}"));
                return BackgroundOutcome { success: false, process_id: 0, message: format!("failed to spawn command: {e}") };
            }
        };
        let pid = child.id();
        self.terminal.add_entry_with_pid(TerminalStream::Command, format!("$ {command} &"), pid);

        if let Some(stdout) = child.stdout.take() {
            spawn_line_forwarder(self.terminal.clone(), TerminalStream::Stdout, stdout, pid);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_forwarder(self.terminal.clone(), TerminalStream::Stderr, stderr, pid);
        }

        match self.registry.track(child) {
            Some(pid) => BackgroundOutcome { success: true, process_id: pid, message: "started".to_string() },
            None => BackgroundOutcome { success: false, process_id: 0, message: "process exited before it could be tracked".to_string() },
        }
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
