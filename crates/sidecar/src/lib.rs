// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sbxd` — the in-sandbox sidecar (S1–S6): an HTTP server that exposes
//! file, search, command and git operations over the workspace it is
//! bound to, plus a terminal ring buffer and filesystem watcher that can
//! stream to an upstream control plane over a websocket.

pub mod command;
pub mod env;
pub mod error;
pub mod git;
pub mod routes;
pub mod socket;
pub mod startup;
pub mod terminal;
pub mod vm_console;
pub mod watcher;
pub mod workspace;

use command::{CommandService, ProcessRegistry};
use git::GitService;
use sbx_core::{Clock, TaskId};
use sbx_executor::LocalToolExecutor;
use std::path::Path;
use std::sync::Arc;
use terminal::{TerminalBuffer, TerminalBufferConfig};
use workspace::WorkspaceService;

/// Shared state handed to every axum handler. Cheap to clone: everything
/// mutable lives behind the `Arc`s/internal locks of its fields, matching
/// `SidecarClient`'s own "clone the handle, share the state" shape on the
/// control-plane side of the same wire contract.
#[derive(Clone)]
pub struct AppState<C: Clock> {
    pub workspace: Arc<WorkspaceService>,
    pub executor: Arc<LocalToolExecutor>,
    pub git: Arc<GitService>,
    pub terminal: TerminalBuffer<C>,
    pub commands: Arc<CommandService<C>>,
    pub clock: C,
    pub started_at_ms: u64,
}

impl<C: Clock + 'static> AppState<C> {
    pub fn new(task_id: TaskId, workspace_root: impl AsRef<Path>, clock: C) -> Self {
        let root = workspace_root.as_ref();
        let started_at_ms = clock.epoch_ms();
        let terminal_config = TerminalBufferConfig {
            max_entries: env::terminal_max_entries(),
            max_memory_bytes: env::terminal_max_memory_bytes(),
            backpressure_threshold: env::terminal_backpressure_threshold(),
        };
        let terminal = TerminalBuffer::new(terminal_config, clock.clone());
        Self {
            workspace: Arc::new(WorkspaceService::new(root)),
            executor: Arc::new(LocalToolExecutor::new(task_id, root)),
            git: Arc::new(GitService::new(root)),
            commands: Arc::new(CommandService::new(root, ProcessRegistry::new(), terminal.clone())),
            terminal,
            clock,
            started_at_ms,
        }
    }
}
