// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Types shared by the sidecar's `TerminalBuffer` and its HTTP/upstream views.

use serde::{Deserialize, Serialize};

/// Fixed per-entry memory estimator used by admission math.
///
/// Deliberately simple and deterministic rather than an exact accounting of
/// `TerminalEntry`'s heap footprint — admission decisions must be
/// reproducible across implementations, not byte-accurate.
pub const fn estimate_entry_bytes(data_len: usize) -> usize {
    data_len * 2 + 100
}

/// Stream an entry was written to.
///
/// `Command` marks the invocation line itself (`$ <command>`), `System`
/// marks buffer-generated bookkeeping (exit status, truncation notices) —
/// neither comes from the child process's own file descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStream {
    Stdout,
    Stderr,
    Command,
    System,
}

/// One admitted line (or chunk) of terminal output.
///
/// `id` is assigned by the buffer on admission and is strictly monotonic
/// for the lifetime of that buffer; gaps from eviction are allowed,
/// reorderings are not. `process_id` is set for entries produced by a
/// tracked child process and `None` for `System` bookkeeping entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEntry {
    pub id: u64,
    pub stream: TerminalStream,
    pub data: String,
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<u32>,
}

impl TerminalEntry {
    pub fn estimated_bytes(&self) -> usize {
        estimate_entry_bytes(self.data.len())
    }
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
