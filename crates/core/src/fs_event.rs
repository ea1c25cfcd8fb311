// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semantic filesystem change events emitted by the sidecar's watcher.
//!
//! Resolves the source's known imperfection (directory-vs-file collapsed by
//! a "no extension" heuristic, deletes folded into `directory-created`):
//! [`EntryKind`] is derived from a `symlink_metadata` call on the event path
//! at flush time, not from the path string, and deletions carry their own
//! [`ChangeKind`] instead of being coerced into a creation event.

use serde::{Deserialize, Serialize};

/// What kind of filesystem entry the event path refers to.
///
/// `Unknown` covers deletions, where the path no longer exists to stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
    Unknown,
}

/// The kind of change observed for a path within one debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// One coalesced change, emitted once per path per debounce batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemEvent {
    /// Path relative to the workspace root.
    pub path: String,
    pub entry_kind: EntryKind,
    pub change_kind: ChangeKind,
    /// Shared by every event emitted in the same debounce flush; batches
    /// are monotonic, events within one batch carry the same value.
    pub batch_timestamp_ms: u64,
}

impl FileSystemEvent {
    /// Wire-facing event type string, e.g. `file-modified`, `directory-created`.
    pub fn type_name(&self) -> String {
        let entry = match self.entry_kind {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Unknown => "entry",
        };
        let change = match self.change_kind {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        };
        format!("{entry}-{change}")
    }
}

#[cfg(test)]
#[path = "fs_event_tests.rs"]
mod tests;
