// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `FileSystemWatcher` — debounced, filtered, pausable recursive watch over
//! the workspace (§4.7).
//!
//! A single shared debounce timer resets on every raw event; at expiry the
//! whole pending map is drained into one batch sharing a `batch_timestamp_ms`
//! (§8 invariant 9). Directory-vs-file is decided at flush time via
//! `std::fs::symlink_metadata` on the event path, not a path-string
//! heuristic — the known imperfection §9 calls out to fix.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use sbx_core::fs_event::{ChangeKind, EntryKind, FileSystemEvent};
use sbx_core::Clock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const BUILTIN_DENY_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "tmp"];
const BUILTIN_DENY_FILES: &[&str] = &[".DS_Store"];
const BUILTIN_DENY_SUFFIXES: &[&str] = &[".log", ".tmp", "~", ".swp", ".swo"];

#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

struct Inner<C: Clock> {
    root: PathBuf,
    config: WatcherConfig,
    pending: Mutex<HashMap<String, ChangeKind>>,
    epoch: AtomicU64,
    paused: AtomicBool,
    gitignore: Option<Gitignore>,
    outbound: mpsc::UnboundedSender<Vec<FileSystemEvent>>,
    clock: C,
    handle: tokio::runtime::Handle,
    native: Mutex<Option<RecommendedWatcher>>,
}

/// Watches `root` recursively and emits coalesced [`FileSystemEvent`] batches.
#[derive(Clone)]
pub struct FileSystemWatcher<C: Clock + 'static> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock + 'static> FileSystemWatcher<C> {
    /// Build a watcher rooted at `root`, without starting the native watch.
    /// Call [`Self::start`] to begin observing filesystem events.
    pub fn new(root: impl Into<PathBuf>, config: WatcherConfig, clock: C) -> (Self, mpsc::UnboundedReceiver<Vec<FileSystemEvent>>) {
        let root = root.into();
        let gitignore = load_gitignore(&root);
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            inner: Arc::new(Inner {
                root,
                config,
                pending: Mutex::new(HashMap::new()),
                epoch: AtomicU64::new(0),
                paused: AtomicBool::new(false),
                gitignore,
                outbound: tx,
                clock,
                handle: tokio::runtime::Handle::current(),
                native: Mutex::new(None),
            }),
        };
        (watcher, rx)
    }

    /// Start the native recursive watch. Idempotent no-op if already started.
    pub fn start(&self) -> Result<(), String> {
        let mut native = self.inner.native.lock();
        if native.is_some() {
            return Ok(());
        }
        let this = self.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else {
                warn!("filesystem watcher error: {:?}", res.err());
                return;
            };
            this.on_raw_event(event);
        })
        .map_err(|e| e.to_string())?;
        watcher.watch(&self.inner.root, RecursiveMode::Recursive).map_err(|e| e.to_string())?;
        *native = Some(watcher);
        Ok(())
    }

    fn on_raw_event(&self, event: notify::Event) {
        if self.inner.paused.load(Ordering::SeqCst) {
            return;
        }
        let change_kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Modify(_) => ChangeKind::Modified,
            EventKind::Remove(_) => ChangeKind::Deleted,
            _ => return,
        };

        for path in &event.paths {
            let Ok(rel) = path.strip_prefix(&self.inner.root) else { continue };
            if self.is_ignored(rel) {
                continue;
            }
            let rel_str = rel.to_string_lossy().to_string();
            self.inner.pending.lock().insert(rel_str, change_kind);
        }

        self.schedule_flush();
    }

    fn is_ignored(&self, rel: &Path) -> bool {
        if rel.components().any(|c| {
            let s = c.as_os_str().to_string_lossy();
            BUILTIN_DENY_DIRS.contains(&s.as_ref()) || BUILTIN_DENY_FILES.contains(&s.as_ref())
        }) {
            return true;
        }
        let name = rel.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if BUILTIN_DENY_SUFFIXES.iter().any(|suf| name.ends_with(suf)) {
            return true;
        }
        if let Some(gi) = &self.inner.gitignore {
            let full = self.inner.root.join(rel);
            let is_dir = full.is_dir();
            if gi.matched(rel, is_dir).is_ignore() {
                return true;
            }
        }
        false
    }

    fn schedule_flush(&self) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let this = self.clone();
        let debounce = Duration::from_millis(self.inner.config.debounce_ms);
        self.inner.handle.spawn(async move {
            tokio::time::sleep(debounce).await;
            if this.inner.epoch.load(Ordering::SeqCst) == epoch {
                this.flush_now();
            }
        });
    }

    /// Drain the pending map into one batch and send it upstream. Exposed
    /// directly so tests can flush deterministically without sleeping.
    pub fn flush_now(&self) {
        if self.inner.paused.load(Ordering::SeqCst) {
            return;
        }
        let drained: Vec<(String, ChangeKind)> = {
            let mut pending = self.inner.pending.lock();
            if pending.is_empty() {
                return;
            }
            pending.drain().collect()
        };
        let batch_timestamp_ms = self.inner.clock.epoch_ms();
        let events: Vec<FileSystemEvent> = drained
            .into_iter()
            .map(|(path, change_kind)| {
                let entry_kind = stat_entry_kind(&self.inner.root.join(&path));
                FileSystemEvent { path, entry_kind, change_kind, batch_timestamp_ms }
            })
            .collect();
        debug!(count = events.len(), "filesystem watcher flushing batch");
        let _ = self.inner.outbound.send(events);
    }

    /// Halt emission and discard anything buffered. Events observed while
    /// paused are dropped, not queued for replay.
    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::SeqCst);
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.pending.lock().clear();
    }

    /// Re-enable emission. Clears the pending map again so nothing observed
    /// mid-pause leaks into the next batch.
    pub fn resume(&self) {
        self.inner.pending.lock().clear();
        self.inner.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Stop the native watch. Safe to call even if never started.
    pub fn stop(&self) {
        *self.inner.native.lock() = None;
    }
}

fn stat_entry_kind(path: &Path) -> EntryKind {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => EntryKind::Directory,
        Ok(_) => EntryKind::File,
        Err(_) => EntryKind::Unknown,
    }
}

fn load_gitignore(root: &Path) -> Option<Gitignore> {
    let gitignore_path = root.join(".gitignore");
    if !gitignore_path.exists() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(root);
    if builder.add(&gitignore_path).is_some() {
        warn!("failed to parse .gitignore, falling back to built-in deny list");
        return None;
    }
    builder.build().ok()
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
