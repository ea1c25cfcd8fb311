// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TerminalBuffer` — bounded ring buffer of command output with backpressure
//! admission (§4.6). Subscribers observe admitted entries over a broadcast
//! channel rather than a callback list, so a panicking consumer can never
//! corrupt the buffer (design note: "replace callback-based subscribers with
//! a bounded channel + consumer task").

use parking_lot::Mutex;
use sbx_core::terminal::{estimate_entry_bytes, TerminalEntry, TerminalStream};
use sbx_core::Clock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct TerminalBufferConfig {
    pub max_entries: usize,
    pub max_memory_bytes: usize,
    pub backpressure_threshold: f64,
}

impl Default for TerminalBufferConfig {
    fn default() -> Self {
        Self { max_entries: 5_000, max_memory_bytes: 8 * 1024 * 1024, backpressure_threshold: 0.8 }
    }
}

struct Inner {
    entries: Mutex<VecDeque<TerminalEntry>>,
    memory_bytes: AtomicUsize,
    next_id: AtomicU64,
    in_backpressure: AtomicBool,
    drop_count: AtomicU64,
    config: TerminalBufferConfig,
    subscribers: broadcast::Sender<TerminalEntry>,
}

/// Append-only log of [`TerminalEntry`] with admission backpressure.
///
/// Cheaply cloneable; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct TerminalBuffer<C: Clock> {
    inner: Arc<Inner>,
    clock: C,
}

impl<C: Clock> TerminalBuffer<C> {
    pub fn new(config: TerminalBufferConfig, clock: C) -> Self {
        let (tx, _rx) = broadcast::channel(1024);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(VecDeque::new()),
                memory_bytes: AtomicUsize::new(0),
                next_id: AtomicU64::new(1),
                in_backpressure: AtomicBool::new(false),
                drop_count: AtomicU64::new(0),
                config,
                subscribers: tx,
            }),
            clock,
        }
    }

    fn utilization_over_threshold(&self) -> bool {
        let size = self.inner.entries.lock().len();
        let memory = self.inner.memory_bytes.load(Ordering::Relaxed);
        let size_gate = (self.inner.config.max_entries as f64) * self.inner.config.backpressure_threshold;
        let memory_gate = (self.inner.config.max_memory_bytes as f64) * self.inner.config.backpressure_threshold;
        (size as f64) >= size_gate || (memory as f64) >= memory_gate
    }

    /// Admit a new entry. Returns `false` (without mutating size/memory)
    /// while under backpressure (§8 invariant 7).
    pub fn add_entry(&self, stream: TerminalStream, data: String) -> bool {
        self.add_entry_with_pid(stream, data, None)
    }

    /// Same as [`Self::add_entry`] but tags the entry with the child
    /// process it came from.
    pub fn add_entry_with_pid(&self, stream: TerminalStream, data: String, process_id: Option<u32>) -> bool {
        if self.utilization_over_threshold() {
            if !self.inner.in_backpressure.swap(true, Ordering::SeqCst) {
                warn!("terminal buffer entering backpressure");
            }
            let drops = self.inner.drop_count.fetch_add(1, Ordering::SeqCst) + 1;
            if drops % 100 == 0 {
                warn!(drops, "terminal buffer dropping entries under backpressure");
            }
            return false;
        }

        if self.inner.in_backpressure.swap(false, Ordering::SeqCst) {
            let drops = self.inner.drop_count.swap(0, Ordering::SeqCst);
            info!(drops, "terminal buffer exiting backpressure");
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let entry = TerminalEntry { id, stream, timestamp_ms: self.clock.epoch_ms(), data, process_id };
        let bytes = entry.estimated_bytes();

        {
            let mut entries = self.inner.entries.lock();
            entries.push_back(entry.clone());
            self.inner.memory_bytes.fetch_add(bytes, Ordering::SeqCst);
            self.evict_excess(&mut entries);
        }

        let _ = self.inner.subscribers.send(entry);
        true
    }

    fn evict_excess(&self, entries: &mut VecDeque<TerminalEntry>) {
        while entries.len() > self.inner.config.max_entries
            || self.inner.memory_bytes.load(Ordering::SeqCst) > self.inner.config.max_memory_bytes
        {
            let Some(evicted) = entries.pop_front() else { break };
            self.inner.memory_bytes.fetch_sub(estimate_entry_bytes(evicted.data.len()), Ordering::SeqCst);
        }
    }

    pub fn get_recent(&self, n: usize) -> Vec<TerminalEntry> {
        let entries = self.inner.entries.lock();
        let start = entries.len().saturating_sub(n);
        entries.iter().skip(start).cloned().collect()
    }

    pub fn get_since(&self, id: u64) -> Vec<TerminalEntry> {
        self.inner.entries.lock().iter().filter(|e| e.id > id).cloned().collect()
    }

    pub fn get_in_range(&self, t0: u64, t1: u64) -> Vec<TerminalEntry> {
        self.inner.entries.lock().iter().filter(|e| e.timestamp_ms >= t0 && e.timestamp_ms <= t1).cloned().collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TerminalEntry> {
        self.inner.subscribers.subscribe()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn memory_bytes(&self) -> usize {
        self.inner.memory_bytes.load(Ordering::SeqCst)
    }

    pub fn drop_count(&self) -> u64 {
        self.inner.drop_count.load(Ordering::SeqCst)
    }

    /// Drop every entry older than `2 * flush_interval`. Invoked by the
    /// periodic flush task; exposed directly for tests.
    pub fn flush(&self, flush_interval_ms: u64) {
        let cutoff = self.clock.epoch_ms().saturating_sub(2 * flush_interval_ms);
        let mut entries = self.inner.entries.lock();
        loop {
            let should_evict = matches!(entries.front(), Some(front) if front.timestamp_ms < cutoff);
            if !should_evict {
                break;
            }
            let Some(evicted) = entries.pop_front() else { break };
            self.inner.memory_bytes.fetch_sub(estimate_entry_bytes(evicted.data.len()), Ordering::SeqCst);
        }
    }

    /// Clear the buffer and drop all subscribers. The caller is responsible
    /// for cancelling the periodic flush task it spawned alongside this
    /// buffer.
    pub fn destroy(&self) {
        let mut entries = self.inner.entries.lock();
        entries.clear();
        self.inner.memory_bytes.store(0, Ordering::SeqCst);
    }

    /// Run the periodic flush loop forever at `interval`. Intended to be
    /// spawned as its own task.
    pub async fn run_flush(self, interval: std::time::Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.flush(interval.as_millis() as u64);
        }
    }
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
