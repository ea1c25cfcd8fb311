// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the sidecar binary, matching
//! `sbx_backends::env`'s one-function-per-setting shape (§6 Configuration).

use std::time::Duration;

/// HTTP port the sidecar listens on.
pub fn port() -> u16 {
    std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080)
}

/// Root of the cloned repository this sidecar serves.
pub fn workspace_dir() -> String {
    std::env::var("WORKSPACE_DIR").unwrap_or_else(|_| "/workspace".to_string())
}

/// `tracing-subscriber` env-filter directive.
pub fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

/// Upper bound on a single `writeFile` body, rejected above this with a
/// validation error rather than exhausting sidecar memory.
pub fn max_file_size_mb() -> u64 {
    std::env::var("MAX_FILE_SIZE_MB").ok().and_then(|v| v.parse().ok()).unwrap_or(10)
}

/// Default foreground command timeout.
pub fn command_timeout_ms() -> u64 {
    std::env::var("COMMAND_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(30_000)
}

/// Rate-limit window, requests-per-window (0 disables limiting).
pub fn rate_limit_requests() -> u32 {
    std::env::var("RATE_LIMIT_REQUESTS").ok().and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Rate-limit window size.
pub fn rate_limit_window_ms() -> u64 {
    std::env::var("RATE_LIMIT_WINDOW_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(60_000)
}

/// Allowed CORS origin (`*` by default; sidecars typically sit behind a
/// private network boundary already).
pub fn cors_origin() -> String {
    std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string())
}

/// `taskId` this sidecar instance is bound to, used for the upstream socket
/// room join and terminal/watcher log tagging.
pub fn task_id() -> Option<String> {
    std::env::var("SBX_TASK_ID").ok().filter(|s| !s.is_empty())
}

/// Control-plane WebSocket URL to join on startup (omitted in standalone/dev
/// runs, where the upstream channel simply never connects).
pub fn upstream_url() -> Option<String> {
    std::env::var("SBX_UPSTREAM_URL").ok().filter(|s| !s.is_empty())
}

/// Debounce window for the filesystem watcher.
pub fn watcher_debounce_ms() -> u64 {
    std::env::var("SBX_WATCHER_DEBOUNCE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(100)
}

/// TerminalBuffer entry cap.
pub fn terminal_max_entries() -> usize {
    std::env::var("SBX_TERMINAL_MAX_ENTRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(5_000)
}

/// TerminalBuffer memory cap in bytes.
pub fn terminal_max_memory_bytes() -> usize {
    std::env::var("SBX_TERMINAL_MAX_MEMORY_BYTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8 * 1024 * 1024)
}

/// Fraction of `terminal_max_entries`/`terminal_max_memory_bytes` at which
/// admission starts rejecting new entries.
pub fn terminal_backpressure_threshold() -> f64 {
    std::env::var("SBX_TERMINAL_BACKPRESSURE_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(0.8)
}

/// TerminalBuffer periodic flush interval; entries older than
/// `2 * flush_interval` are dropped on each tick.
pub fn terminal_flush_interval() -> Duration {
    std::env::var("SBX_TERMINAL_FLUSH_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Upstream heartbeat cadence.
pub fn heartbeat_interval() -> Duration {
    std::env::var("SBX_HEARTBEAT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(15))
}

/// Max consecutive reconnect attempts before the upstream channel gives up
/// for good (HTTP RPC keeps working regardless, per §4.8).
pub fn upstream_max_reconnect_attempts() -> u32 {
    std::env::var("SBX_UPSTREAM_MAX_RECONNECT").ok().and_then(|v| v.parse().ok()).unwrap_or(10)
}

/// Base delay for the upstream channel's capped exponential backoff.
pub fn upstream_reconnect_base_delay() -> Duration {
    std::env::var("SBX_UPSTREAM_RECONNECT_BASE_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(500))
}

/// Cap on the upstream channel's backoff delay.
pub fn upstream_reconnect_max_delay() -> Duration {
    std::env::var("SBX_UPSTREAM_RECONNECT_MAX_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Default identity applied to commits made inside the sandbox when the
/// caller doesn't supply one explicitly.
pub fn default_commit_name() -> String {
    std::env::var("SBX_DEFAULT_COMMIT_NAME").unwrap_or_else(|_| "sbx-agent".to_string())
}

pub fn default_commit_email() -> String {
    std::env::var("SBX_DEFAULT_COMMIT_EMAIL").unwrap_or_else(|_| "sbx-agent@users.noreply.local".to_string())
}
