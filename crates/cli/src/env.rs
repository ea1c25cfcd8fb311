// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sbx` CLI environment access (§6 Configuration's ambient additions).

/// `tracing-subscriber` env-filter directive: `SBX_LOG_LEVEL` takes
/// precedence over the conventional `RUST_LOG`, falling back to `"warn"`
/// so a CLI invocation stays quiet unless asked otherwise.
pub fn log_filter() -> String {
    std::env::var("SBX_LOG_LEVEL")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "warn".to_string())
}
