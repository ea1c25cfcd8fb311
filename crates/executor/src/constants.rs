// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed constants every `ToolExecutor` implementation must reproduce
//! identically (§4.3).

use std::time::Duration;

/// Default line-range window for `readFile(entire=false)`.
pub const MAX_LINES_PER_READ: u32 = 150;

/// `grepSearch` passes `--max-count` with this value to the search tool.
/// Match content truncation and the result cap itself are
/// [`sbx_core::MAX_MATCH_CONTENT_LEN`] / [`sbx_core::MAX_GREP_MATCHES`].
pub const GREP_MAX_COUNT: u32 = sbx_core::MAX_GREP_MATCHES as u32;

/// `searchFiles` caps its result list at this size.
pub const MAX_FILE_SEARCH_RESULTS: usize = sbx_wire::MAX_FILE_SEARCH_RESULTS;

/// Directories skipped by `listDirectoryRecursive`.
pub const RECURSIVE_LIST_IGNORE: &[&str] = &["node_modules", ".git", ".next", ".turbo", "dist", "build"];

/// Default `executeCommand` timeout when the caller doesn't specify one.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
