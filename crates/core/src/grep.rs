// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grepSearch` result types.

use serde::{Deserialize, Serialize};

/// Matches are truncated to this many characters before being returned.
pub const MAX_MATCH_CONTENT_LEN: usize = 250;

/// Ripgrep caps result count at this value via `--max-count`.
pub const MAX_GREP_MATCHES: usize = 50;

/// One `file:line:content` match, content already truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepMatch {
    /// Absolute path to the matched file.
    pub file: String,
    pub line_number: u32,
    pub content: String,
}

impl GrepMatch {
    /// Construct a match, truncating `content` to [`MAX_MATCH_CONTENT_LEN`]
    /// (inclusive of the trailing `"..."` appended when truncation happens).
    /// `file` must already be an absolute path.
    pub fn new(file: impl Into<String>, line_number: u32, content: &str) -> Self {
        let mut chars = content.chars();
        let head: String = chars.by_ref().take(MAX_MATCH_CONTENT_LEN).collect();
        let content = if chars.next().is_some() {
            let keep = MAX_MATCH_CONTENT_LEN.saturating_sub(3);
            format!("{}...", head.chars().take(keep).collect::<String>())
        } else {
            head
        };
        Self { file: file.into(), line_number, content }
    }
}

#[cfg(test)]
#[path = "grep_tests.rs"]
mod tests;
