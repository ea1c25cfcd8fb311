// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `searchFiles`/`grepSearch` request/response shapes (§4.3, §6).

use sbx_core::GrepMatch;
use serde::{Deserialize, Serialize};

/// `POST /search/grep` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_pattern: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepResponse {
    pub success: bool,
    /// `file:line:content` strings, for callers that don't need structure.
    pub matches: Vec<String>,
    pub detailed_matches: Vec<GrepMatch>,
    pub match_count: usize,
    pub message: String,
}

/// `POST /search/files` body — name-glob search, capped at `MAX_FILE_SEARCH_RESULTS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSearchRequest {
    pub query: String,
    #[serde(default)]
    pub target_dirs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSearchResponse {
    pub success: bool,
    pub paths: Vec<String>,
    pub message: String,
}

/// Results are capped at this value (§4.3 "File search ... results capped (<=10)").
pub const MAX_FILE_SEARCH_RESULTS: usize = 10;
