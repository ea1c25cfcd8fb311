// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of typed error codes the sidecar returns in `error` fields.
//!
//! Matches §6/§7's taxonomy: every failure response carries one of these
//! alongside `success: false` and a human `message`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    SecurityError,
    FileNotFound,
    EmptyOldString,
    IdenticalStrings,
    TextNotFound,
    TextNotUnique,
    CloneFailed,
    CommandFailed,
    NotFound,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::SecurityError => "SECURITY_ERROR",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::EmptyOldString => "EMPTY_OLD_STRING",
            Self::IdenticalStrings => "IDENTICAL_STRINGS",
            Self::TextNotFound => "TEXT_NOT_FOUND",
            Self::TextNotUnique => "TEXT_NOT_UNIQUE",
            Self::CloneFailed => "CLONE_FAILED",
            Self::CommandFailed => "COMMAND_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{s}")
    }
}
