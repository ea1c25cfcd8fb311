// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed error taxonomy for executor construction and lifecycle-adjacent
//! failures (§7). Tool-level operations never return this type — per the
//! propagation policy, they return a structured wire response with
//! `success: false` instead, so the agent driver can react per-tool.

use sbx_backends::{BackendError, TransportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("no running sandbox/endpoint for this task")]
    NotRunning,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
