// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame types for the sidecar-to-control-plane upstream streaming channel
//! (§4.8, §6). One JSON frame per WebSocket text message.

use sbx_core::FileSystemEvent;
use serde::{Deserialize, Serialize};

/// Sidecar -> control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UpstreamFrame {
    FsChange { event: FileSystemEvent },
    Heartbeat { epoch_ms: u64 },
}

/// Control plane -> sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlFrame {
    ConfigUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        debounce_ms: Option<u64>,
    },
    JoinTask { task_id: String },
}
