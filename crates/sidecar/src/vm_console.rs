// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VM console bridge — multiplexes terminal, JSON-RPC, exec, and system
//! frames over a single serial line using 4-byte length-prefixed framing,
//! the same shape `sbx-wire`'s IPC transport uses internally.
//!
//! Replaces the fragile string-prefix multiplexing the source used (a user
//! program echoing a byte sequence that happens to start with a reserved
//! prefix could desynchronize the stream); a length prefix makes frame
//! boundaries unambiguous regardless of payload content (§9 redesign note).
//! Only constructed for the MicroVM backend — local and pod sandboxes reach
//! their sidecar over HTTP/WebSocket directly and never need this bridge.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleFrameKind {
    Terminal,
    Json,
    Exec,
    System,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleFrame {
    pub kind: ConsoleFrameKind,
    pub payload: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleFrameError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame length {0} exceeds max {MAX_FRAME_LEN}")]
    TooLarge(u32),
    #[error("unknown frame kind tag {0}")]
    UnknownKind(u8),
}

fn kind_tag(kind: ConsoleFrameKind) -> u8 {
    match kind {
        ConsoleFrameKind::Terminal => 0,
        ConsoleFrameKind::Json => 1,
        ConsoleFrameKind::Exec => 2,
        ConsoleFrameKind::System => 3,
    }
}

fn tag_kind(tag: u8) -> Result<ConsoleFrameKind, ConsoleFrameError> {
    match tag {
        0 => Ok(ConsoleFrameKind::Terminal),
        1 => Ok(ConsoleFrameKind::Json),
        2 => Ok(ConsoleFrameKind::Exec),
        3 => Ok(ConsoleFrameKind::System),
        other => Err(ConsoleFrameError::UnknownKind(other)),
    }
}

/// Write one frame as `[1-byte kind][4-byte big-endian length][payload]`.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &ConsoleFrame) -> Result<(), ConsoleFrameError> {
    let len = frame.payload.len() as u32;
    if len > MAX_FRAME_LEN {
        return Err(ConsoleFrameError::TooLarge(len));
    }
    writer.write_u8(kind_tag(frame.kind)).await?;
    writer.write_u32(len).await?;
    writer.write_all(&frame.payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame, blocking until the full payload has arrived.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<ConsoleFrame, ConsoleFrameError> {
    let tag = reader.read_u8().await?;
    let kind = tag_kind(tag)?;
    let len = reader.read_u32().await?;
    if len > MAX_FRAME_LEN {
        return Err(ConsoleFrameError::TooLarge(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(ConsoleFrame { kind, payload })
}

#[cfg(test)]
#[path = "vm_console_tests.rs"]
mod tests;
