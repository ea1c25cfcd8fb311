// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream socket channel — a persistent WebSocket to the control plane,
//! joined by `taskId`, carrying `fs-change` events and periodic heartbeats
//! (§4.8). Reconnects with a capped exponential backoff identical in shape
//! to [`sbx_backends::SidecarClient`]'s RPC retry delay; losing this channel
//! never affects HTTP RPC, so failures here are logged and retried, never
//! propagated.

use futures_util::{SinkExt, StreamExt};
use sbx_wire::stream::{ControlFrame, UpstreamFrame};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SocketConfig {
    pub url: String,
    pub task_id: String,
    pub heartbeat_interval: Duration,
    pub max_reconnect_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

/// Exponential backoff capped at `max_delay`, doubling per attempt —
/// the same formula `SidecarClient` uses for RPC retries.
pub fn reconnect_delay(config: &SocketConfig, attempt: u32) -> Duration {
    let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
    config.base_delay.saturating_mul(multiplier).min(config.max_delay)
}

pub struct SocketClient {
    config: SocketConfig,
    outbound: mpsc::UnboundedSender<UpstreamFrame>,
    outbound_rx: parking_lot::Mutex<Option<mpsc::UnboundedReceiver<UpstreamFrame>>>,
}

impl SocketClient {
    pub fn new(config: SocketConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { config, outbound: tx, outbound_rx: parking_lot::Mutex::new(Some(rx)) }
    }

    /// Queue an `fs-change` frame for delivery. Best-effort: if the channel
    /// is currently disconnected the frame is dropped, never blocking the
    /// watcher that produced it.
    pub fn send_fs_change(&self, event: sbx_core::FileSystemEvent) {
        let _ = self.outbound.send(UpstreamFrame::FsChange { event });
    }

    fn send_heartbeat(&self, epoch_ms: u64) {
        let _ = self.outbound.send(UpstreamFrame::Heartbeat { epoch_ms });
    }

    /// Run the connect/reconnect loop forever, up to `max_reconnect_attempts`
    /// consecutive failures, after which the channel gives up permanently
    /// (HTTP RPC is unaffected either way).
    pub async fn run<C: sbx_core::Clock + 'static>(&self, clock: C) {
        let mut rx = match self.outbound_rx.lock().take() {
            Some(rx) => rx,
            None => {
                warn!("socket client run() called more than once");
                return;
            }
        };

        let mut attempt = 0u32;
        loop {
            match self.connect_and_serve(&mut rx, &clock).await {
                Ok(()) => {
                    attempt = 0;
                }
                Err(e) => {
                    attempt += 1;
                    warn!(attempt, error = %e, "upstream socket disconnected");
                    if attempt >= self.config.max_reconnect_attempts {
                        warn!("upstream socket giving up after max reconnect attempts; HTTP RPC unaffected");
                        return;
                    }
                    tokio::time::sleep(reconnect_delay(&self.config, attempt)).await;
                }
            }
        }
    }

    async fn connect_and_serve<C: sbx_core::Clock>(&self, rx: &mut mpsc::UnboundedReceiver<UpstreamFrame>, clock: &C) -> Result<(), String> {
        let (ws, _) = tokio_tungstenite::connect_async(&self.config.url).await.map_err(|e| e.to_string())?;
        info!(task_id = %self.config.task_id, "upstream socket connected");
        let (mut write, mut read) = ws.split();

        let join = ControlFrame::JoinTask { task_id: self.config.task_id.clone() };
        let join_json = serde_json::to_string(&join).map_err(|e| e.to_string())?;
        write.send(Message::Text(join_json.into())).await.map_err(|e| e.to_string())?;

        let mut heartbeat = tokio::time::interval(self.config.heartbeat_interval);
        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else { return Ok(()) };
                    let json = serde_json::to_string(&frame).map_err(|e| e.to_string())?;
                    write.send(Message::Text(json.into())).await.map_err(|e| e.to_string())?;
                }
                _ = heartbeat.tick() => {
                    self.send_heartbeat(clock.epoch_ms());
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => self.handle_control_frame(&text),
                        Some(Ok(Message::Close(_))) | None => return Err("connection closed by peer".to_string()),
                        Some(Err(e)) => return Err(e.to_string()),
                        _ => {}
                    }
                }
            }
        }
    }

    fn handle_control_frame(&self, text: &str) {
        match serde_json::from_str::<ControlFrame>(text) {
            Ok(ControlFrame::ConfigUpdate { debounce_ms }) => {
                info!(?debounce_ms, "received config-update from control plane");
            }
            Ok(ControlFrame::JoinTask { task_id }) => {
                info!(task_id, "control plane acknowledged join-task");
            }
            Err(e) => warn!(error = %e, "ignoring malformed control frame"),
        }
    }
}

#[cfg(test)]
#[path = "socket_tests.rs"]
mod tests;
