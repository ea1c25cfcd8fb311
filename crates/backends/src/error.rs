// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed error taxonomy for backend/lifecycle/transport failures (§7).

use thiserror::Error;

/// Transport-level classification used by both the retry loop and the
/// circuit breaker (§4.4's error taxonomy table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Network,
    Timeout,
    Server,
    Client,
    CircuitBreakerOpen,
    Unknown,
}

impl TransportErrorKind {
    /// Whether this class of error is eligible for the retry loop.
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::Client | Self::CircuitBreakerOpen)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error contacting sidecar: {0}")]
    Network(String),
    #[error("sidecar request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("sidecar returned server error {status}: {body}")]
    Server { status: u16, body: String },
    #[error("sidecar rejected request ({status}): {body}")]
    Client { status: u16, body: String },
    #[error("circuit breaker open for task, cooldown has not elapsed")]
    CircuitBreakerOpen,
    #[error("unclassified transport error: {0}")]
    Unknown(String),
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Network(_) => TransportErrorKind::Network,
            Self::Timeout(_) => TransportErrorKind::Timeout,
            Self::Server { .. } => TransportErrorKind::Server,
            Self::Client { .. } => TransportErrorKind::Client,
            Self::CircuitBreakerOpen => TransportErrorKind::CircuitBreakerOpen,
            Self::Unknown(_) => TransportErrorKind::Unknown,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Lifecycle-level errors surfaced by `WorkspaceManager` operations (§4.2, §7).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no credential available for code host")]
    AuthMissing,
    #[error("clone failed: {0}")]
    CloneFailed(String),
    #[error("sandbox did not become ready within the boot deadline")]
    BootTimeout,
    #[error("backend infrastructure error: {0}")]
    Infra(String),
    #[error("no running sandbox/endpoint for this task")]
    NotRunning,
    #[error("no sandbox registered for task {0}")]
    NotFound(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
