// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP-facing error mapping for the sidecar (§4.5: validation → 400, missing
//! resource → 404, unexpected fault → 500, all with a sanitized message and a
//! stable [`ErrorCode`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sbx_wire::ErrorCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("{0}")]
    Validation(String),
    #[error("path traversal detected")]
    PathTraversal,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    error: ErrorCode,
}

impl IntoResponse for SidecarError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            SidecarError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationError, msg.clone()),
            SidecarError::PathTraversal => (StatusCode::BAD_REQUEST, ErrorCode::SecurityError, "Path traversal detected".to_string()),
            SidecarError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone()),
            SidecarError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError, msg.clone()),
        };
        (status, Json(ErrorBody { success: false, message, error: code })).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
