// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn endpoint_reports_healthy_sidecar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "healthy": true,
            "message": "ok",
        })))
        .mount(&server)
        .await;

    endpoint("task-1".to_string(), server.uri(), OutputFormat::Json).await.unwrap();
}

#[tokio::test]
async fn endpoint_reports_transport_failure_as_unhealthy_not_an_error() {
    // A transport-level failure never bubbles up as a CLI error — it's
    // rendered as an unhealthy result, matching §7's propagation policy
    // (tool-facing failures are structured results, not exceptions).
    endpoint("task-1".to_string(), "http://127.0.0.1:1".to_string(), OutputFormat::Text).await.unwrap();
}

#[tokio::test]
async fn local_reports_absent_sandbox_as_unhealthy() {
    local("task-unknown".to_string(), OutputFormat::Json).await.unwrap();
}

#[test]
fn render_colors_by_healthy_flag() {
    std::env::set_var("NO_COLOR", "1");
    assert_eq!(render("t", true, "ok"), "t: healthy — ok");
    assert_eq!(render("t", false, "down"), "t: unhealthy — down");
}
