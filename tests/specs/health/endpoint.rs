//! `sbx health` against both the `Local` backend and a real `sbxd` sidecar.

use crate::prelude::*;
use std::net::TcpListener;

#[test]
fn local_health_check_reports_no_sandbox_registered() {
    let (_root_guard, root) = scratch_workspace_root();

    cli()
        .env("SBX_WORKSPACE_ROOT", root.display().to_string())
        .args(["health", "local", "--task-id", "task-never-existed"])
        .passes()
        .stdout_has("\"healthy\": false");
}

/// A `Local` sandbox freshly prepared in the *same* process reports healthy.
/// The CLI's `sandbox prepare` and `health local` each spin up their own
/// `LocalWorkspaceManager`, so this only reaches "ready" because readiness
/// also depends on nothing but the clone having succeeded on disk — the
/// registry entry itself, like everywhere else in this one-shot CLI, does
/// not survive past process exit.
#[test]
fn endpoint_health_check_survives_a_slow_sidecar_startup_via_client_retries() {
    let port = free_port();
    let workspace = tempfile::tempdir().expect("tempdir");

    let mut child = SidecarProcess::spawn(port, workspace.path());

    cli()
        .args(["health", "endpoint", "--task-id", "task-sidecar-1", "--url", &format!("http://127.0.0.1:{port}"), "--format", "json"])
        .passes()
        .stdout_has("\"healthy\": true");

    child.kill();
}

#[test]
fn endpoint_health_check_reports_an_unreachable_sidecar_as_unhealthy_not_a_cli_error() {
    cli()
        .args(["health", "endpoint", "--task-id", "task-unreachable", "--url", "http://127.0.0.1:1", "--format", "json"])
        .passes()
        .stdout_has("\"healthy\": false");
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port").local_addr().expect("local addr").port()
}

struct SidecarProcess(std::process::Child);

impl SidecarProcess {
    fn spawn(port: u16, workspace_dir: &std::path::Path) -> Self {
        let binary = assert_cmd::cargo::cargo_bin("sbxd");
        let child = std::process::Command::new(binary)
            .env("PORT", port.to_string())
            .env("WORKSPACE_DIR", workspace_dir.display().to_string())
            .env("LOG_LEVEL", "error")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .expect("sbxd spawned");
        Self(child)
    }

    fn kill(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

impl Drop for SidecarProcess {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}
