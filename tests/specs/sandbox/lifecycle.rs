//! `sbx sandbox prepare/status/cleanup` against the `Local` backend.

use crate::prelude::*;

#[test]
fn prepare_clones_the_repo_and_checks_out_the_shadow_branch() {
    let repo = GitRepo::init();
    let (_root_guard, root) = scratch_workspace_root();

    cli()
        .env("SBX_WORKSPACE_ROOT", root.display().to_string())
        .args([
            "sandbox",
            "prepare",
            "--task-id",
            "task-lifecycle-1",
            "--repo-url",
            &repo.url(),
            "--repo-full-name",
            "acme/demo",
            "--shadow-branch",
            "agent/task-lifecycle-1",
            "--user-id",
            "user-1",
            "--mode",
            "local",
        ])
        .passes()
        .stdout_has("sandbox ready");

    let workspace_dir = root.join("task-lifecycle-1");
    assert!(workspace_dir.join("README.md").exists());
}

/// Each CLI invocation is its own process, so a `Local` sandbox's in-memory
/// registry never survives between commands — a fresh `status` call reports
/// the sandbox absent even though `prepare` already cloned it to disk.
#[test]
fn status_in_a_fresh_process_reports_absent_after_prepare() {
    let repo = GitRepo::init();
    let (_root_guard, root) = scratch_workspace_root();

    cli()
        .env("SBX_WORKSPACE_ROOT", root.display().to_string())
        .args([
            "sandbox",
            "prepare",
            "--task-id",
            "task-lifecycle-2",
            "--repo-url",
            &repo.url(),
            "--repo-full-name",
            "acme/demo",
            "--shadow-branch",
            "agent/task-lifecycle-2",
            "--user-id",
            "user-1",
            "--mode",
            "local",
        ])
        .passes();

    cli()
        .env("SBX_WORKSPACE_ROOT", root.display().to_string())
        .args(["sandbox", "status", "--task-id", "task-lifecycle-2", "--mode", "local"])
        .passes()
        .stdout_has("absent");
}

#[test]
fn cleanup_on_an_unknown_task_is_idempotent() {
    let (_root_guard, root) = scratch_workspace_root();

    for _ in 0..2 {
        cli()
            .env("SBX_WORKSPACE_ROOT", root.display().to_string())
            .args(["sandbox", "cleanup", "--task-id", "task-never-existed", "--mode", "local"])
            .passes()
            .stdout_has("cleaned up");
    }
}

#[test]
fn prepare_against_an_unreachable_repo_fails_with_a_clone_error() {
    let (_root_guard, root) = scratch_workspace_root();

    cli()
        .env("SBX_WORKSPACE_ROOT", root.display().to_string())
        .args([
            "sandbox",
            "prepare",
            "--task-id",
            "task-bad-repo",
            "--repo-url",
            "/nonexistent/repo/path",
            "--repo-full-name",
            "acme/demo",
            "--shadow-branch",
            "agent/task-bad-repo",
            "--user-id",
            "user-1",
            "--mode",
            "local",
        ])
        .fails();
}
