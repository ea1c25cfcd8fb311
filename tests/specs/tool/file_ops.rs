//! `sbx tool` file, search, and git operations against a scratch workspace.

use crate::prelude::*;

#[test]
fn write_then_read_round_trips() {
    let ws = Workspace::empty();

    ws.tool().args(["write-file", "notes.txt", "line one\nline two\n"]).passes();

    ws.tool().args(["read-file", "notes.txt", "--entire"]).passes().stdout_has("line one").stdout_has("line two");

    assert_eq!(ws.read("notes.txt"), "line one\nline two\n");
}

#[test]
fn delete_missing_file_is_not_an_error() {
    let ws = Workspace::empty();

    ws.tool().args(["delete-file", "gone.txt"]).passes();
}

#[test]
fn search_replace_requires_a_unique_occurrence() {
    let ws = Workspace::empty();
    ws.file("dup.txt", "marker\nmarker\n");

    ws.tool().args(["search-replace", "dup.txt", "marker", "replaced"]).passes().stdout_has("more than once");

    assert_eq!(ws.read("dup.txt"), "marker\nmarker\n");
}

#[test]
fn search_replace_on_a_unique_occurrence_rewrites_the_file() {
    let ws = Workspace::empty();
    ws.file("f.txt", "x\ny\n");

    ws.tool().args(["search-replace", "f.txt", "y", "z"]).passes();

    assert_eq!(ws.read("f.txt"), "x\nz\n");
}

#[test]
fn grep_with_no_matches_still_succeeds() {
    let ws = Workspace::empty();
    ws.file("f.txt", "nothing interesting here\n");

    ws.tool().args(["grep", "needle"]).passes();
}

#[test]
fn grep_finds_matches_across_files() {
    let ws = Workspace::empty();
    ws.file("a.txt", "alpha needle beta\n");
    ws.file("b.txt", "no match\n");

    ws.tool().args(["grep", "needle"]).passes().stdout_has("a.txt");
}

#[test]
fn list_directory_marks_subdirectories() {
    let ws = Workspace::empty();
    ws.file("f.txt", "x");
    ws.dir("sub");

    ws.tool().args(["list-directory", "."]).passes().stdout_has("sub/").stdout_has("f.txt");
}

#[test]
fn git_status_reports_the_checked_out_branch() {
    let ws = Workspace::empty();
    let root = ws.path();
    let run = |args: &[&str]| {
        let status = std::process::Command::new("git").args(args).current_dir(root).status().expect("git spawned");
        assert!(status.success());
    };
    run(&["init", "-b", "main"]);
    run(&["config", "user.email", "fixture@sandbox.invalid"]);
    run(&["config", "user.name", "fixture"]);
    ws.file("a.txt", "x\n");
    run(&["add", "."]);
    run(&["commit", "-m", "initial"]);

    ws.tool().args(["git-status"]).passes().stdout_has("main");
}

#[test]
fn exec_runs_a_shell_command_in_the_workspace() {
    let ws = Workspace::empty();
    ws.file("marker.txt", "x");

    ws.tool().args(["exec", "ls"]).passes().stdout_has("marker.txt");
}
