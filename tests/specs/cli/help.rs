//! `sbx --help` and per-subcommand help output.

use crate::prelude::*;

#[test]
fn sbx_without_a_subcommand_fails_with_usage() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn sbx_help_shows_usage() {
    cli().args(["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn sbx_version_shows_the_crate_version() {
    cli().args(["--version"]).passes().stdout_has("0.2");
}

#[test]
fn sandbox_help_lists_subcommands() {
    cli().args(["sandbox", "--help"]).passes().stdout_has("prepare").stdout_has("status").stdout_has("cleanup");
}

#[test]
fn tool_help_lists_subcommands() {
    cli()
        .args(["tool", "--help"])
        .passes()
        .stdout_has("read-file")
        .stdout_has("write-file")
        .stdout_has("search-replace")
        .stdout_has("grep")
        .stdout_has("git-diff");
}

#[test]
fn health_help_lists_subcommands() {
    cli().args(["health", "--help"]).passes().stdout_has("endpoint").stdout_has("local");
}
