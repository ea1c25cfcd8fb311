//! Path confinement: every `sbx tool` file operation stays inside the workspace root.

use crate::prelude::*;

#[test]
fn read_file_rejects_a_relative_escape() {
    let ws = Workspace::empty();

    ws.tool().args(["read-file", "../../etc/passwd", "--entire"]).passes().stdout_has("Path traversal detected");
}

#[test]
fn write_file_rejects_a_relative_escape() {
    let ws = Workspace::empty();

    ws.tool().args(["write-file", "../outside.txt", "x"]).passes().stdout_has("Path traversal detected");

    assert!(!ws.path().parent().expect("workspace has a parent").join("outside.txt").exists());
}

/// A leading `/` is stripped before joining to the workspace root, so an
/// "absolute" path never actually escapes — it is just treated as relative.
#[test]
fn an_absolute_looking_path_is_confined_to_the_workspace_not_escaped() {
    let ws = Workspace::empty();

    ws.tool().args(["search-replace", "/etc/passwd", "root", "nobody"]).passes().stdout_has("file not found");
}
