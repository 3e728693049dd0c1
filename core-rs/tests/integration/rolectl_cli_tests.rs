//! Integration tests for the rolectl binary
//!
//! Drives the CLI end to end against a temporary store.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn rolectl(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rolectl"))
        .arg("--store")
        .arg(store)
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run rolectl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_cli_version_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_rolectl"))
        .arg("--version")
        .output()
        .expect("Failed to run rolectl --version");

    assert!(output.status.success(), "rolectl --version failed");
    assert!(stdout(&output).contains("rolectl"));
}

#[test]
fn test_cli_create_show_and_edit() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("roles.json");

    let output = rolectl(&store, &["create", "Sales Manager", "--description", "sales lead"]);
    assert!(output.status.success(), "create failed: {}", stderr(&output));
    assert!(stdout(&output).contains("sales_manager"));

    let output = rolectl(&store, &["caps", "set", "sales_manager", "read", "edit_posts", "haxx0r"]);
    assert!(output.status.success(), "caps set failed: {}", stderr(&output));
    assert!(stderr(&output).contains("haxx0r"));

    let output = rolectl(&store, &["caps", "set", "sales_manager", "read"]);
    assert!(output.status.success());

    let output = rolectl(&store, &["show", "sales_manager", "--json"]);
    assert!(output.status.success());
    let role: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(role["key"], "sales_manager");
    assert_eq!(role["displayName"], "Sales lead");
    assert_eq!(role["capabilities"], serde_json::json!(["read"]));

    let output = rolectl(&store, &["rename", "sales_manager", "Revenue Lead"]);
    assert!(output.status.success());
    let output = rolectl(&store, &["list"]);
    assert!(stdout(&output).contains("Revenue Lead"));
    assert!(stdout(&output).contains("sales_manager"));
}

#[test]
fn test_cli_duplicate_create_fails() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("roles.json");

    assert!(rolectl(&store, &["create", "Editor"]).status.success());
    let output = rolectl(&store, &["create", "editor"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Role already exists: editor"));
}

#[test]
fn test_cli_delete_missing_fails() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("roles.json");

    let output = rolectl(&store, &["delete", "ghost"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Role not found: ghost"));
}

#[test]
fn test_cli_export_import_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("roles.json");
    let export_file = temp_dir.path().join("export.json");

    assert!(rolectl(&store, &["create", "Editor"]).status.success());
    assert!(rolectl(&store, &["caps", "grant", "editor", "publish_posts"]).status.success());

    let output = rolectl(&store, &["export", "--output", export_file.to_str().unwrap()]);
    assert!(output.status.success(), "export failed: {}", stderr(&output));

    let other_store = temp_dir.path().join("other.json");
    let output = rolectl(&other_store, &["import", export_file.to_str().unwrap()]);
    assert!(output.status.success(), "import failed: {}", stderr(&output));
    assert!(stdout(&output).contains("1 created, 0 overwritten"));

    let original = stdout(&rolectl(&store, &["export"]));
    let copied = stdout(&rolectl(&other_store, &["export"]));
    assert_eq!(original, copied);
}

#[test]
fn test_cli_import_atomic_failure_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("roles.json");
    let doc = temp_dir.path().join("doc.json");
    fs::write(
        &doc,
        r#"{"guest": {"name": "Guest", "capabilities": {}}, "broken": {"name": "Broken"}}"#,
    )
    .unwrap();

    let output = rolectl(&store, &["import", doc.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("broken"));
    assert!(!store.exists());

    let output = rolectl(&store, &["import", doc.to_str().unwrap(), "--best-effort"]);
    assert!(!output.status.success(), "failed entries still produce a non-zero exit");
    assert!(stdout(&output).contains("1 created"));
    assert!(stdout(&rolectl(&store, &["list"])).contains("guest"));
}

#[test]
fn test_cli_import_skips_non_role_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("roles.json");
    let doc = temp_dir.path().join("doc.json");
    fs::write(
        &doc,
        r#"{"$schema": "https://example.com/roles.json", "editor": {"name": "Editor", "capabilities": {"read": true}}}"#,
    )
    .unwrap();

    let output = rolectl(&store, &["import", doc.to_str().unwrap()]);
    assert!(output.status.success(), "import failed: {}", stderr(&output));
    assert!(stderr(&output).contains("$schema"));
    assert!(stdout(&output).contains("1 created"));
}

#[test]
fn test_cli_best_effort_with_every_entry_failing() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("roles.json");
    let doc = temp_dir.path().join("doc.json");
    fs::write(&doc, r#"{"bad": {"name": "B"}}"#).unwrap();

    let output = rolectl(&store, &["import", doc.to_str().unwrap(), "--best-effort"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no roles were changed"));
    assert!(!stdout(&output).contains("Imported roles"));
    assert!(!store.exists());
}

#[test]
fn test_cli_show_groups_capabilities_by_category() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("roles.json");

    assert!(rolectl(&store, &["create", "Editor"]).status.success());
    assert!(rolectl(&store, &["caps", "set", "editor", "read", "list_users"]).status.success());

    let output = rolectl(&store, &["show", "editor"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("(Post Management)"));
    assert!(out.contains("(User Management)"));
}

#[test]
fn test_cli_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let output = rolectl(&temp_dir.path().join("roles.json"), &["catalog"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Post Management"));
    assert!(out.contains("create_users"));
}
