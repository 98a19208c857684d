//! CLI binary integration tests using assert_cmd + predicates.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("yang-openapi").expect("binary should exist")
}

/// Module `m`: container `root` with a leaf and a keyed list, plus an RPC.
fn simple_context() -> String {
    serde_json::json!({
        "modules": [{
            "name": "m",
            "namespace": "urn:m",
            "prefix": "m",
            "revision": "2024-01-01",
            "children": [0],
            "rpcs": [4]
        }],
        "nodes": [
            { "kind": "container", "name": "root", "module": "m", "children": [1, 2] },
            { "kind": "leaf", "name": "name", "module": "m", "parent": 0, "type": { "kind": "string" } },
            { "kind": "list", "name": "items", "module": "m", "parent": 0, "keys": ["id"], "children": [3] },
            { "kind": "leaf", "name": "id", "module": "m", "parent": 2, "type": { "kind": "uint32" } },
            { "kind": "rpc", "name": "reset", "module": "m", "children": [5] },
            { "kind": "rpc-input", "name": "input", "module": "m", "parent": 4, "children": [6] },
            { "kind": "leaf", "name": "delay", "module": "m", "parent": 5, "type": { "kind": "uint8" } }
        ]
    })
    .to_string()
}

fn write_context(dir: &TempDir) -> PathBuf {
    let input = dir.path().join("context.json");
    fs::write(&input, simple_context()).unwrap();
    input
}

fn generate_json(args: &[&str]) -> serde_json::Value {
    let dir = TempDir::new().unwrap();
    let input = write_context(&dir);
    let output = cmd()
        .args(["generate", input.to_str().unwrap()])
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("stdout should be valid JSON")
}

// ── Generate to File ────────────────────────────────────────────────────────

#[test]
fn test_generate_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_context(&dir);
    let output = dir.path().join("openapi.json");

    cmd()
        .args(["generate", input.to_str().unwrap()])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let content = fs::read_to_string(&output).expect("output file should exist");
    let doc: serde_json::Value = serde_json::from_str(&content).expect("output should be valid JSON");
    assert!(doc["components"]["schemas"]["m.Root"].is_object());
    assert!(doc["components"]["schemas"]["m.root.Items"].is_object());
    assert!(doc["paths"]["/operations/m:reset/"]["post"].is_object());
}

// ── Generate to Stdout ──────────────────────────────────────────────────────

#[test]
fn test_generate_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_context(&dir);

    cmd()
        .args(["generate", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("/data/m:root/items={id}/"))
        .stdout(predicate::str::contains("\"openapi\": \"3.0.1\""));
}

#[test]
fn test_yaml_format() {
    let dir = TempDir::new().unwrap();
    let input = write_context(&dir);

    cmd()
        .args(["generate", input.to_str().unwrap(), "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("paths:"))
        .stdout(predicate::str::contains("/data/m:root/"))
        .stdout(predicate::str::starts_with("{").not());
}

// ── Option Flags ────────────────────────────────────────────────────────────

#[test]
fn test_read_only_flag() {
    let doc = generate_json(&["--read-only"]);
    for (path, item) in doc["paths"].as_object().unwrap() {
        if path.starts_with("/data/") {
            assert!(item.get("put").is_none(), "{path} should be GET-only");
            assert!(item.get("get").is_some());
        }
    }
}

#[test]
fn test_elements_flag() {
    let doc = generate_json(&["--elements", "data"]);
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.keys().all(|p| p.starts_with("/data/")));
    assert!(!paths.is_empty());
}

#[test]
fn test_path_style_flag() {
    let doc = generate_json(&["--path-style", "odl"]);
    assert!(doc["paths"]["/data/m:root/m:items/{id}/"].is_object());
}

#[test]
fn test_tag_level_flag() {
    let doc = generate_json(&["--tag-level", "1"]);
    assert_eq!(
        doc["paths"]["/data/m:root/items={id}/"]["get"]["tags"],
        serde_json::json!(["Root", "m"])
    );
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write_context(&dir);
    let config = dir.path().join("options.json");
    fs::write(
        &config,
        serde_json::json!({ "max-depth": 1, "elements": ["data"], "version": "9.9.9" }).to_string(),
    )
    .unwrap();

    let output = cmd()
        .args(["generate", input.to_str().unwrap()])
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let doc: serde_json::Value = serde_json::from_slice(&output).unwrap();

    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/data/m:root/"]);
    assert_eq!(doc["info"]["version"], serde_json::json!("9.9.9"));
}

// ── Modules ─────────────────────────────────────────────────────────────────

#[test]
fn test_modules_listing() {
    let dir = TempDir::new().unwrap();
    let input = write_context(&dir);

    cmd()
        .args(["modules", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("m@2024-01-01\turn:m"));
}

// ── Invalid Input ───────────────────────────────────────────────────────────

#[test]
fn test_invalid_input() {
    cmd()
        .args(["generate", "/nonexistent/path/context.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read schema context"));
}

#[test]
fn test_malformed_context() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("context.json");
    fs::write(&input, "{ \"modules\": 5 }").unwrap();

    cmd()
        .args(["generate", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load schema context"));
}

#[test]
fn test_unknown_module() {
    let dir = TempDir::new().unwrap();
    let input = write_context(&dir);

    cmd()
        .args(["generate", input.to_str().unwrap(), "--module", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Generation failed"));
}

// ── Help Output ─────────────────────────────────────────────────────────────

#[test]
fn test_help_output() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("modules"));
}

#[test]
fn test_generate_help() {
    cmd()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--path-style"))
        .stdout(predicate::str::contains("--read-only"))
        .stdout(predicate::str::contains("--config"));
}
