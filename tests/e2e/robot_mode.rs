//! Robot-mode end-to-end tests.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

use crate::common::fixtures::TestWorkspace;
use crate::common::init_test_logging;

/// `gallery --robot --data-dir <ws>/gallery` with a config path that does not
/// exist, so the user's real config never leaks into the test.
fn gallery(ws: &TestWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("gallery").unwrap();
    cmd.env_remove("GALLERY_CONFIG")
        .env_remove("GALLERY_MODE")
        .env_remove("GALLERY_FORMAT")
        .env("RUST_LOG", "off")
        .arg("--robot")
        .arg("--data-dir")
        .arg(ws.data_dir())
        .arg("--config")
        .arg(ws.config_file(""));
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|_| panic!("not JSON: {}", String::from_utf8_lossy(&output.stdout)))
}

#[test]
fn quick_start_outputs_json() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let json = stdout_json(&mut gallery(&ws));
    assert_eq!(json["tool"], "gallery");
    assert!(json.get("commands").is_some());
    assert!(json.get("output_modes").is_some());
}

#[test]
fn empty_gallery_lists_nothing() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let json = stdout_json(gallery(&ws).arg("list"));
    assert_eq!(json["count"], 0);
    assert_eq!(json["mode"], "native");
    assert_eq!(json["photos"], Value::Array(Vec::new()));
}

#[test]
fn capture_list_delete_cycle() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let first = ws.source_image("first.png", [255, 0, 0]);
    let second = ws.source_image("second.png", [0, 0, 255]);

    let a = stdout_json(gallery(&ws).arg("capture").arg(&first));
    let b = stdout_json(gallery(&ws).arg("capture").arg(&second).args(["--quality", "50"]));
    let a_path = a["captured"]["filepath"].as_str().unwrap().to_string();
    let b_path = b["captured"]["filepath"].as_str().unwrap().to_string();
    assert!(a_path.starts_with("file://"));
    let scratch = ws.data_dir().join("scratch");
    assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);

    let listed = stdout_json(gallery(&ws).arg("list"));
    assert_eq!(listed["count"], 2);
    assert_eq!(listed["photos"][0]["filepath"], b_path.as_str());
    assert_eq!(listed["photos"][1]["filepath"], a_path.as_str());

    let deleted = stdout_json(gallery(&ws).arg("delete").arg(&a_path));
    assert_eq!(deleted["deleted"], a_path.as_str());

    let listed = stdout_json(gallery(&ws).arg("list"));
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["photos"][0]["filepath"], b_path.as_str());
}

#[test]
fn web_mode_list_inline_only_on_request() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let source = ws.source_image("web.png", [10, 10, 10]);
    stdout_json(gallery(&ws).args(["--mode", "web", "capture"]).arg(&source));

    let plain = stdout_json(gallery(&ws).args(["--mode", "web", "list"]));
    assert_eq!(plain["mode"], "web");
    assert!(plain["photos"][0].get("inlineContent").is_none());

    let inline = stdout_json(gallery(&ws).args(["--mode", "web", "list", "--inline"]));
    let content = inline["photos"][0]["inlineContent"].as_str().unwrap();
    assert!(content.starts_with("data:image/jpeg;base64,"));
}

#[test]
fn show_unknown_record_fails_with_json_error() {
    init_test_logging();
    let ws = TestWorkspace::new();
    gallery(&ws)
        .args(["show", "nope.jpeg"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("\"error\": true"))
        .stderr(predicate::str::contains("gallery list"));
}

#[test]
fn capture_of_missing_source_fails() {
    init_test_logging();
    let ws = TestWorkspace::new();
    gallery(&ws)
        .args(["capture", "does-not-exist.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Capture source not found"));
}

#[test]
fn reconcile_reports_clean_gallery() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let source = ws.source_image("one.png", [1, 2, 3]);
    stdout_json(gallery(&ws).arg("capture").arg(&source));

    let report = stdout_json(gallery(&ws).arg("reconcile"));
    assert_eq!(report["clean"], true);
    assert_eq!(report["checked"], 1);
    assert_eq!(report["orphaned"], Value::Array(Vec::new()));
}

#[test]
fn compact_format_is_single_line() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let output = gallery(&ws)
        .args(["--format", "json-compact", "version"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.trim().lines().count(), 1);
    let json: Value = serde_json::from_str(text.trim()).unwrap();
    assert!(json.get("version").is_some());
}

#[test]
fn config_reports_overrides() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let json = stdout_json(gallery(&ws).args(["--mode", "web", "config"]));
    assert_eq!(json["config"]["mode"], "web");
    assert_eq!(json["config"]["storage_key"], "photos");
}

#[test]
fn explicit_missing_config_is_an_error() {
    init_test_logging();
    let ws = TestWorkspace::new();
    Command::cargo_bin("gallery")
        .unwrap()
        .env("RUST_LOG", "off")
        .arg("--robot")
        .arg("--config")
        .arg(ws.path().join("missing.toml"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}
