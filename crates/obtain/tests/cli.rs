// ABOUTME: Integration tests for the obtain CLI binary.
// ABOUTME: Runs job lists against HTML files and checks the JSON output and exit codes.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn obtain_cmd() -> Command {
    Command::cargo_bin("obtain").unwrap()
}

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Minutes</title></head>
<body>
<h1>REGULAR MEETING MINUTES</h1>
<p class="date">Posted: Tuesday, March 3, 2020</p>
<div id="body"><p>Call to order.</p><p>Roll call.</p></div>
</body>
</html>"#;

const JOBS: &str = r##"[
    {"field": "title", "kind": "title", "rules": [
        {"method": "pluck_selector", "arguments": ["h1"]}
    ]},
    {"field": "date", "kind": "date", "rules": [
        {"method": "not_a_rule", "arguments": []},
        {"method": "pluck_selector", "arguments": ["p.date"]}
    ]},
    {"field": "body", "kind": "plain_text", "rules": [
        {"method": "find_selector", "arguments": ["#body"]}
    ]},
    {"field": "city", "kind": "city", "rules": [
        {"method": "find_selector", "arguments": [".city"]}
    ]}
]"##;

fn write_inputs(dir: &TempDir, page: &[u8], jobs: &str) -> (PathBuf, PathBuf) {
    let html_path = dir.path().join("minutes.html");
    let jobs_path = dir.path().join("jobs.json");
    fs::write(&html_path, page).unwrap();
    fs::write(&jobs_path, jobs).unwrap();
    (html_path, jobs_path)
}

#[test]
fn prints_fields_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let (html_path, jobs_path) = write_inputs(&temp_dir, PAGE.as_bytes(), JOBS);

    let output = obtain_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--jobs")
        .arg(&jobs_path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "Regular Meeting Minutes");
    assert_eq!(json["date"], "March 3, 2020");
    assert_eq!(json["body"], "Call to order.\n\nRoll call.");
    assert_eq!(json["city"], "");
}

#[test]
fn writes_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let (html_path, jobs_path) = write_inputs(&temp_dir, PAGE.as_bytes(), JOBS);
    let out_path = temp_dir.path().join("out.json");

    obtain_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--jobs")
        .arg(&jobs_path)
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();

    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("\"title\": \"Regular Meeting Minutes\""));
}

#[test]
fn config_file_overrides_options() {
    let temp_dir = TempDir::new().unwrap();
    let (html_path, jobs_path) = write_inputs(&temp_dir, PAGE.as_bytes(), JOBS);
    let config_path = temp_dir.path().join("options.json");
    fs::write(&config_path, r#"{"title": {"max_length": 15}}"#).unwrap();

    obtain_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--jobs")
        .arg(&jobs_path)
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Regular Meeting\""));
}

#[test]
fn legacy_encoded_pages_are_repaired() {
    let temp_dir = TempDir::new().unwrap();
    let page = b"<html><body><h1>Caf\xe9 hours</h1></body></html>";
    let jobs = r#"[{"field": "title", "kind": "title", "rules": [
        {"method": "find_selector", "arguments": ["h1"]}
    ]}]"#;
    let (html_path, jobs_path) = write_inputs(&temp_dir, page, jobs);

    obtain_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--jobs")
        .arg(&jobs_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cafe Hours"));
}

#[test]
fn bad_selector_fails() {
    let temp_dir = TempDir::new().unwrap();
    let jobs = r#"[{"field": "title", "kind": "title", "rules": [
        {"method": "find_selector", "arguments": ["[[[bad"]}
    ]}]"#;
    let (html_path, jobs_path) = write_inputs(&temp_dir, PAGE.as_bytes(), jobs);

    obtain_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--jobs")
        .arg(&jobs_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid selector"));
}

#[test]
fn missing_jobs_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let (html_path, _) = write_inputs(&temp_dir, PAGE.as_bytes(), JOBS);

    obtain_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--jobs")
        .arg(temp_dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("read jobs"));
}
