//! CLI integration tests.

mod support;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

use support::temp_file;

const WORKLOAD: &str = r#"{
  "periods": [
    { "clients": [
        { "id": "acme", "tier": "premium", "weight": 10, "min_rate": 30,
          "willingness_to_pay": "0.50", "demand": 50 },
        { "id": "beta", "tier": "standard", "weight": 5,
          "willingness_to_pay": "0.20", "demand": 80 }
    ] },
    { "clients": [
        { "id": "acme", "tier": "premium", "weight": 10, "min_rate": 30,
          "willingness_to_pay": "0.50", "demand": 50 },
        { "id": "beta", "tier": "standard", "weight": 5,
          "willingness_to_pay": "0.20", "demand": 40 }
    ] }
  ]
}"#;

fn ratewise() -> Command {
    cargo_bin_cmd!("ratewise")
}

#[test]
fn help_lists_commands() {
    ratewise()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ratewise"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn check_accepts_valid_config() {
    let config = temp_file(".toml", "[allocator]\ncapacity = 120.0\n");
    ratewise()
        .args(["check", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("120 req/s"));
}

#[test]
fn check_rejects_invalid_config() {
    let config = temp_file(".toml", "[adaptive]\nema_alpha = 2.0\n");
    ratewise()
        .args(["check", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ema_alpha"));
}

#[test]
fn check_reports_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    ratewise()
        .args(["check", "--config"])
        .arg(dir.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn run_prints_summary_and_writes_json_lines() {
    let config = temp_file(".toml", "[logging]\nlevel = \"warn\"\n");
    let workload = temp_file(".json", WORKLOAD);
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("metrics.jsonl");

    ratewise()
        .args(["run", "--config"])
        .arg(config.path())
        .arg("--workload")
        .arg(workload.path())
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Run summary"))
        .stdout(predicate::str::contains("By tier"))
        .stdout(predicate::str::contains("Wrote 3 lines"));

    let written = std::fs::read_to_string(&output).expect("metrics file");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains(r#""type":"period""#));
    assert!(lines[2].contains(r#""type":"summary""#));
}

#[test]
fn run_fails_on_malformed_workload() {
    let config = temp_file(".toml", "");
    let workload = temp_file(".json", "{ \"periods\": [ ");
    ratewise()
        .args(["run", "--config"])
        .arg(config.path())
        .arg("--workload")
        .arg(workload.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON"));
}

#[test]
fn run_accepts_the_shipped_demo() {
    let root = env!("CARGO_MANIFEST_DIR");
    ratewise()
        .current_dir(root)
        .args(["run", "--workload", "demos/burst.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Periods"));
}
