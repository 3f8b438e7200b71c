//! Smoke tests -- verify the binary runs and each subcommand works end to end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn logsift() -> Command {
    let mut cmd = Command::cargo_bin("logsift").unwrap();
    // keep a developer's local config out of the picture
    cmd.env_remove("LOGSIFT_CONFIG").env("RUST_LOG", "error");
    cmd
}

fn error_heavy_batch() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for i in 0..15 {
        writeln!(
            file,
            r#"{{"id":"e{i}","timestamp":"2024-01-15 14:{i:02}:00","level":"error","service":"auth","message":"Failed to authenticate user: invalid token"}}"#
        )
        .unwrap();
    }
    for i in 0..85 {
        writeln!(
            file,
            r#"{{"id":"i{i}","timestamp":"2024-01-15 15:{m:02}:00","level":"info","service":"api","message":"API request processed"}}"#,
            m = i % 60
        )
        .unwrap();
    }
    file
}

#[test]
fn test_cli_help() {
    logsift()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Heuristic log insights"));
}

#[test]
fn test_cli_version() {
    logsift()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("logsift"));
}

#[test]
fn test_subcommands_exist() {
    for sub in ["analyze", "search", "metrics", "sample", "serve"] {
        logsift().args([sub, "--help"]).assert().success();
    }
}

#[test]
fn test_analyze_file_json() {
    let batch = error_heavy_batch();
    let output = logsift()
        .args(["analyze", "--json", "--input"])
        .arg(batch.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["record_count"], 100);
    let kinds: Vec<&str> = report["anomalies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["High Error Rate", "Service Error Concentration"]);
}

#[test]
fn test_analyze_text_report() {
    let batch = error_heavy_batch();
    logsift()
        .args(["analyze", "--input"])
        .arg(batch.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Analysis Report"))
        .stdout(predicate::str::contains("Security Monitoring Required"));
}

#[test]
fn test_analyze_with_progress() {
    let batch = error_heavy_batch();
    let config = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(config.path(), "[progress]\ntick_ms = 1\n").unwrap();

    logsift()
        .args(["analyze", "--progress", "--json", "--config"])
        .arg(config.path())
        .arg("--input")
        .arg(batch.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("100%"))
        .stdout(predicate::str::contains("record_count"));
}

#[test]
fn test_search_highlights_matches() {
    let batch = error_heavy_batch();
    logsift()
        .args(["search", "--query", "TOKEN", "--input"])
        .arg(batch.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[token]"))
        .stdout(predicate::str::contains("15 of 100 records matched"));
}

#[test]
fn test_search_rejects_unknown_level() {
    logsift()
        .args(["search", "--level", "fatal"])
        .assert()
        .failure();
}

#[test]
fn test_metrics_on_sample() {
    logsift()
        .args(["metrics", "--seed", "7", "--count", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total           | 120"));
}

#[test]
fn test_sample_writes_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.jsonl");
    logsift()
        .args(["sample", "--seed", "3", "--count", "25", "--output"])
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 25);
    for line in content.lines() {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v["id"].as_str().unwrap().starts_with("log-"));
    }
}

#[test]
fn test_missing_input_file_fails() {
    logsift()
        .args(["analyze", "--input", "/definitely/not/here.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load batch"));
}

#[test]
fn test_unloadable_env_config_fails() {
    let config = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(config.path(), "[thresholds]\nerror_rate = 5.0\n").unwrap();

    logsift()
        .env("LOGSIFT_CONFIG", config.path())
        .args(["analyze", "--count", "20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LOGSIFT_CONFIG"))
        .stderr(predicate::str::contains("thresholds.error_rate"));
}

#[test]
fn test_sample_is_reproducible() {
    let run = |extra: &[&str]| {
        let output = logsift()
            .args(["sample", "--seed", "3", "--count", "40"])
            .args(extra)
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };

    let first = run(&[]);
    std::thread::sleep(std::time::Duration::from_millis(1100));
    assert_eq!(first, run(&[]));

    let shifted = run(&["--base", "2023-06-01 12:30:00"]);
    let newest: serde_json::Value = serde_json::from_str(shifted.lines().next().unwrap()).unwrap();
    assert!(newest["timestamp"].as_str().unwrap().starts_with("2023-06-01 12:"));
}

#[test]
fn test_metrics_on_default_sample_are_stable() {
    let run = || {
        logsift()
            .args(["metrics", "--json", "--count", "60"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_search_reports_active_filters() {
    let batch = error_heavy_batch();
    logsift()
        .args(["search", "--level", "error", "--input"])
        .arg(batch.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("15 of 100 records matched (1 level/service filters active)"));
}
