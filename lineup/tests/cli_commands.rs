//! CLI tests for the `lineup` binary.
//!
//! Spawns the binary in a temp directory and checks output and exit codes.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use lineup::exit_codes;
use lineup::io::config::{ExecutorConfig, LineupConfig, load_config, write_config};
use lineup::test_support::{candidate_with, named_candidate};

fn lineup(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lineup"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn lineup")
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    fs::write(path, serde_json::to_string_pretty(value).expect("serialize")).expect("write");
}

#[test]
fn schema_prints_candidate_schema() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = lineup(temp.path(), &["schema"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).expect("schema json");
    assert_eq!(schema["required"][0], "players");
}

#[test]
fn prompt_renders_roster_from_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("roster.txt"), "Alice, Bob and Carl").expect("write roster");

    let output = lineup(temp.path(), &["prompt", "--input", "roster.txt"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Alice, Bob and Carl"));
    assert!(stdout.contains("PITCHER"));
}

#[test]
fn prompt_rejects_empty_roster() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("roster.txt"), "  \n").expect("write roster");

    let output = lineup(temp.path(), &["prompt", "--input", "roster.txt"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no player names given"));
}

#[test]
fn validate_accepts_full_lineup() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_json(
        &temp.path().join("lineup.json"),
        &named_candidate(&[
            "Alice", "Bob", "Carl", "Dan", "Eve", "Frank", "Grace", "Hank", "Ivy",
        ]),
    );

    let output = lineup(temp.path(), &["validate", "lineup.json"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(String::from_utf8_lossy(&output.stdout).contains("ok: 9 players"));
}

#[test]
fn validate_rejects_short_lineup() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_json(&temp.path().join("lineup.json"), &candidate_with(8));

    let output = lineup(temp.path(), &["validate", "lineup.json"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("need at least 9"));
}

#[test]
fn validate_honors_configured_roster_size() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = LineupConfig {
        min_roster_size: 5,
        ..LineupConfig::default()
    };
    write_config(&temp.path().join("lineup.toml"), &config).expect("write config");
    write_json(&temp.path().join("lineup.json"), &candidate_with(5));

    let output = lineup(temp.path(), &["validate", "lineup.json"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");

    let first = lineup(temp.path(), &["init"]);
    assert_eq!(first.status.code(), Some(exit_codes::OK));
    let cfg = load_config(&temp.path().join("lineup.toml")).expect("load config");
    assert_eq!(cfg, LineupConfig::default());

    let second = lineup(temp.path(), &["init"]);
    assert_eq!(second.status.code(), Some(exit_codes::INVALID));

    let forced = lineup(temp.path(), &["init", "--force"]);
    assert_eq!(forced.status.code(), Some(exit_codes::OK));
}

#[test]
fn invalid_config_is_reported() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("broken.toml"), "min_roster_size = 0\n").expect("write config");
    write_json(&temp.path().join("lineup.json"), &candidate_with(9));

    let output = lineup(
        temp.path(),
        &["--config", "broken.toml", "validate", "lineup.json"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("min_roster_size must be > 0"));
}

#[test]
fn generate_with_unreachable_model_ends_stuck() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = LineupConfig {
        executor: ExecutorConfig {
            program: "lineup-test-missing-model-cli".to_string(),
            ..ExecutorConfig::default()
        },
        ..LineupConfig::default()
    };
    write_config(&temp.path().join("lineup.toml"), &config).expect("write config");
    fs::write(temp.path().join("roster.txt"), "Alice,Bob,Carl").expect("write roster");

    let output = lineup(temp.path(), &["generate", "--input", "roster.txt", "--json"]);

    assert_eq!(output.status.code(), Some(exit_codes::STUCK));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stuck json");
    assert_eq!(report["resolution"], "NO_RESOLUTION");
    assert_eq!(report["call_count"], 4);
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("Cannot complete lineup: exceeded retry limit")
    );

    let runs = fs::read_dir(temp.path().join(".lineup/runs"))
        .expect("runs dir")
        .count();
    assert_eq!(runs, 1);
}
