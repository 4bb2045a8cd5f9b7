//! End-to-end tests for the calc_cli binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn calc_cli() -> Command {
    Command::cargo_bin("calc_cli").unwrap()
}

#[test]
fn test_run_from_stdin() {
    calc_cli()
        .args(["run", "--compact"])
        .write_stdin(r#"{"type": "PriceForMargin", "base_cost": 100, "target_margin_percent": 20}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"type":"PriceForMargin","price":125.0}"#));
}

#[test]
fn test_run_from_file() {
    let dir = tempdir().unwrap();
    let request = dir.path().join("overhead.json");
    fs::write(
        &request,
        r#"{
            "type": "OverheadAllocation",
            "total_overhead": 1000,
            "allocation_method": "MachineHours",
            "jobs": [
                { "job_name": "Job A", "machine_hours": 30 },
                { "job_name": "Job B", "machine_hours": 70 }
            ]
        }"#,
    )
    .unwrap();

    calc_cli()
        .args(["run", "--input"])
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"allocated_overhead\": 700.0"))
        .stdout(predicate::str::contains("\"allocation_method\": \"Machine Hours\""));
}

#[test]
fn test_settings_file_overrides() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    fs::write(&settings, r#"{"setup": {"target_setup_share_percent": 20}}"#).unwrap();

    calc_cli()
        .args(["run", "--compact", "--settings"])
        .arg(&settings)
        .write_stdin(r#"{"type": "IdealBatchSize", "adjusted_setup_total": 60, "cutting_time_per_part": 2}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ideal_batch_size\":120"));
}

#[test]
fn test_invalid_input_reports_json_error() {
    calc_cli()
        .args(["run"])
        .write_stdin(r#"{"type": "PriceForMargin", "base_cost": 100, "target_margin_percent": 100}"#)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error_code\": \"INVALID_INPUT\""))
        .stdout(predicate::str::contains("target_margin_percent"));
}

#[test]
fn test_malformed_request() {
    calc_cli()
        .args(["run"])
        .write_stdin("{ nope")
        .assert()
        .failure()
        .stdout(predicate::str::contains("SERIALIZATION_ERROR"));
}

#[test]
fn test_defaults() {
    calc_cli()
        .arg("defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dominant_share_percent\": 50.0"))
        .stdout(predicate::str::contains("\"minimum_acceptable_markup\": 0.1"));
}

#[test]
fn test_defaults_ignores_settings_file() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    fs::write(&settings, r#"{"overhead": {"dominant_share_percent": 80}}"#).unwrap();

    calc_cli()
        .args(["defaults", "--settings"])
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dominant_share_percent\": 50.0"))
        .stdout(predicate::str::contains("\"dominant_share_percent\": 80").not());
}
