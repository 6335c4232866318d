// Integration tests for the `schedval` binary: exit codes, the --json stdout
// contract, and file outputs.
//
// Run with: cargo test -p schedval-cli --test recon_cli_tests -- --nocapture

use std::path::PathBuf;
use std::process::{Command, Output};

fn schedval() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_schedval"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG")
        .env_remove("SCHEDVAL_EMPLOYER")
        .env_remove("SCHEDVAL_SCHEME_TYPE")
        .env_remove("SCHEDVAL_CONFIG");
    cmd
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../recon/tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn run_acme(extra: &[&str]) -> Output {
    let registry = fixture("members.csv");
    let schedule = fixture("schedule.csv");
    let mut args = vec![
        "run",
        "--registry",
        registry.as_str(),
        "--schedule",
        schedule.as_str(),
        "--employer",
        "ACME LTD",
        "--scheme-type",
        "TIER 2 OCC",
    ];
    args.extend_from_slice(extra);
    schedval().args(&args).output().expect("schedval run")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Assert stdout is a single, parseable JSON value with no extra lines.
fn assert_single_json(stdout: &str) -> serde_json::Value {
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!("stdout must be valid JSON.\nParse error: {}\nstdout:\n{}", e, trimmed)
    })
}

// ===========================================================================
// schedval run
// ===========================================================================

#[test]
fn run_json_produces_single_result() {
    let output = run_acme(&["--json"]);
    assert!(output.status.success(), "exit code: {:?}\nstderr: {}", output.status, stderr_of(&output));

    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["summary"]["total_rows"], 9);
    assert_eq!(val["summary"]["valid"], 1);
    assert_eq!(val["meta"]["scope"]["employer"], "ACME LTD");
    assert_eq!(val["meta"]["scope"]["scheme_type"], "TIER 2 OCC");
    assert_eq!(val["rows"].as_array().map(Vec::len), Some(9));
}

#[test]
fn run_without_json_keeps_stdout_empty() {
    let output = run_acme(&[]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "human mode must not write stdout");
    let stderr = stderr_of(&output);
    assert!(stderr.contains("9 rows: 1 valid"), "stderr: {stderr}");
    assert!(stderr.contains("scheme numbers filled in: 4"), "stderr: {stderr}");
}

#[test]
fn run_strict_flags_non_valid_rows() {
    let output = run_acme(&["--strict"]);
    assert_eq!(output.status.code(), Some(63));
    assert!(stderr_of(&output).contains("8 row(s) not valid as submitted"));
}

#[test]
fn run_writes_csv_and_json_files() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("validated.csv");
    let json_path = dir.path().join("result.json");

    let output = run_acme(&[
        "--csv",
        csv_path.to_str().unwrap(),
        "--output",
        json_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "S/N,SSNIT Number,NIA Number,Contact,Scheme Number,Member Name,Salary,Tier2 Contribution,Status"
    );
    assert_eq!(lines.count(), 9);
    assert!(csv.contains("🚫 *Scheme number populated via fuzzy name search"));
    assert!(csv.contains(",✅ Valid scheme number & name match"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_rows"], 9);
}

#[test]
fn run_unknown_employer_is_empty_scope() {
    let registry = fixture("members.csv");
    let schedule = fixture("schedule.csv");
    let output = schedval()
        .args([
            "run",
            "--registry",
            &registry,
            "--schedule",
            &schedule,
            "--employer",
            "INITECH",
            "--scheme-type",
            "TIER 2 OCC",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(62));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("no registry members for employer \"INITECH\""), "stderr: {stderr}");
    assert!(stderr.contains("hint:  list valid selections"), "stderr: {stderr}");
}

#[test]
fn run_bad_shape_is_input_error() {
    let registry = fixture("members.csv");
    let schedule = fixture("schedule-bad-shape.csv");
    let output = schedval()
        .args([
            "run",
            "--registry",
            &registry,
            "--schedule",
            &schedule,
            "--employer",
            "ACME LTD",
            "--scheme-type",
            "TIER 2 OCC",
            "--json",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(61));
    assert!(output.stdout.is_empty(), "no partial result on shape error");
    assert!(stderr_of(&output).contains("schedule line 3: expected 7 columns, found 6"));
}

#[test]
fn run_missing_registry_is_input_error() {
    let schedule = fixture("schedule.csv");
    let output = schedval()
        .args([
            "run",
            "--registry",
            "does-not-exist.csv",
            "--schedule",
            &schedule,
            "--employer",
            "ACME LTD",
            "--scheme-type",
            "TIER 2 OCC",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(61));
    assert!(stderr_of(&output).contains("cannot read registry"));
}

#[test]
fn run_without_selection_is_usage_error() {
    let registry = fixture("members.csv");
    let schedule = fixture("schedule.csv");
    let output = schedval()
        .args(["run", "--registry", &registry, "--schedule", &schedule])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn run_selection_from_env() {
    let registry = fixture("members.csv");
    let schedule = fixture("schedule.csv");
    let output = schedval()
        .args(["run", "--registry", &registry, "--schedule", &schedule, "--json"])
        .env("SCHEDVAL_EMPLOYER", "ACME LTD")
        .env("SCHEDVAL_SCHEME_TYPE", "TIER 2 OCC")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["summary"]["total_rows"], 9);
}

// ===========================================================================
// schedval validate
// ===========================================================================

#[test]
fn validate_fixture_config() {
    let output = schedval().args(["validate", &fixture("schedval.toml")]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(stderr_of(&output).contains("valid: config 'ACME Tier-2 (fixture)'"));
}

#[test]
fn validate_rejects_threshold_over_100() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[thresholds]\nstrict = 150\n").unwrap();

    let output = schedval().args(["validate", path.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr_of(&output).contains("config validation error"));
}

#[test]
fn validate_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.toml");
    std::fs::write(&path, "[contribution]\nrate = 500\n").unwrap();

    let output = schedval().args(["validate", path.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr_of(&output).contains("config parse error"));
}

#[test]
fn run_with_invalid_config_fails_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[salary]\nmin_cents = 100\nmax_cents = 10\n").unwrap();

    let output = run_acme(&["--config", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
}

// ===========================================================================
// schedval options
// ===========================================================================

#[test]
fn options_json_lists_selections() {
    let output = schedval()
        .args(["options", "--registry", &fixture("members.csv"), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["employers"], serde_json::json!(["ACME LTD", "GLOBEX"]));
    assert_eq!(val["scheme_types"], serde_json::json!(["PERSONAL PENSION", "TIER 2 OCC"]));
}

#[test]
fn options_human_output() {
    let output = schedval()
        .args(["options", "--registry", &fixture("members.csv")])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("employers:\n  ACME LTD\n  GLOBEX\n"), "stdout: {stdout}");
    assert!(stdout.contains("scheme types:\n  PERSONAL PENSION\n  TIER 2 OCC\n"));
}
