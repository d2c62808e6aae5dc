//! CLI E2E tests for the citysafe binary.
//!
//! Validates:
//! - `gen-csv` then `windows` produces windows, sample.npy and metadata.json
//! - JSON output envelopes and exit codes (0 clean, 3 partial, 5 no input,
//!   10 config error)
//! - Config file and environment layering
//! - `calibrate`, `synth`, `inspect` and `schema`

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

// ============================================================================
// Helpers
// ============================================================================

fn citysafe(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("citysafe");
    cmd.timeout(Duration::from_secs(60));
    cmd.current_dir(home);
    // Keep per-user config files out of the picture.
    cmd.env("XDG_CONFIG_HOME", home.join("xdg"));
    cmd.env("HOME", home);
    for var in [
        "CITYSAFE_CONFIG",
        "CITYSAFE_FORMAT",
        "CITYSAFE_FEATURES",
        "CITYSAFE_TARGET_HZ",
        "CITYSAFE_SEQ_LEN",
        "CITYSAFE_STRIDE",
        "CITYSAFE_SEED",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run citysafe");
    serde_json::from_slice(&output.stdout).expect("parse JSON")
}

fn gen_csv(home: &Path, name: &str, rows: usize) {
    let out = format!("raw_csvs/{name}");
    let n = rows.to_string();
    citysafe(home)
        .args(["gen-csv", "--out", out.as_str(), "--n", n.as_str()])
        .assert()
        .success();
}

// ============================================================================
// windows
// ============================================================================

#[test]
fn windows_end_to_end() {
    let home = tempdir().unwrap();
    gen_csv(home.path(), "test_demo.csv", 300);

    citysafe(home.path())
        .args(["windows", "--target-hz", "50", "--features", "ax,ay,az,gx,gy"])
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("windows written"));

    assert!(home.path().join("data/rep_windows/test_demo_0.npy").exists());
    assert!(home.path().join("data/sample.npy").exists());
    let meta: Value =
        serde_json::from_str(&fs::read_to_string(home.path().join("data/metadata.json")).unwrap())
            .unwrap();
    assert_eq!(meta[0]["file"], "test_demo_0.npy");
    assert_eq!(meta[0]["resampled"], true);
}

#[test]
fn windows_json_summary() {
    let home = tempdir().unwrap();
    gen_csv(home.path(), "a.csv", 200);

    let json = json_stdout(citysafe(home.path()).args(["--format", "json", "windows"]));
    assert_eq!(json["command"], "windows");
    assert!(json["schema_version"].is_string());
    let result = &json["result"];
    assert!(result["run_id"].as_str().unwrap().starts_with("run-"));
    assert_eq!(result["files"][0]["status"], "windowed");
    assert_eq!(result["windows_written"], 3);
    assert_eq!(result["sample_rows"], 300);
    assert_eq!(result["config_hash"].as_str().unwrap().len(), 64);
}

#[test]
fn empty_input_exits_with_no_input() {
    let home = tempdir().unwrap();
    fs::create_dir_all(home.path().join("raw_csvs")).unwrap();

    citysafe(home.path())
        .args(["windows"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("no CSV files found"));
    assert!(!home.path().join("data").exists());
}

#[test]
fn skipped_file_exits_partial() {
    let home = tempdir().unwrap();
    gen_csv(home.path(), "good.csv", 150);
    fs::write(home.path().join("raw_csvs/bad.csv"), "foo,bar\nx,y\n").unwrap();

    let output = citysafe(home.path())
        .args(["--format", "json", "windows", "--features", "ax"])
        .assert()
        .code(3)
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).unwrap();
    let files = json["result"]["files"].as_array().unwrap();
    assert_eq!(files[0]["status"], "skipped");
    assert_eq!(files[0]["code"], 21);
    assert_eq!(files[1]["status"], "windowed");
}

#[test]
fn invalid_stride_is_a_config_error() {
    let home = tempdir().unwrap();
    gen_csv(home.path(), "a.csv", 50);
    citysafe(home.path())
        .args(["windows", "--stride", "0"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("pipeline.stride"));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let home = tempdir().unwrap();
    citysafe(home.path())
        .args(["--config", "nope.toml", "windows"])
        .assert()
        .code(10);
}

#[test]
fn config_file_then_env_then_flags() {
    let home = tempdir().unwrap();
    gen_csv(home.path(), "a.csv", 200);
    fs::write(
        home.path().join("pipeline.toml"),
        "[pipeline]\nseq_len = 40\nstride = 40\nout_dir = \"from_file\"\n",
    )
    .unwrap();

    let json = json_stdout(
        citysafe(home.path())
            .env("CITYSAFE_STRIDE", "20")
            .args(["--config", "pipeline.toml", "--format", "json", "windows", "--seq-len", "100"]),
    );
    // seq_len from the flag, stride from the environment, out_dir from the file.
    assert_eq!(json["result"]["windows_written"], 6);
    assert!(home.path().join("from_file/rep_windows/a_5.npy").exists());
}

// ============================================================================
// calibrate / synth / inspect / schema
// ============================================================================

#[test]
fn calibrate_without_artifacts_uses_noise() {
    let home = tempdir().unwrap();
    let json = json_stdout(citysafe(home.path()).args([
        "--format",
        "json",
        "calibrate",
        "--num-samples",
        "4",
        "--seed",
        "1",
    ]));
    assert_eq!(json["result"]["source"], "synthetic");
    assert_eq!(json["result"]["drawn"], 4);
    assert_eq!(json["result"]["shape"], serde_json::json!([4, 100, 10]));
    assert!(home.path().join("data/calibration.npy").exists());
}

#[test]
fn calibrate_after_windows_uses_windows() {
    let home = tempdir().unwrap();
    gen_csv(home.path(), "a.csv", 300);
    citysafe(home.path())
        .args(["windows", "--features", "ax,ay,az"])
        .assert()
        .success();

    let json = json_stdout(citysafe(home.path()).args([
        "--format",
        "json",
        "calibrate",
        "--num-samples",
        "5",
        "--seed",
        "2",
    ]));
    assert_eq!(json["result"]["source"], "windows");
    assert_eq!(json["result"]["shape"], serde_json::json!([5, 100, 3]));
}

#[test]
fn synth_then_inspect() {
    let home = tempdir().unwrap();
    citysafe(home.path())
        .args(["synth", "--duration", "2", "--seed", "7", "--out", "data/rep_windows/synth.npy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved synthetic data"));

    citysafe(home.path())
        .args(["inspect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100 rows x 9 features"));

    let json = json_stdout(citysafe(home.path()).args([
        "--format",
        "json",
        "inspect",
        "data/rep_windows/synth.npy",
    ]));
    assert_eq!(json["result"]["shape"], serde_json::json!([100, 9]));
    assert_eq!(json["result"]["columns"].as_array().unwrap().len(), 9);
}

#[test]
fn synth_rejects_unusable_rates_and_durations() {
    let home = tempdir().unwrap();
    let cases: [&[&str]; 4] = [
        &["--fs", "inf", "--duration", "60"],
        &["--fs", "0", "--duration", "60"],
        &["--fs", "50", "--duration=-5"],
        &["--fs", "50", "--duration", "1e12"],
    ];
    for args in cases {
        citysafe(home.path())
            .arg("synth")
            .args(args)
            .assert()
            .code(10);
    }
    assert!(!home.path().join("data/synthetic.npy").exists());
}

#[test]
fn inspect_without_windows_is_no_input() {
    let home = tempdir().unwrap();
    citysafe(home.path()).args(["inspect"]).assert().code(5);
}

#[test]
fn schemas_are_json() {
    let home = tempdir().unwrap();
    let config = json_stdout(citysafe(home.path()).args(["schema"]));
    assert!(config["properties"]["pipeline"].is_object());
    let meta = json_stdout(citysafe(home.path()).args(["schema", "metadata"]));
    assert_eq!(meta["type"], "array");
}
