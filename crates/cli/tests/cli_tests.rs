// Integration tests for the `warpcheck` binary: exit codes, the --json
// stdout contract, config-driven runs and exports.
//
// Run with: cargo test -p warpcheck-cli --test cli_tests -- --nocapture

use std::path::Path;
use std::process::{Command, Output};

fn warpcheck() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_warpcheck"));
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("WARPCHECK_SPEC");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

/// Assert stdout is a single, parseable JSON value with no extra lines.
fn assert_single_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!("stdout must be valid JSON.\nParse error: {e}\nstdout:\n{trimmed}")
    })
}

const AGREE_A: &str = "\
Part No,Warpage(um)
WP-001,12.4
WP-002,-18.1
WP-003,25.0
WP-004,9.8
";

const AGREE_B: &str = "\
part no,warpage(um)
WP-001,12.6
WP-002,18.4
WP-003,24.7
WP-004,10.1
";

// ===========================================================================
// compare
// ===========================================================================

#[test]
fn compare_agreeing_sources_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", AGREE_A);
    let b = write(dir.path(), "b.csv", AGREE_B);

    let output = warpcheck()
        .args(["compare", "--a", &a, "--b", &b, "--spec", "30", "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = assert_single_json(&output);
    assert_eq!(json["report"]["verdict"], "high_confidence");
    assert_eq!(json["report"]["summary"]["comparable"], 4);
    assert_eq!(json["report"]["sources"]["a"], "a");
    assert!(json["run_at"].is_string());
    assert!(json.get("config_name").is_none());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("verdict: high_confidence"));
}

#[test]
fn compare_single_overlap_is_high_deviation() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", "part no,warpage(um)\nP1,10\nP2,40\n");
    let b = write(dir.path(), "b.csv", "part no,warpage(um)\nP1,12\nP3,5\n");

    let output = warpcheck()
        .args(["compare", "--a", &a, "--b", &b, "--spec", "30", "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    let json = assert_single_json(&output);
    let report = &json["report"];
    assert_eq!(report["verdict"], "high_deviation");
    assert!(report["comparison"]["correlation"].is_null());
    assert_eq!(report["comparison"]["delta_mean"], 2.0);
    assert_eq!(report["rows"].as_array().unwrap().len(), 3);
}

#[test]
fn compare_offset_sources_is_moderate() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", "part no,warpage(um)\nP1,10\nP2,20\nP3,15\n");
    let b = write(dir.path(), "b.csv", "part no,warpage(um)\nP1,15\nP2,25\nP3,20\n");

    let output = warpcheck()
        .args(["compare", "--a", &a, "--b", &b, "--spec", "30"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(6));
    // no --json: stdout stays empty
    assert!(output.stdout.is_empty());
}

#[test]
fn compare_schema_error_exits_four() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", AGREE_A);
    let b = write(dir.path(), "b.csv", "id,warpage(um)\nP1,1\n");

    let output = warpcheck()
        .args(["compare", "--a", &a, "--b", &b, "--spec", "30", "--label-b", "dsol", "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    assert!(output.stdout.is_empty(), "no report on schema error");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("table 'dsol': missing column(s) part no"), "stderr: {stderr}");
}

#[test]
fn compare_strict_values_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", "part no,warpage(um)\nP1,10\nP2,oops\n");
    let b = write(dir.path(), "b.csv", AGREE_B);

    let lenient = warpcheck()
        .args(["compare", "--a", &a, "--b", &b, "--spec", "30"])
        .output()
        .unwrap();
    assert_ne!(lenient.status.code(), Some(4));

    let strict = warpcheck()
        .args(["compare", "--a", &a, "--b", &b, "--spec", "30", "--strict-values"])
        .output()
        .unwrap();
    assert_eq!(strict.status.code(), Some(4));
}

#[test]
fn compare_reject_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", "part no,warpage(um)\nP1,10\nP1,11\n");
    let b = write(dir.path(), "b.csv", "part no,warpage(um)\nP1,12\n");

    let output = warpcheck()
        .args(["compare", "--a", &a, "--b", &b, "--spec", "30", "--reject-duplicates"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("duplicate part no 'P1'"));
}

#[test]
fn compare_same_labels_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", AGREE_A);
    let output = warpcheck()
        .args(["compare", "--a", &a, "--b", &a, "--spec", "30", "--label-a", "x", "--label-b", "x"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn compare_negative_spec_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", AGREE_A);
    let b = write(dir.path(), "b.csv", AGREE_B);
    let output = warpcheck()
        .args(["compare", "--a", &a, "--b", &b, "--spec=-5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn compare_missing_file_is_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    let b = write(dir.path(), "b.csv", AGREE_B);
    let missing = dir.path().join("nope.csv");
    let output = warpcheck()
        .args(["compare", "--a", missing.to_str().unwrap(), "--b", &b, "--spec", "30"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
}

// ===========================================================================
// run / validate
// ===========================================================================

const CONFIG: &str = r#"
name = "Line 3 weekly"
spec_limit = 30

[sources.a]
label = "quality"
file = "quality.csv"

[sources.b]
label = "dsol"
file = "dsol.csv"

[output]
export = "reconciled.csv"
"#;

#[test]
fn run_resolves_paths_relative_to_config() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "quality.csv", AGREE_A);
    write(dir.path(), "dsol.csv", AGREE_B);
    let config = write(dir.path(), "line3.warpage.toml", CONFIG);
    let report_path = dir.path().join("report.json");

    let output = warpcheck()
        .args(["run", &config, "--output", report_path.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["config_name"], "Line 3 weekly");
    assert_eq!(json["report"]["sources"]["b"], "dsol");
    assert_eq!(json["report"]["spec_limit"], 30.0);

    // [output].export was honoured
    let rows = warpcheck_cli::export::read_csv(&dir.path().join("reconciled.csv")).unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.comparable));
}

#[test]
fn run_export_flag_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "quality.csv", AGREE_A);
    write(dir.path(), "dsol.csv", AGREE_B);
    let config = write(dir.path(), "line3.warpage.toml", CONFIG);
    let xlsx = dir.path().join("out.xlsx");

    let output = warpcheck()
        .args(["run", &config, "--export", xlsx.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(xlsx.exists());
    assert!(!dir.path().join("reconciled.csv").exists());
}

#[test]
fn run_invalid_config_exits_three() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "bad.warpage.toml",
        &CONFIG.replace("spec_limit = 30", "spec_limit = -30"),
    );
    let output = warpcheck().args(["run", &config]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn validate_reports_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "line3.warpage.toml", CONFIG);
    let output = warpcheck().args(["validate", &config]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("valid: 'Line 3 weekly' spec 30"), "stderr: {stderr}");
}

#[test]
fn json_report_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", AGREE_A);
    let b = write(dir.path(), "b.csv", AGREE_B);

    let run = || {
        let output = warpcheck()
            .args(["compare", "--a", &a, "--b", &b, "--spec", "30", "--json"])
            .output()
            .unwrap();
        assert_single_json(&output)["report"].clone()
    };
    assert_eq!(run(), run());
}
