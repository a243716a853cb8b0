use assert_cmd::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a `linscan` command that runs in an isolated temp directory.
/// Clears the scan env vars so a developer's shell never leaks into a test.
fn linscan_cmd(work_dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("linscan");
    cmd.current_dir(work_dir.path());
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("LINSCAN_PREFETCH_DEPTH");
    cmd.env_remove("LINSCAN_FETCH_TIMEOUT_MS");
    cmd
}

fn write_rows(dir: &TempDir, lines: &[&str]) -> String {
    let path = dir.path().join("data.jsonl");
    fs::write(&path, lines.join("\n")).unwrap();
    path.display().to_string()
}

fn read_json(path: std::path::PathBuf) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// General
// ============================================================================

#[test]
fn help_flag() {
    cargo_bin_cmd!("linscan")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chunked sequential table scans"))
        .stdout(predicate::str::contains("rand-table"))
        .stdout(predicate::str::contains("scan"));
}

#[test]
fn verbose_quiet_conflict() {
    cargo_bin_cmd!("linscan")
        .args(["--verbose", "--quiet", "rand-table", "--num-rows", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn verbose_logs_go_to_stderr_only() {
    let tmp = TempDir::new().unwrap();
    let assert = linscan_cmd(&tmp)
        .env("RUST_LOG", "debug")
        .args(["--verbose", "rand-table", "--num-rows", "20", "--seed", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Opened scan session"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let printed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert!(printed["col_avg"].is_number());
}

#[test]
fn logs_off_by_default() {
    let tmp = TempDir::new().unwrap();
    linscan_cmd(&tmp)
        .env("RUST_LOG", "debug")
        .args(["rand-table", "--num-rows", "20"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// ============================================================================
// rand-table
// ============================================================================

#[test]
fn rand_table_writes_results() {
    let tmp = TempDir::new().unwrap();
    let assert = linscan_cmd(&tmp)
        .args(["rand-table", "--num-rows", "250", "--seed", "7"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let printed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let written = read_json(tmp.path().join("job_output.json"));
    assert_eq!(printed, written);

    let avg = written["col_avg"].as_f64().unwrap();
    assert!((0.0..=99.0).contains(&avg));
    let table_id = written["rand_table"].as_str().unwrap();
    assert!(table_id.starts_with("table-"));
    assert!(written["results_file"].as_str().unwrap().ends_with("OutputFile"));

    let report = fs::read_to_string(tmp.path().join("OutputFile")).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "This file is generated as a result of running this app");
    assert_eq!(lines[1], "numRows = 250");
    assert_eq!(lines[2], format!("Average = {}", avg));
    assert_eq!(lines[3], format!("Random table ID = {}", table_id));
}

#[test]
fn rand_table_seed_is_deterministic() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    for tmp in [&first, &second] {
        linscan_cmd(tmp)
            .args(["rand-table", "--num-rows", "40", "--seed", "42", "--chunk-size", "3"])
            .assert()
            .success();
    }
    let a = read_json(first.path().join("job_output.json"));
    let b = read_json(second.path().join("job_output.json"));
    assert_eq!(a["col_avg"], b["col_avg"]);
}

#[test]
fn rand_table_reads_job_input() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("job_input.json"), r#"{"numRows": 12}"#).unwrap();

    linscan_cmd(&tmp)
        .args(["rand-table", "--input", "job_input.json", "--out-dir", "out"])
        .assert()
        .success();

    let report = fs::read_to_string(tmp.path().join("out/OutputFile")).unwrap();
    assert!(report.contains("numRows = 12"));
}

#[test]
fn rand_table_flag_overrides_input() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("job_input.json"), r#"{"numRows": 12}"#).unwrap();

    linscan_cmd(&tmp)
        .args(["rand-table", "--input", "job_input.json", "--num-rows", "3"])
        .assert()
        .success();

    let report = fs::read_to_string(tmp.path().join("OutputFile")).unwrap();
    assert!(report.contains("numRows = 3"));
}

#[test]
fn rand_table_rejects_zero_rows() {
    let tmp = TempDir::new().unwrap();
    linscan_cmd(&tmp)
        .args(["rand-table", "--num-rows", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("numRows must be greater than 0"));
}

#[test]
fn rand_table_requires_row_count() {
    let tmp = TempDir::new().unwrap();
    linscan_cmd(&tmp)
        .arg("rand-table")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--num-rows or --input is required"));
}

// ============================================================================
// scan
// ============================================================================

#[test]
fn scan_prints_projected_rows() {
    let tmp = TempDir::new().unwrap();
    let file = write_rows(
        &tmp,
        &[r#"[1, "a", 0.5]"#, r#"[2, "b", 1.5]"#, "", r#"[3, "c", 2]"#],
    );

    linscan_cmd(&tmp)
        .args(["scan", "--file", &file])
        .args(["--column", "id:int32", "--column", "name:string", "--column", "score:double"])
        .args(["--select", "name", "--select", "id", "--chunk-size", "2", "--summary"])
        .assert()
        .success()
        .stdout("[\"a\",1]\n[\"b\",2]\n[\"c\",3]\n")
        .stderr(predicate::str::contains("chunks = 2"))
        .stderr(predicate::str::contains("rows = 3"));
}

#[test]
fn scan_sub_range() {
    let tmp = TempDir::new().unwrap();
    let lines: Vec<String> = (0..10).map(|i| format!("[{i}]")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let file = write_rows(&tmp, &refs);

    linscan_cmd(&tmp)
        .args(["scan", "--file", &file, "--column", "v:int64"])
        .args(["--start", "5", "--end", "8", "--chunk-size", "100"])
        .assert()
        .success()
        .stdout("[5]\n[6]\n[7]\n");

    linscan_cmd(&tmp)
        .args(["scan", "--file", &file, "--column", "v:int64", "--start", "5", "--end", "5"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn scan_unknown_column_fails() {
    let tmp = TempDir::new().unwrap();
    let file = write_rows(&tmp, &["[1]"]);

    linscan_cmd(&tmp)
        .args(["scan", "--file", &file, "--column", "v:int32", "--select", "w"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown column: w"));
}

#[test]
fn scan_invalid_range_fails() {
    let tmp = TempDir::new().unwrap();
    let file = write_rows(&tmp, &["[1]", "[2]"]);

    linscan_cmd(&tmp)
        .args(["scan", "--file", &file, "--column", "v:int32", "--end", "3"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid range"));
}

#[test]
fn scan_bad_row_reports_line() {
    let tmp = TempDir::new().unwrap();
    let file = write_rows(&tmp, &["[1]", r#"["x"]"#]);

    linscan_cmd(&tmp)
        .args(["scan", "--file", &file, "--column", "v:int32"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("data.jsonl:2"));
}

#[test]
fn scan_bad_column_type_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    let file = write_rows(&tmp, &["[1]"]);

    linscan_cmd(&tmp)
        .args(["scan", "--file", &file, "--column", "v:decimal"])
        .assert()
        .code(2);
}

#[test]
fn scan_open_table_needs_config_opt_in() {
    let tmp = TempDir::new().unwrap();
    let file = write_rows(&tmp, &["[1]", "[2]"]);

    linscan_cmd(&tmp)
        .args(["scan", "--file", &file, "--column", "v:int32", "--keep-open"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not readable"));

    fs::write(tmp.path().join("linscan.toml"), "[scan]\nallow_open_tables = true\n").unwrap();
    linscan_cmd(&tmp)
        .args(["scan", "--file", &file, "--column", "v:int32", "--keep-open"])
        .assert()
        .success()
        .stdout("[1]\n[2]\n");
}

// ============================================================================
// config
// ============================================================================

#[test]
fn config_file_must_exist_when_given() {
    let tmp = TempDir::new().unwrap();
    linscan_cmd(&tmp)
        .args(["--config", "missing.toml", "rand-table", "--num-rows", "5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn config_file_rejects_unknown_keys() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("custom.toml"), "[scan]\ndepth = 3\n").unwrap();
    linscan_cmd(&tmp)
        .args(["--config", "custom.toml", "rand-table", "--num-rows", "5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid config file"));
}

#[test]
fn zero_prefetch_depth_from_env_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    linscan_cmd(&tmp)
        .env("LINSCAN_PREFETCH_DEPTH", "0")
        .args(["rand-table", "--num-rows", "5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("prefetch depth"));

    // Flag wins over env
    linscan_cmd(&tmp)
        .env("LINSCAN_PREFETCH_DEPTH", "0")
        .args(["rand-table", "--num-rows", "5", "--prefetch-depth", "3"])
        .assert()
        .success();
}
