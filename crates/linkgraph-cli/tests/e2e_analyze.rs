//! E2E CLI tests covering:
//! - `linkgraph analyze` file outputs (DOT, cycle status, JSON report)
//! - per-library split layouts
//! - `--fail-on-cycles` exit status
//! - `linkgraph cycles` output formats and error reporting
//!
//! Each test runs the binary as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

fn lg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("linkgraph"));
    cmd.current_dir(dir);
    cmd.env("LINKGRAPH_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

/// App and Core depend on each other; both link the same libraries.
const CYCLIC_FACTS: &str = r#"{ "facts": [
  { "fact": "target", "name": "App" },
  { "fact": "target", "name": "Core" },
  { "fact": "target", "name": "Tools" },
  { "fact": "library", "name": "Kit", "kind": ".framework" },
  { "fact": "library", "name": "libz", "kind": ".tbd", "is_system": true },
  { "fact": "library", "name": "Net Utils", "kind": ".a" },
  { "fact": "edge", "from": "App", "to": "Core" },
  { "fact": "edge", "from": "Core", "to": "App" },
  { "fact": "edge", "from": "App", "to": "Kit" },
  { "fact": "edge", "from": "Core", "to": "Kit" },
  { "fact": "edge", "from": "Core", "to": "libz" },
  { "fact": "edge", "from": "Tools", "to": "Net Utils" }
] }"#;

const ACYCLIC_FACTS: &str = r#"{ "facts": [
  { "fact": "target", "name": "App" },
  { "fact": "library", "name": "Kit", "kind": ".framework" },
  { "fact": "edge", "from": "App", "to": "Kit" }
] }"#;

fn write_facts(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("facts.json");
    std::fs::write(&path, contents).expect("write facts");
    path
}

fn read(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_writes_dot_and_cycle_status() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), CYCLIC_FACTS);

    lg_cmd(dir.path())
        .args(["analyze", "--format", "text", "--output", "out/deps", "--facts"])
        .arg(&facts)
        .assert()
        .success()
        .stdout(predicate::str::contains("HAS_CYCLES=true"));

    let dot = read(dir.path().join("out/deps.dot"));
    assert!(dot.starts_with("digraph LinkGraph"));
    assert!(dot.contains("\"App\""));
    assert!(dot.contains("\"Net Utils\""));

    let status = read(dir.path().join("out/deps.cycles.txt"));
    assert_eq!(status, "HAS_CYCLES=true\nCYCLES_COUNT=1\nCYCLE_1=App,Core\n");
}

#[test]
fn analyze_json_report_fields() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), CYCLIC_FACTS);

    lg_cmd(dir.path())
        .args(["analyze", "--format", "json", "--json-out", "report.json", "--facts"])
        .arg(&facts)
        .args(["--exclude-kind", "tbd"])
        .assert()
        .success();

    let report: Value = serde_json::from_str(&read(dir.path().join("report.json"))).expect("json");
    assert_eq!(report["has_cycles"], true);
    assert_eq!(report["cycles_count"], 1);
    assert_eq!(report["cycles"]["components"], serde_json::json!([["App", "Core"]]));
    assert_eq!(report["nodes"]["targets"], serde_json::json!(["App", "Core", "Tools"]));
    assert_eq!(report["filters"]["exclude_kinds"], serde_json::json!([".tbd"]));

    let libraries: Vec<&str> = report["nodes"]["libraries"]
        .as_array()
        .expect("libraries")
        .iter()
        .filter_map(|l| l["name"].as_str())
        .collect();
    assert!(libraries.contains(&"Kit"));
    assert!(!libraries.contains(&"libz"), "excluded kind must not appear");
}

#[test]
fn analyze_split_creates_subdirectories() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), CYCLIC_FACTS);

    lg_cmd(dir.path())
        .args(["analyze", "--format", "text", "--split-by-library", "--facts"])
        .arg(&facts)
        .assert()
        .success();

    assert!(dir.path().join("linkgraph.dot").exists());
    let kit = read(dir.path().join("linkgraph_by_library/Kit/Kit.dot"));
    assert!(kit.starts_with("digraph LibraryView"));
    assert!(dir.path().join("linkgraph_by_library/Net_Utils/Net_Utils.dot").exists());
}

#[test]
fn analyze_split_only_flat_with_limits() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), CYCLIC_FACTS);

    lg_cmd(dir.path())
        .args([
            "analyze",
            "--format",
            "text",
            "--split-only",
            "--split-flat",
            "--split-dir",
            "libs",
            "--split-min-degree",
            "2",
            "--facts",
        ])
        .arg(&facts)
        .assert()
        .success();

    assert!(!dir.path().join("linkgraph.dot").exists());
    assert!(dir.path().join("linkgraph.cycles.txt").exists());
    assert!(dir.path().join("libs/Kit.dot").exists());
    // linked by one target only
    assert!(!dir.path().join("libs/libz.dot").exists());
}

#[test]
fn analyze_fail_on_cycles_exits_two_after_writing() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), CYCLIC_FACTS);

    lg_cmd(dir.path())
        .args(["analyze", "--format", "text", "--fail-on-cycles", "--facts"])
        .arg(&facts)
        .assert()
        .code(2);

    assert!(dir.path().join("linkgraph.dot").exists());
    assert!(dir.path().join("linkgraph.cycles.txt").exists());
}

#[test]
fn analyze_fail_on_cycles_passes_acyclic_graph() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), ACYCLIC_FACTS);

    lg_cmd(dir.path())
        .args(["analyze", "--format", "text", "--fail-on-cycles", "--facts"])
        .arg(&facts)
        .assert()
        .success()
        .stdout(predicate::str::contains("HAS_CYCLES=false"));
}

#[test]
fn analyze_reads_config_file() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), CYCLIC_FACTS);
    let config = dir.path().join("linkgraph.toml");
    std::fs::write(
        &config,
        "[filters]\nexclude_targets = [\"^Core$\"]\n\n[colors]\nedge = \"#123456\"\n",
    )
    .expect("write config");

    lg_cmd(dir.path())
        .args(["analyze", "--format", "text", "--config"])
        .arg(&config)
        .arg("--facts")
        .arg(&facts)
        .assert()
        .success()
        .stdout(predicate::str::contains("HAS_CYCLES=false"));

    let dot = read(dir.path().join("linkgraph.dot"));
    assert!(!dot.contains("\"Core\""));
    assert!(dot.contains("#123456"));
}

// ---------------------------------------------------------------------------
// cycles
// ---------------------------------------------------------------------------

#[test]
fn cycles_json_output() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), CYCLIC_FACTS);

    let output = lg_cmd(dir.path())
        .args(["cycles", "--format", "json", "--facts"])
        .arg(&facts)
        .output()
        .expect("run");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["has_cycles"], true);
    assert_eq!(value["cycles_count"], 1);
    assert_eq!(value["components"], serde_json::json!([["App", "Core"]]));
}

#[test]
fn cycles_text_output_is_status_file_format() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), ACYCLIC_FACTS);

    lg_cmd(dir.path())
        .args(["cycles", "--format", "text", "--facts"])
        .arg(&facts)
        .assert()
        .success()
        .stdout("HAS_CYCLES=false\nCYCLES_COUNT=0\n");
}

#[test]
fn cycles_respects_filters() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), CYCLIC_FACTS);

    lg_cmd(dir.path())
        .args(["cycles", "--format", "text", "--exclude-target", "^App$", "--facts"])
        .arg(&facts)
        .assert()
        .success()
        .stdout(predicate::str::contains("HAS_CYCLES=false"));
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn missing_fact_file_fails_with_code() {
    let dir = TempDir::new().expect("tempdir");

    lg_cmd(dir.path())
        .args(["cycles", "--format", "text", "--facts", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn malformed_fact_file_reports_json_error() {
    let dir = TempDir::new().expect("tempdir");
    let facts = write_facts(dir.path(), "{ \"facts\": [ { \"fact\": \"bogus\" } ] }");

    let output = lg_cmd(dir.path())
        .args(["cycles", "--format", "json", "--facts"])
        .arg(&facts)
        .output()
        .expect("run");
    assert!(!output.status.success());

    let value: Value = serde_json::from_slice(&output.stderr).expect("json error");
    assert_eq!(value["error"]["error_code"], "E2002");
}
