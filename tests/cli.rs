use assert_cmd::prelude::*;
use chrono::{Days, Utc};
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn ccheat30() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccheat30"));
    for var in ["CCHEAT_METRIC", "CCHEAT_WEEK_START", "CCHEAT_TIMEZONE", "CCHEAT_SOURCE", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Claude-style report with usage today and yesterday (UTC).
fn write_report(dir: &Path) -> std::path::PathBuf {
    let today = Utc::now().date_naive();
    let yesterday = today - Days::new(1);
    let report = json!({
        "daily": [
            {
                "date": yesterday.format("%Y-%m-%d").to_string(),
                "inputTokens": 1200,
                "outputTokens": 300,
                "totalTokens": 1500,
                "totalCost": 0.42,
                "modelsUsed": ["claude-sonnet-4-20250514"]
            },
            {
                "date": today.format("%Y-%m-%d").to_string(),
                "inputTokens": 100,
                "outputTokens": 20,
                "totalCost": 0.08
            }
        ]
    });
    let path = dir.join("daily.json");
    std::fs::write(&path, report.to_string()).unwrap();
    path
}

#[test]
fn help_lists_flags() {
    ccheat30()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--metric"))
        .stdout(predicate::str::contains("--week-start"))
        .stdout(predicate::str::contains("--svg"));
}

#[test]
fn renders_text_heatmap_from_saved_report() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path());

    ccheat30()
        .args(["--input", input.to_str().unwrap(), "--timezone", "UTC", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Claude Code usage - last 30 days (tokens)"))
        .stdout(predicate::str::contains("Less"))
        .stdout(predicate::str::contains("More"))
        .stdout(predicate::str::contains("1,500"))
        .stdout(predicate::str::contains("$0.5000 USD of Claude Code"))
        .stdout(predicate::str::contains("\u{1b}[").not());
}

#[test]
fn writes_svg_when_requested() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path());
    let output = dir.path().join("nested").join("heat.svg");

    ccheat30()
        .args(["--input", input.to_str().unwrap(), "--timezone", "UTC", "--no-color"])
        .args(["--metric", "cost", "--week-start", "sun"])
        .arg("--svg")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("SVG written to"));

    let svg = std::fs::read_to_string(&output).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("#ebedf0"));
    assert!(svg.contains("$0.4200"));
}

#[test]
fn missing_report_names_the_source() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");

    ccheat30()
        .args(["--input", missing.to_str().unwrap(), "--source", "codex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("codex"));
}

#[test]
fn input_rejects_all_sources() {
    ccheat30()
        .args(["--input", "daily.json", "--source", "all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn invalid_metric_is_a_usage_error() {
    ccheat30()
        .args(["--metric", "lines"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
