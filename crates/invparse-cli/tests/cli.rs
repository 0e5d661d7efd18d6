use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "\
ACME WIDGETS LLC
123 Main Street

INVOICE
Invoice #: INV-1001
Invoice Date: 03/01/2024
Due Date: 03/31/2024

Bill To:
Beta Corp

Subtotal: $10.00
Tax: $1.00
Total: $11.00
";

fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    (dir, config)
}

fn invparse(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("invparse").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn process_file_as_json() {
    let (dir, config) = workspace();
    let input = dir.path().join("acme.txt");
    fs::write(&input, INVOICE).unwrap();

    invparse(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""vendor":"Acme Widgets LLC""#))
        .stdout(predicate::str::contains(r#""id":"Acme Widgets LLC__INV-1001""#))
        .stdout(predicate::str::contains(r#""due_date":"2024-03-31""#))
        .stdout(predicate::str::contains(r#""total":"11.00""#));
}

#[test]
fn process_stdin_as_csv() {
    let (_dir, config) = workspace();

    invparse(&config)
        .args(["process", "-", "--format", "csv"])
        .write_stdin(INVOICE)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id,vendor,invoice_number,invoice_date,due_date,subtotal,tax,total,currency,source",
        ))
        .stdout(predicate::str::contains("2024-03-01,2024-03-31,10.00,1.00,11.00,USD"));
}

#[test]
fn process_empty_input_uses_fallback_vendor() {
    let (_dir, config) = workspace();

    invparse(&config)
        .args(["process", "-", "--format", "text"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vendor: Unknown Vendor"));
}

#[test]
fn process_missing_file_fails() {
    let (dir, config) = workspace();

    invparse(&config)
        .arg("process")
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn reconcile_keeps_trusted_vendor() {
    let (dir, config) = workspace();
    let input = dir.path().join("acme.txt");
    fs::write(&input, INVOICE).unwrap();
    let prior = dir.path().join("prior.json");
    fs::write(&prior, r#"{"invoice_number": "us-1"}"#).unwrap();

    invparse(&config)
        .arg("reconcile")
        .arg(&input)
        .arg("--prior")
        .arg(&prior)
        .args(["--vendor", "Beta Corp"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""vendor":"Beta Corp""#))
        .stdout(predicate::str::contains(r#""invoice_number":"US-001""#));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let (dir, config) = workspace();
    let inbox = dir.path().join("inbox");
    let out = dir.path().join("out");
    fs::create_dir_all(&inbox).unwrap();
    fs::write(inbox.join("first.txt"), INVOICE).unwrap();
    fs::write(inbox.join("second.txt"), "Globex Corporation\nTotal: $99.50\n").unwrap();
    fs::write(inbox.join("empty.txt"), "   ").unwrap();
    fs::write(inbox.join("ignored.json"), "{}").unwrap();

    invparse(&config)
        .arg("batch")
        .arg(format!("{}/*", inbox.display()))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error", "--jobs", "2"])
        .assert()
        .success();

    assert!(out.join("first.json").exists());
    assert!(out.join("second.json").exists());
    assert!(!out.join("empty.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 4);
    assert!(summary.contains("second.txt,success,Globex Corporation__second"));
    assert!(summary.contains("empty.txt,error"));
}

#[test]
fn batch_stops_on_first_error() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("empty.txt"), "").unwrap();

    invparse(&config)
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn due_lists_invoices_in_window() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("acme.txt"), INVOICE).unwrap();
    let pattern = format!("{}/*.txt", dir.path().display());

    invparse(&config)
        .args(["due", &pattern, "--today", "2024-03-25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INV-1001"));

    invparse(&config)
        .args(["due", &pattern, "--today", "2024-03-25", "--days", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No invoices due"));
}

#[test]
fn due_rejects_window_past_calendar() {
    let (dir, config) = workspace();
    fs::write(dir.path().join("acme.txt"), INVOICE).unwrap();
    let pattern = format!("{}/*.txt", dir.path().display());

    invparse(&config)
        .args(["due", &pattern, "--today", "2024-03-25", "--days", "200000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reaches past the supported date range"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.json");

    invparse(&config).args(["config", "init"]).assert().success();
    assert!(config.exists());

    invparse(&config)
        .args(["config", "get", "extraction.vendor_scan_lines"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20"));

    invparse(&config)
        .args(["config", "set", "extraction.fallback_vendor", "Unassigned"])
        .assert()
        .success();

    invparse(&config)
        .args(["process", "-", "--format", "text"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vendor: Unassigned"));

    invparse(&config)
        .args(["config", "set", "extraction.vendor_scan_lines", "0"])
        .assert()
        .failure();

    invparse(&config)
        .args(["config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure();
}
