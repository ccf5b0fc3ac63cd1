//! Integration tests for the rateq CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd,
//! against the sample rate book written by `rateq init`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a rateq command with logging pinned down
fn rateq() -> Command {
    let mut cmd = Command::cargo_bin("rateq").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("RATEQ_TIER")
        .env_remove("RATEQ_WAREHOUSE")
        .env_remove("RATEQ_FUEL_RATE");
    cmd
}

/// Helper to create a sample project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    rateq().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Standard parcel: 12x10x8 in, 3 lb, dim weight 4.32 lb
const PARCEL: [&str; 8] = ["-L", "12", "-W", "10", "-H", "8", "--weight", "3"];

fn quote_json(tmp: &TempDir, extra: &[&str]) -> serde_json::Value {
    let output = rateq()
        .current_dir(tmp.path())
        .args(["quote", "--wh", "91730", "--zip", "75001", "-f", "json"])
        .args(PARCEL)
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn channel<'a>(outcome: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    outcome["channels"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["channel"] == name)
        .unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    rateq()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quote"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    rateq()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a rateq project"));
}

#[test]
fn test_completions() {
    rateq()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rateq"));
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_writes_sample_book() {
    let tmp = TempDir::new().unwrap();
    rateq()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized rate book"));

    assert!(tmp.path().join(".rateq/config.yaml").is_file());
    assert!(tmp.path().join("channels.yaml").is_file());
    assert!(tmp.path().join("rates/T1.yaml").is_file());
}

#[test]
fn test_init_twice_keeps_existing_project() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Quote
// ============================================================================

#[test]
fn test_quote_table_lists_channels() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args(["quote", "--wh", "91730", "--zip", "75001"])
        .args(PARCEL)
        .assert()
        .success()
        .stdout(predicate::str::contains("GOFO"))
        .stdout(predicate::str::contains("$7.26"));
}

#[test]
fn test_quote_json_prices_gofo() {
    let tmp = setup_test_project();
    let outcome = quote_json(&tmp, &[]);

    assert_eq!(outcome["tier"], "T1");
    let gofo = channel(&outcome, "GOFO");
    assert_eq!(gofo["outcome"], "priced");
    assert_eq!(gofo["zone"], 5);
    assert_eq!(gofo["billable_weight"].as_f64().unwrap(), 5.0);
    assert!((gofo["total"].as_f64().unwrap() - 7.26).abs() < 1e-9);
}

#[test]
fn test_quote_reports_every_channel_in_order() {
    let tmp = setup_test_project();
    let outcome = quote_json(&tmp, &[]);
    let names: Vec<&str> = outcome["channels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["channel"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 10);
    assert_eq!(names[0], "GOFO");
    assert_eq!(names[9], "XLmiles");
}

#[test]
fn test_quote_excludes_unserved_warehouse_channels() {
    let tmp = setup_test_project();
    let output = rateq()
        .current_dir(tmp.path())
        .args(["quote", "--wh", "08691", "--zip", "75001", "-f", "json"])
        .args(PARCEL)
        .output()
        .unwrap();
    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let gofo = channel(&outcome, "GOFO");
    assert_eq!(gofo["outcome"], "excluded");
    assert_eq!(gofo["reason"]["kind"], "warehouse_not_served");
}

#[test]
fn test_quote_no_quotes_explains_causes() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args(["quote", "--wh", "63461", "--zip", "75001"])
        .args(PARCEL)
        .assert()
        .success()
        .stdout(predicate::str::contains("No quotes available"))
        .stdout(predicate::str::contains(
            "the selected warehouse does not support these channels",
        ));
}

#[test]
fn test_quote_no_quotes_in_json() {
    let tmp = setup_test_project();
    let output = rateq()
        .current_dir(tmp.path())
        .args(["quote", "--wh", "63461", "--zip", "75001", "-f", "json"])
        .args(PARCEL)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(outcome["no_quotes"]["causes"][0], "unsupported_warehouse");
    let exclusions = outcome["no_quotes"]["exclusions"].as_array().unwrap();
    assert_eq!(exclusions.len(), outcome["channels"].as_array().unwrap().len());
}

#[test]
fn test_quote_no_quotes_in_csv() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args(["quote", "--wh", "63461", "--zip", "75001", "-f", "csv"])
        .args(PARCEL)
        .assert()
        .success()
        .stdout(predicate::str::contains(",no_quotes,"))
        .stdout(predicate::str::contains(
            "the selected warehouse does not support these channels",
        ));
}

#[test]
fn test_quote_reports_all_input_errors_together() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args([
            "quote", "--wh", "91730", "--zip", "123", "-L", "0", "-W", "10", "-H", "10",
            "--weight", "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("5 digits"))
        .stderr(predicate::str::contains("weight must be greater than 0"));
}

#[test]
fn test_quote_unknown_warehouse_fails() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args(["quote", "--wh", "99999", "--zip", "75001"])
        .args(PARCEL)
        .assert()
        .failure()
        .stderr(predicate::str::contains("99999"));
}

#[test]
fn test_quote_with_project_flag() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();
    rateq()
        .current_dir(elsewhere.path())
        .arg("--project")
        .arg(tmp.path())
        .args(["quote", "--wh", "91730", "--zip", "75001", "-f", "csv"])
        .args(PARCEL)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("channel,outcome,zone"))
        .stdout(predicate::str::contains("GOFO,priced,5,5,7.26"));
}

#[test]
fn test_quote_refuses_broken_rate_book() {
    let tmp = setup_test_project();
    let channels = tmp.path().join("channels.yaml");
    let content = fs::read_to_string(&channels).unwrap();
    fs::write(
        &channels,
        format!("{}\n- name: Phantom\n  allow_wh: [\"00000\"]\n", content),
    )
    .unwrap();

    rateq()
        .current_dir(tmp.path())
        .args(["quote", "--wh", "91730", "--zip", "75001"])
        .args(PARCEL)
        .assert()
        .failure()
        .stderr(predicate::str::contains("integrity"));
}

// ============================================================================
// Check / Zip
// ============================================================================

#[test]
fn test_check_flags_oversize_package() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args(["check", "-L", "120", "-W", "40", "-H", "40", "--weight", "180", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fedex_std,failed"));
}

#[test]
fn test_zip_lookup() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args(["zip", "75001", "--wh", "91730"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Addison"));

    let output = rateq()
        .current_dir(tmp.path())
        .args(["zip", "75001", "--wh", "91730", "-f", "json"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["zones"][0]["gofo"], 5);
    assert_eq!(report["remote"], false);
}

// ============================================================================
// Status / Validate
// ============================================================================

#[test]
fn test_status_shows_tiers() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("XLmiles"))
        .stdout(predicate::str::contains("T3"));
}

#[test]
fn test_validate_sample_book() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rate book is consistent"));
}

#[test]
fn test_validate_reports_yaml_error() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("warehouses.yaml"), "\"91730\": { name: [unclosed\n").unwrap();
    rateq()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("warehouses.yaml"));
}

// ============================================================================
// Import
// ============================================================================

#[test]
fn test_import_replaces_channel_rates() {
    let tmp = setup_test_project();
    let csv = tmp.path().join("gofo.csv");
    fs::write(
        &csv,
        "GOFO rate card,,\nWeight (lb),Zone 2,Zone 5\n1 lb,$2.00,$2.50\n10 lb,$3.00,$3.33\n",
    )
    .unwrap();

    rateq()
        .current_dir(tmp.path())
        .args(["import", "rates"])
        .arg(&csv)
        .args(["--tier", "T1", "--channel", "GOFO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 row(s)"));

    let outcome = quote_json(&tmp, &[]);
    let gofo = channel(&outcome, "GOFO");
    assert!((gofo["base_price"].as_f64().unwrap() - 3.33).abs() < 1e-9);

    let t1 = fs::read_to_string(tmp.path().join("rates/T1.yaml")).unwrap();
    assert!(t1.contains("gofo.csv"));
}

#[test]
fn test_import_dry_run_leaves_file() {
    let tmp = setup_test_project();
    let before = fs::read_to_string(tmp.path().join("rates/T2.yaml")).unwrap();
    let csv = tmp.path().join("card.csv");
    fs::write(&csv, "Weight (oz),Zone 2\n8 oz,1.99\n").unwrap();

    rateq()
        .current_dir(tmp.path())
        .args(["import", "rates"])
        .arg(&csv)
        .args(["--tier", "T2", "--channel", "UNIUNI-MT", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 row(s) parsed"));

    let after = fs::read_to_string(tmp.path().join("rates/T2.yaml")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_import_unknown_channel_fails() {
    let tmp = setup_test_project();
    let csv = tmp.path().join("card.csv");
    fs::write(&csv, "Weight (lb),Zone 2\n1,1.99\n").unwrap();

    rateq()
        .current_dir(tmp.path())
        .args(["import", "rates"])
        .arg(&csv)
        .args(["--tier", "T1", "--channel", "Pony-Express"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pony-Express"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_default_warehouse() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args(["config", "set", "default_warehouse", "91730"])
        .assert()
        .success();

    rateq()
        .current_dir(tmp.path())
        .args(["config", "show", "default_warehouse"])
        .assert()
        .success()
        .stdout(predicate::str::contains("91730"));

    rateq()
        .current_dir(tmp.path())
        .args(["quote", "--zip", "75001"])
        .args(PARCEL)
        .assert()
        .success()
        .stdout(predicate::str::contains("GOFO"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let tmp = setup_test_project();
    rateq()
        .current_dir(tmp.path())
        .args(["config", "set", "author", "me"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key"));
}
