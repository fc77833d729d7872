mod common;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

use common::TestWorkspace;

const MESSY_SALES: &str = "\
Order Date,Customer,Total,Price,Notes
01/02/2026,Bob,\"$10.00\",,first
15/01/2026,,\"1.234,56 TL\",99,second
2026-01-02,Bob,10,,first
,,,,
bad-date,Carl,free,,third
";

#[test]
fn clean_produces_canonical_table_and_summary() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", MESSY_SALES);
    let output = workspace.path().join("cleaned.csv");
    let summary = workspace.path().join("summary.json");

    Command::cargo_bin("csv-refine")
        .expect("binary")
        .args(["clean", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success()
        .stdout(contains("rows_before").and(contains("duplicates_removed")));

    let cleaned = std::fs::read_to_string(&output).expect("cleaned output");
    let header = cleaned.lines().next().expect("header line");
    assert!(header.starts_with(
        "\"order_date\",\"customer_name\",\"product\",\"category\",\"amount\",\"payment_status\",\"city\",\"country\""
    ));
    assert!(header.ends_with("\"Notes\""));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).expect("summary file"))
            .expect("summary JSON");
    assert_eq!(summary["rows_before"], 5);
    assert_eq!(summary["rows_after"], 2);
    assert_eq!(summary["empty_rows_dropped"], 1);
    assert_eq!(summary["duplicates_removed"], 1);
    assert_eq!(summary["invalid_dates"], 1);
    assert_eq!(summary["filled_customer"], 1);
    let warnings = summary["warnings"].as_array().expect("warnings array");
    assert!(
        warnings
            .iter()
            .any(|w| w.as_str().unwrap_or("").contains("Merged 2 columns into 'amount'"))
    );

    // Locale-ambiguous values resolved: both spellings landed on the same day
    // and the European amount parsed.
    assert!(cleaned.contains("\"2026-01-15\""));
    assert!(cleaned.contains("\"1234.56\""));
}

#[test]
fn clean_keep_policies_retain_invalid_rows() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "sales.csv",
        "date,Total\nnot-a-date,free\n2026-01-01,10\n",
    );
    let output = workspace.path().join("cleaned.csv");

    Command::cargo_bin("csv-refine")
        .expect("binary")
        .args(["clean", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--invalid-dates", "keep", "--invalid-amounts", "keep"])
        .assert()
        .success();

    let cleaned = std::fs::read_to_string(&output).expect("cleaned output");
    // Header plus both rows survive under keep/keep.
    assert_eq!(cleaned.lines().count(), 3);
}

#[test]
fn clean_fails_without_an_amount_column() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", "Order Date,Customer\n2026-01-01,Bob\n");

    Command::cargo_bin("csv-refine")
        .expect("binary")
        .args(["clean", "-i"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("Missing required column: amount"));
}

#[test]
fn clean_fails_on_empty_input() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", "Order Date,Total\n");

    Command::cargo_bin("csv-refine")
        .expect("binary")
        .args(["clean", "-i"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("no rows"));
}

#[test]
fn clean_rejects_unknown_policy_values() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", "date,Total\n2026-01-01,10\n");

    Command::cargo_bin("csv-refine")
        .expect("binary")
        .args(["clean", "-i"])
        .arg(&input)
        .args(["--invalid-dates", "sometimes"])
        .assert()
        .failure()
        .stderr(contains("Invalid invalid-date policy value 'sometimes'"));
}
