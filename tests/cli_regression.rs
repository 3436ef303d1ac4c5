// Regression tests for the `trellis` binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn trellis() -> Command {
    let mut cmd = Command::cargo_bin("trellis").unwrap();
    cmd.arg("--color").arg("never");
    cmd
}

#[test]
fn cli_lists_statement_kinds() {
    trellis()
        .args(["kinds", "--family", "statement"])
        .assert()
        .success()
        .stdout(contains("Try").and(contains("Default")))
        .stdout(contains("BinaryExpression").not());
}

#[test]
fn cli_describes_a_kind() {
    trellis()
        .args(["describe", "BinaryExpression"])
        .assert()
        .success()
        .stdout(contains("operator").and(contains("raw-form=binary_operator")));
}

#[test]
fn cli_describes_a_kind_as_json() {
    let output = trellis()
        .args(["describe", "Try", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "Try");
    assert_eq!(json["checks"][0], "not_lone_try");
}

#[test]
fn cli_rejects_unknown_kinds() {
    trellis()
        .args(["describe", "Lambda"])
        .assert()
        .failure()
        .stderr(contains("trellis::contract"));
}

#[test]
fn cli_lists_unary_operators() {
    trellis()
        .args(["operators", "--category", "unary"])
        .assert()
        .success()
        .stdout(contains("LogicalNot").and(contains("+=").not()));
}

#[test]
fn cli_parses_operator_symbols() {
    trellis()
        .args(["parse-op", "binary", ">>>="])
        .assert()
        .success()
        .stdout(contains("BitwiseShiftRightAssign"));

    trellis()
        .args(["parse-op", "unary", "-"])
        .assert()
        .success()
        .stdout(contains("UnaryMinus"));
}

#[test]
fn cli_reports_miette_diagnostics_on_malformed_raw_form() {
    trellis()
        .args(["parse-op", "binary", "@@"])
        .assert()
        .failure()
        .stderr(contains("trellis::raw_form").and(contains("unknown binary operator: @@")));
}

#[test]
fn cli_prints_the_schema() {
    trellis()
        .arg("schema")
        .assert()
        .success()
        .stdout(contains("\"TypeReferencePart\""));
}

#[test]
fn cli_describe_shows_field_bounds() {
    trellis()
        .args(["describe", "TypeReference", "--color", "never"])
        .assert()
        .success()
        .stdout(contains("bounds=0..=255"));
}
