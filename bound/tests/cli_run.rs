//! CLI tests for `bound run` and `bound init`.
//!
//! Spawns the bound binary and checks the JSON report and exit codes.

use std::process::{Command, Output};

use bound::exit_codes;
use bound::io::config::{BoundConfig, BoundarySpec, SequenceConfig, write_config};
use bound::sequences::SequenceKind;
use serde_json::Value;

fn bound(args: &[&str], dir: &std::path::Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bound"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn bound")
}

fn report(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("json report")
}

#[test]
fn run_with_times_flag_reports_last_value() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = bound(&["run", "--times", "8"], temp.path());
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let report = report(&output);
    assert_eq!(report["boundary"], "times(8)");
    assert_eq!(report["stop"], "signal");
    assert_eq!(report["produced"], 8);
    assert_eq!(report["last"], 21);
    assert!(report.get("values").is_none());
}

#[test]
fn run_with_config_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("bound.toml");
    let cfg = BoundConfig {
        sequence: SequenceConfig {
            kind: SequenceKind::Naturals,
            wait_ms: 0,
        },
        boundary: BoundarySpec::Any {
            children: vec![
                BoundarySpec::Accumulated {
                    threshold: Some(10),
                },
                BoundarySpec::Times { n: Some(100) },
            ],
        },
    };
    write_config(&path, &cfg).expect("write config");

    let output = bound(&["run", "--config", "bound.toml", "--all"], temp.path());
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let report = report(&output);
    assert_eq!(report["boundary"], "any_of(accumulated(10), times(100))");
    assert_eq!(report["last"], 4);
    assert_eq!(report["values"], serde_json::json!([0, 1, 2, 3, 4]));
}

#[test]
fn zero_budget_produces_an_empty_report() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = bound(&["run", "--timed", "0"], temp.path());
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let report = report(&output);
    assert_eq!(report["stop"], "initial");
    assert_eq!(report["produced"], 0);
    assert_eq!(report["last"], Value::Null);
}

#[test]
fn missing_parameter_in_config_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        temp.path().join("bound.toml"),
        "[boundary]\nkind = \"all\"\n\n[[boundary.children]]\nkind = \"times\"\n",
    )
    .expect("write config");

    let output = bound(&["run", "--config", "bound.toml"], temp.path());
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("`times` must be configured with `n`"));
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let first = bound(&["init"], temp.path());
    assert_eq!(first.status.code(), Some(exit_codes::OK));
    assert!(temp.path().join("bound.toml").exists());

    let again = bound(&["init"], temp.path());
    assert_eq!(again.status.code(), Some(exit_codes::INVALID));

    let forced = bound(&["init", "--force"], temp.path());
    assert_eq!(forced.status.code(), Some(exit_codes::OK));

    let output = bound(&["run", "--config", "bound.toml"], temp.path());
    assert_eq!(report(&output)["boundary"], "times(10)");
}

#[test]
fn accumulated_at_the_integer_limit_does_not_crash() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = bound(&["run", "--accumulated", "18446744073709551615"], temp.path());
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let report = report(&output);
    assert_eq!(report["stop"], "signal");
    assert_eq!(report["produced"], 92);
}
