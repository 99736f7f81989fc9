use assert_cmd::Command;
use predicates::prelude::*;
use test_support::{tempdir, write_config};

#[test]
fn a_subcommand_is_required() {
  let dir = tempdir();
  let config = write_config(dir.path(), "http://localhost:20346");
  Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .assert()
    .failure()
    .stderr(predicate::str::contains("subcommand"));
}

#[test]
fn a_missing_config_file_names_its_path() {
  Command::cargo_bin("dv-batch")
    .unwrap()
    .args(["--config", "/does/not/exist.yml", "dataset", "list"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("/does/not/exist.yml"));
}

#[test]
fn edit_metadata_rejects_a_file_combined_with_values() {
  let dir = tempdir();
  let config = write_config(dir.path(), "http://localhost:20346");
  let updates = dir.path().join("updates.csv");
  std::fs::write(&updates, "PID,title\ndoi:10.5072/FK2/AB6NR1,New\n").unwrap();

  Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["dataset", "edit-metadata"])
    .arg(&updates)
    .args(["-v", "title=clash"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be combined"));
}

#[test]
fn attributes_without_pid_or_all_is_a_usage_error() {
  // Rejected by argument parsing, before any config is read.
  Command::cargo_bin("dv-batch")
    .unwrap()
    .args(["dataset", "attributes", "--storage"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Usage"));
}

#[test]
fn mailing_a_stdout_report_is_rejected() {
  let dir = tempdir();
  let config = write_config(dir.path(), "http://localhost:20346");
  Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["deposit", "report", "--email-to", "datamanager@example.nl"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--output-file"));
}
