use assert_cmd::Command;
use predicates::prelude::*;
use test_support::{tempdir, write_config};

#[test]
fn dry_run_prints_the_request_instead_of_sending() {
  // No server behind this URL; an attempted send would fail the run.
  let dir = tempdir();
  let config = write_config(dir.path(), "http://127.0.0.1:9");

  Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args([
      "--dry-run",
      "dataset",
      "edit-metadata",
      "doi:10.5072/FK2/AB6NR1",
      "-v",
      "title=Changed",
      "--replace",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("DRY-RUN: only printing request, not sending it..."))
    .stdout(predicate::str::contains(
      "PUT http://127.0.0.1:9/api/datasets/:persistentId/editMetadata",
    ))
    .stdout(predicate::str::contains("params: persistentId=doi:10.5072/FK2/AB6NR1, replace=true"))
    .stdout(predicate::str::contains(r#""typeName":"title""#))
    // The run still produces its report, on stdout by default.
    .stdout(predicate::str::contains("DOI,Modified,Change"))
    .stdout(predicate::str::contains("doi:10.5072/FK2/AB6NR1"));
}

#[test]
fn dry_run_delete_draft_skips_the_confirmation() {
  let dir = tempdir();
  let config = write_config(dir.path(), "http://127.0.0.1:9");

  Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["--dry-run", "dataset", "delete-draft", "doi:10.5072/FK2/AB6NR1"])
    .assert()
    .success()
    .stdout(predicate::str::contains("DELETE"))
    .stdout(predicate::str::contains("versions/:draft"));
}
