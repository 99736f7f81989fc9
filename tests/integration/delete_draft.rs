use assert_cmd::Command;
use predicates::prelude::*;
use test_support::{tempdir, write_config, StubServer};

#[test]
fn declining_the_confirmation_aborts_before_any_request() {
  // No server behind this URL; reaching it would fail differently.
  let dir = tempdir();
  let config = write_config(dir.path(), "http://127.0.0.1:9");

  Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["dataset", "delete-draft", "doi:10.5072/FK2/AB6NR1"])
    .write_stdin("n\n")
    .assert()
    .failure()
    .stdout(predicate::str::contains("Are you sure? (y/n):"))
    .stderr(predicate::str::contains("cancelled"));
}

#[test]
fn yes_skips_the_confirmation_and_deletes() {
  let server = StubServer::start(vec![(
    "200 OK",
    r#"{"status":"OK","data":{"message":"Draft version of dataset 17 deleted"}}"#,
  )]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["dataset", "delete-draft", "doi:10.5072/FK2/AB6NR1", "--yes"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let requests = server.finish();
  assert!(
    requests[0].starts_with("DELETE /api/datasets/:persistentId/versions/:draft"),
    "request was: {}",
    requests[0]
  );
}
