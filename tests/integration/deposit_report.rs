use assert_cmd::Command;
use test_support::{tempdir, write_config, StubServer};

#[test]
fn the_report_is_saved_as_requested() {
  let body = "depositor,state,created\nuser001,SUBMITTED,2025-01-01\n";
  let server = StubServer::start(vec![("200 OK", body)]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());
  let output = dir.path().join("deposits.csv");

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["deposit", "report", "-u", "user001", "-o"])
    .arg(&output)
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let requests = server.finish();
  assert!(requests[0].starts_with("GET /report?user=user001"), "request was: {}", requests[0]);
  assert!(requests[0].contains("Accept: text/csv"), "request was: {}", requests[0]);
  // The manage-deposit service runs without the Dataverse token.
  assert!(!requests[0].contains("X-Dataverse-key"), "request was: {}", requests[0]);

  assert_eq!(std::fs::read_to_string(&output).unwrap(), body);
}

#[test]
fn json_format_adjusts_the_accept_header() {
  let server = StubServer::start(vec![("200 OK", r#"[{"depositor":"user001"}]"#)]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["deposit", "report", "-f", "json"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let requests = server.finish();
  assert!(requests[0].contains("Accept: application/json"), "request was: {}", requests[0]);
  assert!(
    String::from_utf8_lossy(&out.stdout).contains(r#"[{"depositor":"user001"}]"#),
    "stdout was: {}",
    String::from_utf8_lossy(&out.stdout)
  );
}

#[test]
fn clean_posts_the_filter_and_prints_the_reply() {
  let server = StubServer::start(vec![("200 OK", "2 deposits deleted")]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["deposit", "clean", "-t", "REJECTED", "--yes"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let requests = server.finish();
  assert!(requests[0].starts_with("POST /delete-deposit?state=REJECTED"), "request was: {}", requests[0]);
  assert!(
    String::from_utf8_lossy(&out.stdout).contains("2 deposits deleted"),
    "stdout was: {}",
    String::from_utf8_lossy(&out.stdout)
  );
}
