use assert_cmd::Command;
use test_support::{tempdir, write_config, StubServer};

#[test]
fn adding_a_role_posts_and_reports_the_change() {
  let server = StubServer::start(vec![
    ("200 OK", r#"{"status":"OK","data":[]}"#),
    (
      "200 OK",
      r#"{"status":"OK","data":{"id":9,"assignee":"@datamanager","_roleAlias":"contributor"}}"#,
    ),
  ]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());
  let report_file = dir.path().join("roles.csv");

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["dataverse", "role-assignment", "add", "@datamanager=contributor", "storage"])
    .arg("--report-file")
    .arg(&report_file)
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let requests = server.finish();
  assert!(
    requests[0].starts_with("GET /api/dataverses/storage/assignments"),
    "request was: {}",
    requests[0]
  );
  assert!(
    requests[1].starts_with("POST /api/dataverses/storage/assignments"),
    "request was: {}",
    requests[1]
  );
  assert!(requests[1].contains("X-Dataverse-key: test-token"), "request was: {}", requests[1]);
  assert!(requests[1].contains(r#""assignee":"@datamanager""#), "request was: {}", requests[1]);

  let report = std::fs::read_to_string(&report_file).unwrap();
  assert!(report.starts_with("alias,Modified,Assignee,Role,Change"), "report was: {report}");
  let row = report.lines().nth(1).unwrap();
  assert!(row.starts_with("storage,"), "report was: {report}");
  assert!(row.ends_with(",@datamanager,contributor,Added"), "report was: {report}");
}

#[test]
fn an_existing_assignment_is_left_alone() {
  let server = StubServer::start(vec![(
    "200 OK",
    r#"{"status":"OK","data":[{"id":3,"assignee":"@datamanager","_roleAlias":"contributor"}]}"#,
  )]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());
  let report_file = dir.path().join("roles.csv");

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["dataverse", "role-assignment", "add", "@datamanager=contributor", "storage"])
    .arg("--report-file")
    .arg(&report_file)
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  // Only the GET: nothing to add.
  let requests = server.finish();
  assert_eq!(requests.len(), 1);
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(
    stderr.contains("@datamanager is already contributor for dataverse storage"),
    "stderr was: {stderr}"
  );

  let report = std::fs::read_to_string(&report_file).unwrap();
  assert!(report.lines().nth(1).unwrap().ends_with(",None"), "report was: {report}");
}

#[test]
fn removing_a_role_deletes_the_matching_assignment() {
  let server = StubServer::start(vec![
    (
      "200 OK",
      r#"{"status":"OK","data":[{"id":12,"assignee":"@datamanager","_roleAlias":"contributor"}]}"#,
    ),
    ("200 OK", r#"{"status":"OK","data":{"message":"Role assignment 12 revoked"}}"#),
  ]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());
  let report_file = dir.path().join("roles.csv");

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["dataverse", "role-assignment", "remove", "@datamanager=contributor", "storage"])
    .arg("--report-file")
    .arg(&report_file)
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let requests = server.finish();
  assert!(
    requests[1].starts_with("DELETE /api/dataverses/storage/assignments/12"),
    "request was: {}",
    requests[1]
  );

  let report = std::fs::read_to_string(&report_file).unwrap();
  assert!(report.lines().nth(1).unwrap().ends_with(",Removed"), "report was: {report}");
}

#[test]
fn aliases_can_come_from_a_file() {
  // Two aliases, one GET each; neither has the assignment.
  let server = StubServer::start(vec![
    ("200 OK", r#"{"status":"OK","data":[]}"#),
    ("200 OK", r#"{"status":"OK","data":[]}"#),
  ]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());
  let aliases = dir.path().join("aliases.txt");
  std::fs::write(&aliases, "alias\nstorage\narchive\n").unwrap();

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["dataverse", "role-assignment", "remove", "@datamanager=contributor"])
    .arg(&aliases)
    .args(["--wait", "0"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let requests = server.finish();
  assert!(requests[0].contains("/api/dataverses/storage/"), "request was: {}", requests[0]);
  assert!(requests[1].contains("/api/dataverses/archive/"), "request was: {}", requests[1]);

  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("Start batch processing on 2 entries"), "stderr was: {stderr}");
}
