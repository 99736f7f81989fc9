use assert_cmd::Command;
use test_support::{tempdir, write_config, StubServer};

#[test]
fn exports_land_in_the_output_dir_named_after_the_pid() {
  let body = r#"{"datasetVersion":{"metadataBlocks":{}}}"#;
  let server = StubServer::start(vec![("200 OK", body)]);
  let dir = tempdir();
  let config = write_config(dir.path(), server.url());
  let output_dir = dir.path().join("exports");

  let out = Command::cargo_bin("dv-batch")
    .unwrap()
    .arg("--config")
    .arg(&config)
    .args(["dataset", "retrieve-metadata", "doi:10.5072/FK2/AB6NR1", "-o"])
    .arg(&output_dir)
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let requests = server.finish();
  assert!(requests[0].starts_with("GET /api/datasets/export?"), "request was: {}", requests[0]);
  assert!(requests[0].contains("exporter=dataverse_json"), "request was: {}", requests[0]);

  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("Creating output dir"), "stderr was: {stderr}");

  let exported = output_dir.join("doi-10-5072-FK2-AB6NR1.json");
  assert_eq!(std::fs::read_to_string(&exported).unwrap(), body);
}
