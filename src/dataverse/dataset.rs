// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Thin per-PID wrapper over the dataset endpoints: metadata edit/export, versions, publish, role assignments
// role: dataset collaborator
// inputs: one persistent identifier, bound at construction
// outputs: decoded `data` members for reads; raw API result for state-changing calls
// side_effects: one HTTP call per method; mutations are suppressed and printed in dry-run mode
// invariants:
// - every request carries persistentId as a query parameter
// - editMetadata sends replace=true only when replace is on, never replace=false
// errors: non-2xx responses surface as failures with method, URL, status and body
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use serde_json::Value;

use crate::ext::serde_json::JsonFetch;

use super::http::Transport;

const PID_PATH: &str = "/api/datasets/:persistentId";

pub struct DatasetApi {
  transport: Transport,
  pid: String,
}

impl DatasetApi {
  pub fn new(transport: Transport, pid: &str) -> DatasetApi {
    DatasetApi { transport, pid: pid.to_string() }
  }

  pub fn pid(&self) -> &str {
    &self.pid
  }

  /// One dataset version (`:latest`, `:draft` or a number) with its `files`
  /// array, unwrapped from the `data` member.
  pub fn get_version(&self, version: &str) -> Result<Value> {
    let path = format!("{PID_PATH}/versions/{version}");
    let response = self.transport.get_json(&path, &[("persistentId", &self.pid)])?;
    response.fetch("data").required()
  }

  /// PUT the `{"fields": [...]}` envelope. Dataverse treats a missing
  /// `replace` parameter as add-only, so the parameter is attached only when
  /// replacing.
  pub fn edit_metadata(&self, envelope: &Value, replace: bool) -> Result<Value> {
    let path = format!("{PID_PATH}/editMetadata");
    let mut params: Vec<(&str, &str)> = vec![("persistentId", &self.pid)];
    if replace {
      params.push(("replace", "true"));
    }
    self.transport.send_json("PUT", &path, &params, Some(envelope))
  }

  /// Metadata export in the given exporter format, as raw text. Works for
  /// published datasets only.
  pub fn metadata_export(&self, exporter: &str) -> Result<String> {
    self.transport.get_text(
      "/api/datasets/export",
      &[("exporter", exporter), ("persistentId", &self.pid)],
      "*/*",
    )
  }

  /// Delete the draft version. Fails on the server side when no draft exists.
  pub fn delete_draft(&self) -> Result<Value> {
    let path = format!("{PID_PATH}/versions/:draft");
    self.transport.send_json("DELETE", &path, &[("persistentId", &self.pid)], None)
  }

  pub fn publish(&self, version_upgrade_type: &str) -> Result<Value> {
    let path = format!("{PID_PATH}/actions/:publish");
    self.transport.send_json(
      "POST",
      &path,
      &[("persistentId", &self.pid), ("type", version_upgrade_type)],
      None,
    )
  }

  /// Current role assignments on the dataset, unwrapped from `data`.
  pub fn role_assignments(&self) -> Result<Vec<Value>> {
    let path = format!("{PID_PATH}/assignments");
    let response = self.transport.get_json(&path, &[("persistentId", &self.pid)])?;
    response.fetch("data").required()
  }
}
