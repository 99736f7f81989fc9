// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dataset-level services: reshape-and-PUT metadata updates, storage/user attribute reports
// role: orchestration
// inputs: records (PID + flat field assignments) or bare PIDs plus attribute selectors
// outputs: raw editMetadata result; DatasetAttributes with the requested members filled in
// side_effects: one editMetadata PUT per update; one GET per requested attribute group
// invariants:
// - exactly one PUT per record, carrying every reshaped field in one envelope
// - the replace flag reaches both the reshaper and the query parameter unchanged
// errors: reshaping failures abort before any HTTP traffic
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use log::debug;
use serde::Serialize;
use serde_json::{json, Value};

use crate::entries::Record;
use crate::ext::serde_json::JsonFetch;
use crate::fields;

use super::DataverseClient;

pub struct Datasets<'a> {
  client: &'a DataverseClient,
}

/// Per-dataset report of the attribute groups that were asked for; absent
/// groups stay out of the JSON.
#[derive(Debug, Serialize)]
pub struct DatasetAttributes {
  pub pid: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub storage: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub users: Option<Vec<String>>,
}

impl<'a> Datasets<'a> {
  pub fn new(client: &'a DataverseClient) -> Datasets<'a> {
    Datasets { client }
  }

  /// Reshape the record's flat assignments into metadata fields and send them
  /// as one editMetadata call. The raw API result is logged and returned
  /// uninterpreted.
  pub fn update_metadata(&self, record: &Record, replace: bool) -> Result<Value> {
    let fields = fields::reshape(&record.fields, replace)?;
    let envelope = json!({ "fields": fields });
    debug!("{envelope}");
    let result = self.client.dataset(&record.pid).edit_metadata(&envelope, replace)?;
    debug!("{result}");
    Ok(result)
  }

  /// Collect the requested attribute groups for one PID: total storage in
  /// bytes and/or the users holding a given role (assignee handles without
  /// the `@` prefix).
  pub fn attributes(
    &self,
    pid: &str,
    storage: bool,
    user_with_role: Option<&str>,
  ) -> Result<DatasetAttributes> {
    debug!("pid={pid}");
    let dataset = self.client.dataset(pid);

    let storage = if storage {
      let version = dataset.get_version(":latest")?;
      let files = version.fetch("files").to_or_default::<Vec<Value>>();
      let total = files
        .iter()
        .map(|file| file.fetch("dataFile.filesize").to::<u64>().unwrap_or(0))
        .sum();
      Some(total)
    } else {
      None
    };

    let users = match user_with_role {
      Some(role) => {
        let assignments = dataset.role_assignments()?;
        let users = assignments
          .iter()
          .filter(|assignment| {
            assignment.fetch("_roleAlias").to::<String>().as_deref() == Some(role)
          })
          .filter_map(|assignment| assignment.fetch("assignee").to::<String>())
          .map(|assignee| assignee.replace('@', ""))
          .collect();
        Some(users)
      }
      None => None,
    };

    Ok(DatasetAttributes { pid: pid.to_string(), storage, users })
  }
}
