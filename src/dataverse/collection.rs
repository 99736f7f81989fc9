use anyhow::Result;
use serde_json::{json, Value};

use crate::ext::serde_json::JsonFetch;

use super::http::Transport;

/// Thin wrapper over the collection ("dataverse") endpoints for one alias.
pub struct CollectionApi {
  transport: Transport,
  alias: String,
}

impl CollectionApi {
  pub fn new(transport: Transport, alias: &str) -> CollectionApi {
    CollectionApi { transport, alias: alias.to_string() }
  }

  pub fn alias(&self) -> &str {
    &self.alias
  }

  pub fn role_assignments(&self) -> Result<Vec<Value>> {
    let path = format!("/api/dataverses/{}/assignments", self.alias);
    let response = self.transport.get_json(&path, &[])?;
    response.fetch("data").required()
  }

  pub fn assign_role(&self, assignee: &str, role: &str) -> Result<Value> {
    let path = format!("/api/dataverses/{}/assignments", self.alias);
    self.transport.send_json("POST", &path, &[], Some(&json!({"assignee": assignee, "role": role})))
  }

  pub fn delete_role_assignment(&self, assignment_id: u64) -> Result<Value> {
    let path = format!("/api/dataverses/{}/assignments/{assignment_id}", self.alias);
    self.transport.send_json("DELETE", &path, &[], None)
  }
}
