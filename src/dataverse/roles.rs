// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Idempotent role-assignment changes on collections, keyed by (assignee, role), with one audit row per alias
// role: orchestration
// inputs: an ASSIGNEE=ROLE pair, a collection alias, the shared CSV report
// outputs: audit row alias,Modified,Assignee,Role,Change with Change one of Added/Removed/None
// side_effects: one assignments GET per call; POST/DELETE only when the pair is absent/present
// invariants:
// - a pair already in place is never re-added; an absent pair is never deleted
// - the audit row is written on every successful call, including no-ops
// errors: HTTP failures propagate before the row is written
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use log::info;
use serde_json::Value;

use crate::ext::serde_json::JsonFetch;
use crate::report::{timestamp, CsvReport};

use super::DataverseClient;

pub const ROLE_REPORT_COLUMNS: [&str; 5] = ["alias", "Modified", "Assignee", "Role", "Change"];

/// An `assignee=role` pair as given on the command line, e.g.
/// `@dataverseAdmin=contributor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
  pub assignee: String,
  pub role: String,
}

impl FromStr for RoleSpec {
  type Err = anyhow::Error;

  fn from_str(raw: &str) -> Result<RoleSpec> {
    match raw.split_once('=') {
      Some((assignee, role)) if !assignee.is_empty() && !role.is_empty() => {
        Ok(RoleSpec { assignee: assignee.to_string(), role: role.to_string() })
      }
      _ => bail!("expected ASSIGNEE=ROLE, e.g. @dataverseAdmin=contributor"),
    }
  }
}

pub struct RoleAssignment<'a> {
  client: &'a DataverseClient,
}

impl<'a> RoleAssignment<'a> {
  pub fn new(client: &'a DataverseClient) -> RoleAssignment<'a> {
    RoleAssignment { client }
  }

  /// Current assignments of the collection as pretty-printed JSON.
  pub fn list(&self, alias: &str) -> Result<String> {
    let assignments = self.client.collection(alias).role_assignments()?;
    serde_json::to_string_pretty(&assignments).context("rendering role assignments")
  }

  /// Grant the role unless the pair is already assigned; always append an
  /// audit row.
  pub fn add(&self, spec: &RoleSpec, alias: &str, report: &mut CsvReport) -> Result<()> {
    let collection = self.client.collection(alias);
    let assignments = collection.role_assignments()?;

    let change = if assignments.iter().any(|a| matches(a, spec)) {
      info!("{} is already {} for dataverse {alias}", spec.assignee, spec.role);
      "None"
    } else {
      info!("Adding {} as {} for dataverse {alias}", spec.assignee, spec.role);
      collection.assign_role(&spec.assignee, &spec.role)?;
      "Added"
    };
    write_row(report, alias, spec, change)
  }

  /// Revoke the role if the pair is assigned; always append an audit row.
  pub fn remove(&self, spec: &RoleSpec, alias: &str, report: &mut CsvReport) -> Result<()> {
    let collection = self.client.collection(alias);
    let assignments = collection.role_assignments()?;

    let change = match assignments.iter().find(|a| matches(a, spec)) {
      Some(assignment) => {
        info!("Removing {} as {} for dataverse {alias}", spec.assignee, spec.role);
        let id = assignment.fetch("id").required()?;
        collection.delete_role_assignment(id)?;
        "Removed"
      }
      None => {
        info!("{} is not {} for dataverse {alias}", spec.assignee, spec.role);
        "None"
      }
    };
    write_row(report, alias, spec, change)
  }
}

fn matches(assignment: &Value, spec: &RoleSpec) -> bool {
  assignment.fetch("assignee").to::<String>().as_deref() == Some(spec.assignee.as_str())
    && assignment.fetch("_roleAlias").to::<String>().as_deref() == Some(spec.role.as_str())
}

fn write_row(report: &mut CsvReport, alias: &str, spec: &RoleSpec, change: &str) -> Result<()> {
  report.write(&[
    ("alias", alias.to_string()),
    ("Modified", timestamp()),
    ("Assignee", spec.assignee.clone()),
    ("Role", spec.role.clone()),
    ("Change", change.to_string()),
  ])
}
