use anyhow::Result;

use crate::cli::{DataverseCommand, RoleAssignmentCommand, RoleChangeArgs, RoleListArgs};
use crate::config::Config;
use crate::dataverse::roles::{RoleAssignment, ROLE_REPORT_COLUMNS};
use crate::dataverse::DataverseClient;
use crate::entries;

pub fn run(config: &Config, command: DataverseCommand, dry_run: bool) -> Result<()> {
  let client = DataverseClient::new(&config.dataverse, dry_run);
  let DataverseCommand::RoleAssignment { command } = command;
  match command {
    RoleAssignmentCommand::Add(args) => change_roles(&client, args, RoleChange::Add),
    RoleAssignmentCommand::Remove(args) => change_roles(&client, args, RoleChange::Remove),
    RoleAssignmentCommand::List(args) => list(&client, args),
  }
}

enum RoleChange {
  Add,
  Remove,
}

fn change_roles(client: &DataverseClient, args: RoleChangeArgs, change: RoleChange) -> Result<()> {
  let entries = entries::identifiers(&args.alias_or_file)?;
  let roles = RoleAssignment::new(client);
  super::processor(&args.batch).process_with_report(
    entries,
    &args.report.report_file,
    &ROLE_REPORT_COLUMNS,
    |entry, report| match change {
      RoleChange::Add => roles.add(&args.role_assignment, entry.label(), report),
      RoleChange::Remove => roles.remove(&args.role_assignment, entry.label(), report),
    },
  )?;
  Ok(())
}

fn list(client: &DataverseClient, args: RoleListArgs) -> Result<()> {
  println!("{}", RoleAssignment::new(client).list(&args.alias)?);
  Ok(())
}
