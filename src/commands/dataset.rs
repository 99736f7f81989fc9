// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dataset subcommand runners; turn parsed args into batch runs against the dataset API
// role: command orchestration
// inputs: parsed dataset subcommand, dataverse configuration, dry-run flag
// outputs: API side effects per entry; JSON/PIDs on stdout; a CSV report for edit-metadata
// side_effects: HTTP requests, files under --output-dir, stdout
// invariants:
// - edit-metadata rejects --value combined with a CSV file, and requires --value for a bare PID
// - delete-draft asks for confirmation unless --yes or --dry-run
// errors: input validation fails before the batch starts; per-entry errors follow the batch policy
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::{
  AttributesArgs, DatasetCommand, DeleteDraftArgs, EditMetadataArgs, FieldAssignment, ListArgs,
  PublishArgs, RetrieveMetadataArgs,
};
use crate::config::Config;
use crate::dataverse::datasets::Datasets;
use crate::dataverse::DataverseClient;
use crate::entries::{self, Entries, Entry};
use crate::ext::serde_json::JsonFetch;
use crate::report::timestamp;
use crate::util;

const EDIT_REPORT_COLUMNS: [&str; 3] = ["DOI", "Modified", "Change"];

pub fn run(config: &Config, command: DatasetCommand, dry_run: bool) -> Result<()> {
  let client = DataverseClient::new(&config.dataverse, dry_run);
  match command {
    DatasetCommand::EditMetadata(args) => edit_metadata(&client, args),
    DatasetCommand::Attributes(args) => attributes(&client, args),
    DatasetCommand::RetrieveMetadata(args) => retrieve_metadata(&client, args),
    DatasetCommand::DeleteDraft(args) => delete_draft(&client, args, dry_run),
    DatasetCommand::Publish(args) => publish(&client, args),
    DatasetCommand::List(args) => list(&client, args),
  }
}

fn edit_metadata(client: &DataverseClient, args: EditMetadataArgs) -> Result<()> {
  let entries = edit_entries(&args.pid_or_file, &args.value)?;
  let datasets = Datasets::new(client);
  super::processor(&args.batch).process_with_report(
    entries,
    &args.report.report_file,
    &EDIT_REPORT_COLUMNS,
    |entry, report| {
      let Entry::Record(record) = entry else {
        bail!("no field values to apply to {}", entry.label());
      };
      datasets.update_metadata(record, args.replace)?;
      let changed: Vec<&str> = record.fields.iter().map(|(key, _)| key.as_str()).collect();
      report.write(&[
        ("DOI", record.pid.clone()),
        ("Modified", timestamp()),
        ("Change", changed.join(";")),
      ])
    },
  )?;
  Ok(())
}

/// A CSV file brings its own values; a bare PID needs at least one --value.
fn edit_entries(pid_or_file: &str, values: &[FieldAssignment]) -> Result<Entries> {
  if Path::new(pid_or_file).is_file() {
    if !values.is_empty() {
      bail!("--value cannot be combined with a CSV file of updates");
    }
    return entries::records_from_csv(pid_or_file);
  }
  if values.is_empty() {
    bail!("pass at least one --value when editing a single dataset");
  }
  let pairs: Vec<(String, String)> =
    values.iter().map(|v| (v.key.clone(), v.value.clone())).collect();
  Ok(entries::single_record(pid_or_file, &pairs))
}

fn attributes(client: &DataverseClient, args: AttributesArgs) -> Result<()> {
  let entries = match &args.pid_or_file {
    Some(pid_or_file) => entries::identifiers(pid_or_file)?,
    None => client.search().dataset_pids("*", "root"),
  };
  let datasets = Datasets::new(client);
  super::processor(&args.batch).process(entries, |entry| {
    let attributes =
      datasets.attributes(entry.label(), args.storage, args.user_with_role.as_deref())?;
    println!("{}", serde_json::to_string(&attributes)?);
    Ok(())
  })?;
  Ok(())
}

fn retrieve_metadata(client: &DataverseClient, args: RetrieveMetadataArgs) -> Result<()> {
  let output_dir = util::ensure_output_dir(&args.output_dir)?;
  let entries = entries::identifiers(&args.pid_or_file)?;
  super::processor(&args.batch).process(entries, |entry| {
    let pid = entry.label();
    let metadata = client.dataset(pid).metadata_export(&args.exporter)?;
    let destination = output_dir.join(format!("{}.json", util::filename_from_pid(pid)));
    fs::write(&destination, metadata)
      .with_context(|| format!("cannot write {}", destination.display()))?;
    Ok(())
  })?;
  Ok(())
}

fn delete_draft(client: &DataverseClient, args: DeleteDraftArgs, dry_run: bool) -> Result<()> {
  let entries = entries::identifiers(&args.pid_or_file)?;
  if !args.yes && !dry_run {
    if let Some(count) = entries.known_len() {
      println!("About to delete the draft version of {count} dataset(s).");
    }
    if !util::confirm("Are you sure?")? {
      bail!("cancelled");
    }
  }
  super::processor(&args.batch).process(entries, |entry| {
    client.dataset(entry.label()).delete_draft()?;
    Ok(())
  })?;
  Ok(())
}

fn publish(client: &DataverseClient, args: PublishArgs) -> Result<()> {
  let entries = entries::identifiers(&args.pid_or_file)?;
  super::processor(&args.batch).process(entries, |entry| {
    client.dataset(entry.label()).publish(args.version_upgrade_type.as_str())?;
    Ok(())
  })?;
  Ok(())
}

fn list(client: &DataverseClient, args: ListArgs) -> Result<()> {
  for hit in client.search().search(&args.query, &args.subtree, "dataset", args.rows) {
    let hit = hit?;
    println!("{}", hit.fetch("global_id").required::<String>()?);
  }
  Ok(())
}
