use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use crate::dataverse::roles::RoleSpec;
use crate::deposit::ReportFormat;

#[derive(Parser, Debug)]
#[command(
  name = "dv-batch",
  version,
  about = "Batch metadata operations against a Dataverse repository",
  long_about = None
)]
pub struct Cli {
  /// Path to the configuration file (default: DV_BATCH_CONFIG, then ~/.dv-batch.yml)
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  /// Print state-changing requests instead of sending them
  #[arg(long, global = true)]
  pub dry_run: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Operations on datasets addressed by PID
  Dataset {
    #[command(subcommand)]
    command: DatasetCommand,
  },
  /// Operations on dataverse collections addressed by alias
  Dataverse {
    #[command(subcommand)]
    command: DataverseCommand,
  },
  /// Reports and cleanup on the manage-deposit service
  Deposit {
    #[command(subcommand)]
    command: DepositCommand,
  },
}

#[derive(Subcommand, Debug)]
pub enum DatasetCommand {
  /// Edit metadata fields of one dataset, or of a CSV batch of datasets
  EditMetadata(EditMetadataArgs),
  /// Report storage use and/or users with a given role, as JSON
  Attributes(AttributesArgs),
  /// Save a metadata export per dataset into a directory
  RetrieveMetadata(RetrieveMetadataArgs),
  /// Delete the draft version of each dataset
  DeleteDraft(DeleteDraftArgs),
  /// Publish the draft version of each dataset
  Publish(PublishArgs),
  /// Print the PIDs of the datasets matching a search
  List(ListArgs),
}

#[derive(Subcommand, Debug)]
pub enum DataverseCommand {
  /// Manage role assignments on one or more collections
  RoleAssignment {
    #[command(subcommand)]
    command: RoleAssignmentCommand,
  },
}

#[derive(Subcommand, Debug)]
pub enum RoleAssignmentCommand {
  /// Add a role assignment to the given collection(s)
  Add(RoleChangeArgs),
  /// Remove a role assignment from the given collection(s)
  Remove(RoleChangeArgs),
  /// List the role assignments of one collection as JSON
  List(RoleListArgs),
}

#[derive(Subcommand, Debug)]
pub enum DepositCommand {
  /// Create a deposit report, print it, save it, or mail it
  Report(DepositReportArgs),
  /// Ask the manage-deposit service to delete matching deposits
  Clean(DepositCleanArgs),
}

/// Batch pacing and error policy, shared by every per-entry command.
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
  /// Seconds to wait between processing entries
  #[arg(long, default_value_t = 0.1)]
  pub wait: f64,

  /// Stop the batch at the first failing entry
  #[arg(long)]
  pub fail_fast: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
  /// Where to write the CSV report (- for stdout)
  #[arg(long, default_value = "-")]
  pub report_file: String,
}

/// One `typeName=value` assignment; the key may carry `[index]` and
/// `@subTypeName` decorations for repeated and compound fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAssignment {
  pub key: String,
  pub value: String,
}

impl FromStr for FieldAssignment {
  type Err = anyhow::Error;

  fn from_str(raw: &str) -> Result<FieldAssignment> {
    match raw.split_once('=') {
      Some((key, value)) if !key.is_empty() => {
        Ok(FieldAssignment { key: key.to_string(), value: value.to_string() })
      }
      _ => bail!("expected KEY=VALUE, e.g. title='New title'"),
    }
  }
}

#[derive(Args, Debug)]
pub struct EditMetadataArgs {
  /// Either a dataset PID, or a CSV file whose first column is titled PID and
  /// whose other columns are typeNames as for --value
  pub pid_or_file: String,

  /// New value as <typeName>=<value>; a compound subfield is addressed as
  /// <typeName>[<index>]@<subTypeName>=<value> (repeatable)
  #[arg(short = 'v', long = "value")]
  pub value: Vec<FieldAssignment>,

  /// Replace existing field values instead of adding values
  #[arg(long)]
  pub replace: bool,

  #[command(flatten)]
  pub batch: BatchArgs,

  #[command(flatten)]
  pub report: ReportArgs,
}

#[derive(Args, Debug)]
pub struct AttributesArgs {
  /// The dataset PID, or a file with a list of PIDs
  #[arg(required_unless_present = "all_datasets", conflicts_with = "all_datasets")]
  pub pid_or_file: Option<String>,

  /// All datasets in the dataverse
  #[arg(long = "all")]
  pub all_datasets: bool,

  /// Report the storage in bytes claimed by the dataset's files
  #[arg(long)]
  pub storage: bool,

  /// Report the users with this role on the dataset
  #[arg(long, value_name = "ROLE")]
  pub user_with_role: Option<String>,

  #[command(flatten)]
  pub batch: BatchArgs,
}

#[derive(Args, Debug)]
pub struct RetrieveMetadataArgs {
  /// The dataset PID, or a file with a list of PIDs
  pub pid_or_file: String,

  /// The directory for the metadata files, created when missing
  #[arg(short = 'o', long)]
  pub output_dir: String,

  /// The exporter producing the metadata
  #[arg(long, default_value = "dataverse_json")]
  pub exporter: String,

  #[command(flatten)]
  pub batch: BatchArgs,
}

#[derive(Args, Debug)]
pub struct DeleteDraftArgs {
  /// The dataset PID, or a file with a list of PIDs
  pub pid_or_file: String,

  /// Delete without asking for confirmation
  #[arg(long)]
  pub yes: bool,

  #[command(flatten)]
  pub batch: BatchArgs,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
  /// The dataset PID, or a file with a list of PIDs
  pub pid_or_file: String,

  /// The type of version upgrade; updatecurrent is for metadata-only changes
  /// by superusers
  #[arg(long, value_enum, default_value = "major")]
  pub version_upgrade_type: VersionUpgradeType,

  #[command(flatten)]
  pub batch: BatchArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum VersionUpgradeType {
  Major,
  Minor,
  #[value(name = "updatecurrent")]
  UpdateCurrent,
}

impl VersionUpgradeType {
  pub fn as_str(self) -> &'static str {
    match self {
      VersionUpgradeType::Major => "major",
      VersionUpgradeType::Minor => "minor",
      VersionUpgradeType::UpdateCurrent => "updatecurrent",
    }
  }
}

#[derive(Args, Debug)]
pub struct ListArgs {
  /// Search query
  #[arg(long, default_value = "*")]
  pub query: String,

  /// Collection alias to search under
  #[arg(long, default_value = "root")]
  pub subtree: String,

  /// Number of rows to return; 0 pages through everything
  #[arg(long, default_value_t = 0)]
  pub rows: usize,
}

#[derive(Args, Debug)]
pub struct RoleChangeArgs {
  /// Role assignee and role alias, e.g. @dataverseAdmin=contributor
  pub role_assignment: RoleSpec,

  /// The collection alias, or a file with a list of aliases
  pub alias_or_file: String,

  #[command(flatten)]
  pub batch: BatchArgs,

  #[command(flatten)]
  pub report: ReportArgs,
}

#[derive(Args, Debug)]
pub struct RoleListArgs {
  /// The collection alias
  pub alias: String,
}

#[derive(Args, Debug)]
pub struct DepositReportArgs {
  /// The depositor name to filter on
  #[arg(short = 'u', long)]
  pub user: Option<String>,

  /// The deposit state to filter on
  #[arg(short = 't', long)]
  pub state: Option<String>,

  /// Filter from the record creation of this date
  #[arg(short = 's', long)]
  pub startdate: Option<String>,

  /// Filter until the record creation of this date
  #[arg(short = 'e', long)]
  pub enddate: Option<String>,

  /// Output data format
  #[arg(short = 'f', long, value_enum, default_value = "csv")]
  pub format: ReportFormat,

  /// The file to write the report to, - for stdout
  #[arg(short = 'o', long, default_value = "-")]
  pub output_file: String,

  /// Mail the report to these comma-separated addresses (requires --output-file)
  #[arg(long)]
  pub email_to: Option<String>,

  /// Extra recipients, sent only when --email-to is given
  #[arg(long, requires = "email_to")]
  pub cc_email_to: Option<String>,

  /// Hidden recipients, sent only when --email-to is given
  #[arg(long, requires = "email_to")]
  pub bcc_email_to: Option<String>,
}

#[derive(Args, Debug)]
pub struct DepositCleanArgs {
  /// The depositor name to filter on
  #[arg(short = 'u', long)]
  pub user: Option<String>,

  /// The deposit state to filter on
  #[arg(short = 't', long)]
  pub state: Option<String>,

  /// Filter from the record creation of this date
  #[arg(short = 's', long)]
  pub startdate: Option<String>,

  /// Filter until the record creation of this date
  #[arg(short = 'e', long)]
  pub enddate: Option<String>,

  /// Filter records older than this number of days
  #[arg(short = 'a', long, conflicts_with = "enddate")]
  pub age: Option<u64>,

  /// Delete without asking for confirmation
  #[arg(long)]
  pub yes: bool,
}
