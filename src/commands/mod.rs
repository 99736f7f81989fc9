//! One runner per CLI area; validation happens here, before any batch work.

pub mod dataset;
pub mod dataverse;
pub mod deposit;

use std::time::Duration;

use anyhow::{bail, Result};

use crate::batch::BatchProcessor;
use crate::cli::{BatchArgs, Cli, Command};
use crate::config;

/// Dispatch a parsed command line against the loaded configuration.
pub fn run(cli: Cli) -> Result<()> {
  let config = config::load(cli.config.as_deref())?;
  match cli.command {
    Some(Command::Dataset { command }) => dataset::run(&config, command, cli.dry_run),
    Some(Command::Dataverse { command }) => dataverse::run(&config, command, cli.dry_run),
    Some(Command::Deposit { command }) => deposit::run(&config, command, cli.dry_run),
    None => bail!("a subcommand is required; run with --help for usage"),
  }
}

pub(crate) fn processor(batch: &BatchArgs) -> BatchProcessor {
  BatchProcessor::new(Duration::from_secs_f64(batch.wait), batch.fail_fast)
}
