// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Deposit subcommand runners for the manage-deposit service; report retrieval/mailing and cleanup
// role: command orchestration
// inputs: parsed deposit subcommand, manage_deposit and mail configuration, dry-run flag
// outputs: the report on stdout or in a file, optionally also as a mail attachment; the service reply for clean
// side_effects: HTTP requests, file writes, SMTP traffic
// invariants:
// - --email-to is rejected before any request when the report only goes to stdout
// - clean asks for confirmation unless --yes or --dry-run; --age is turned into an enddate
// - a dry run never reaches the SMTP server
// errors: a missing manage_deposit (or mail) config section fails with the section name
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;

use crate::cli::{DepositCleanArgs, DepositCommand, DepositReportArgs};
use crate::config::Config;
use crate::deposit::{self, enddate_from_age, DepositFilter, EmailRecipients, ManageDeposit};
use crate::util;

pub fn run(config: &Config, command: DepositCommand, dry_run: bool) -> Result<()> {
  let Some(deposit_config) = &config.manage_deposit else {
    bail!("the configuration has no manage_deposit section");
  };
  let service = ManageDeposit::new(deposit_config, dry_run);
  match command {
    DepositCommand::Report(args) => report(config, &service, args, dry_run),
    DepositCommand::Clean(args) => clean(&service, args, dry_run),
  }
}

fn report(
  config: &Config,
  service: &ManageDeposit,
  args: DepositReportArgs,
  dry_run: bool,
) -> Result<()> {
  let recipients = email_recipients(&args);
  if recipients.is_some() && args.output_file == "-" {
    bail!("--email-to needs --output-file; the mail attaches the saved report");
  }

  let filter = DepositFilter {
    user: args.user,
    state: args.state,
    startdate: args.startdate,
    enddate: args.enddate,
  };
  let report = service.report(&filter, args.format)?;
  deposit::write_report(&report, &args.output_file)?;

  if let Some(recipients) = recipients {
    if dry_run {
      info!("Dry run, not mailing the report to {}", recipients.to);
      return Ok(());
    }
    let Some(mail_config) = &config.mail else {
      bail!("the configuration has no mail section");
    };
    let attachment_name = attachment_name(&args.output_file)?;
    deposit::mail_report(mail_config, &recipients, &report, &attachment_name, args.format)?;
  }
  Ok(())
}

fn email_recipients(args: &DepositReportArgs) -> Option<EmailRecipients> {
  args.email_to.as_ref().map(|to| EmailRecipients {
    to: to.clone(),
    cc: args.cc_email_to.clone(),
    bcc: args.bcc_email_to.clone(),
  })
}

fn attachment_name(output_file: &str) -> Result<String> {
  let name = Path::new(output_file)
    .file_name()
    .and_then(|name| name.to_str())
    .with_context(|| format!("no usable file name in {output_file}"))?;
  Ok(name.to_string())
}

fn clean(service: &ManageDeposit, args: DepositCleanArgs, dry_run: bool) -> Result<()> {
  if !args.yes && !dry_run {
    println!("This asks the service to delete all matching deposits.");
    if !util::confirm("Are you sure?")? {
      bail!("cancelled");
    }
  }
  let filter = DepositFilter {
    user: args.user,
    state: args.state,
    startdate: args.startdate,
    enddate: args.age.map(enddate_from_age).or(args.enddate),
  };
  let reply = service.clean(&filter)?;
  if !reply.is_empty() {
    println!("{reply}");
  }
  Ok(())
}
