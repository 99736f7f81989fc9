// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Client for the manage-deposit service: filtered reports, deposit cleanup, optional mail delivery
// role: deposit collaborator
// inputs: filter (user/state/startdate/enddate), report format, output destination, mail recipients
// outputs: report text written to stdout or a file; service reply for cleanups; one mail per delivery
// side_effects: GET /report, POST /delete-deposit, SMTP submission
// invariants:
// - only filters that were given appear as query parameters
// - the Accept header follows the requested format (text/csv or application/json)
// - cleanup POSTs are suppressed and printed in dry-run mode
// errors: non-2xx replies and SMTP failures surface with their context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs;

use anyhow::{Context, Result};
use chrono::{Days, Local};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{Message, SmtpTransport, Transport as _};
use log::info;

use crate::config::{MailConfig, ManageDepositConfig};
use crate::dataverse::http::Transport;
use crate::util::expand_tilde;

pub const REPORT_PATH: &str = "/report";
pub const CLEAN_PATH: &str = "/delete-deposit";

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
  Csv,
  Json,
}

impl ReportFormat {
  pub fn accept(self) -> &'static str {
    match self {
      ReportFormat::Csv => "text/csv",
      ReportFormat::Json => "application/json",
    }
  }
}

/// Record-creation filters shared by the report and cleanup endpoints.
#[derive(Debug, Default, Clone)]
pub struct DepositFilter {
  pub user: Option<String>,
  pub state: Option<String>,
  pub startdate: Option<String>,
  pub enddate: Option<String>,
}

impl DepositFilter {
  fn params(&self) -> Vec<(&str, &str)> {
    let mut params = Vec::new();
    if let Some(user) = &self.user {
      params.push(("user", user.as_str()));
    }
    if let Some(state) = &self.state {
      params.push(("state", state.as_str()));
    }
    if let Some(startdate) = &self.startdate {
      params.push(("startdate", startdate.as_str()));
    }
    if let Some(enddate) = &self.enddate {
      params.push(("enddate", enddate.as_str()));
    }
    params
  }
}

/// `--age N` convenience: the end date N days before today, ISO-formatted.
pub fn enddate_from_age(days: u64) -> String {
  let date = Local::now().date_naive() - Days::new(days);
  date.format("%Y-%m-%d").to_string()
}

pub struct ManageDeposit {
  transport: Transport,
}

impl ManageDeposit {
  pub fn new(config: &ManageDepositConfig, dry_run: bool) -> ManageDeposit {
    // The service sits behind the same transport as Dataverse, minus the
    // token; it has no authentication of its own.
    ManageDeposit { transport: Transport::new(&config.service_baseurl, "", dry_run) }
  }

  /// Deposit report matching the filter, in the requested format.
  pub fn report(&self, filter: &DepositFilter, format: ReportFormat) -> Result<String> {
    self.transport.get_text(REPORT_PATH, &filter.params(), format.accept())
  }

  /// Ask the service to delete the matching deposits; returns its reply.
  pub fn clean(&self, filter: &DepositFilter) -> Result<String> {
    self.transport.send_text("POST", CLEAN_PATH, &filter.params(), "text/plain")
  }
}

/// Write the report to `-` (stdout) or a file.
pub fn write_report(report: &str, output_file: &str) -> Result<()> {
  if output_file == "-" {
    println!("{report}");
    return Ok(());
  }
  let path = expand_tilde(output_file);
  fs::write(&path, report).with_context(|| format!("writing report to {}", path.display()))
}

/// Mail recipients; `to` takes comma-separated addresses, cc and bcc ride
/// along only when given.
#[derive(Debug, Default, Clone)]
pub struct EmailRecipients {
  pub to: String,
  pub cc: Option<String>,
  pub bcc: Option<String>,
}

pub fn mail_report(
  config: &MailConfig,
  recipients: &EmailRecipients,
  report: &str,
  attachment_name: &str,
  format: ReportFormat,
) -> Result<()> {
  let message = compose_report_mail(config, recipients, report, attachment_name, format)?;
  let mailer =
    SmtpTransport::builder_dangerous(&config.smtp_host).port(config.smtp_port).build();
  mailer
    .send(&message)
    .with_context(|| format!("sending report mail via {}:{}", config.smtp_host, config.smtp_port))?;
  info!("Sent deposit report to {}", recipients.to);
  Ok(())
}

fn compose_report_mail(
  config: &MailConfig,
  recipients: &EmailRecipients,
  report: &str,
  attachment_name: &str,
  format: ReportFormat,
) -> Result<Message> {
  let from: Mailbox = config
    .from_address
    .parse()
    .with_context(|| format!("invalid from address `{}`", config.from_address))?;
  let mut builder = Message::builder().from(from).subject("Deposits report");
  for address in recipients.to.split(',') {
    builder = builder.to(parse_mailbox(address)?);
  }
  if let Some(cc) = &recipients.cc {
    for address in cc.split(',') {
      builder = builder.cc(parse_mailbox(address)?);
    }
  }
  if let Some(bcc) = &recipients.bcc {
    for address in bcc.split(',') {
      builder = builder.bcc(parse_mailbox(address)?);
    }
  }

  let content_type =
    ContentType::parse(format.accept()).context("attachment content type")?;
  let body = MultiPart::mixed()
    .singlepart(SinglePart::plain(
      "Please, find attached the detailed report of deposits.".to_string(),
    ))
    .singlepart(Attachment::new(attachment_name.to_string()).body(report.to_string(), content_type));
  builder.multipart(body).context("building report mail")
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
  address.trim().parse().with_context(|| format!("invalid mail address `{address}`"))
}
