// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Append-only CSV audit sink scoped to one batch run
// role: audit reporting
// inputs: destination path (or `-` for stdout), fixed column set, one row map per processed entry
// outputs: CSV file with a header row and one flushed line per write
// side_effects: creates/truncates the destination file; writes to stdout when destination is `-`
// invariants:
// - header written exactly once, at open
// - every row is flushed as soon as it is written, so rows survive an aborted run
// - row keys outside the fixed column set are an error; missing keys become empty cells
// errors: IO failures carry the destination in their context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs::File;
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use chrono::Local;

use crate::util::expand_tilde;

/// Timestamp for the `Modified` audit column.
pub fn timestamp() -> String {
  Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub struct CsvReport {
  writer: csv::Writer<Box<dyn Write>>,
  columns: Vec<String>,
  destination: String,
}

impl CsvReport {
  /// Opens the sink and writes the header row. `-` sends rows to stdout.
  pub fn open(destination: &str, columns: &[&str]) -> Result<CsvReport> {
    let sink: Box<dyn Write> = if destination == "-" {
      Box::new(io::stdout())
    } else {
      let path = expand_tilde(destination);
      Box::new(File::create(&path).with_context(|| format!("creating report file {}", path.display()))?)
    };

    let mut writer = csv::Writer::from_writer(sink);
    writer
      .write_record(columns)
      .and_then(|()| writer.flush().map_err(Into::into))
      .with_context(|| format!("writing report header to {destination}"))?;

    Ok(CsvReport {
      writer,
      columns: columns.iter().map(|c| c.to_string()).collect(),
      destination: destination.to_string(),
    })
  }

  /// Appends one row. Values are picked into header order; a key that is not
  /// a declared column is refused so the output format stays exact.
  pub fn write(&mut self, row: &[(&str, String)]) -> Result<()> {
    for (key, _) in row {
      if !self.columns.iter().any(|c| c == key) {
        bail!("report row key `{key}` is not one of the declared columns {:?}", self.columns);
      }
    }
    let record: Vec<&str> = self
      .columns
      .iter()
      .map(|column| {
        row
          .iter()
          .find(|(key, _)| key == column)
          .map_or("", |(_, value)| value.as_str())
      })
      .collect();
    self
      .writer
      .write_record(&record)
      .and_then(|()| self.writer.flush().map_err(Into::into))
      .with_context(|| format!("appending report row to {}", self.destination))?;
    Ok(())
  }

  /// Explicit close so flush errors surface; dropping flushes too.
  pub fn finish(mut self) -> Result<()> {
    self.writer.flush().with_context(|| format!("flushing report {}", self.destination))?;
    Ok(())
  }
}
