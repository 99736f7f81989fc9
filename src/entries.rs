// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve a PID/alias argument into entries; literal value, file of lines, CSV of records, or a lazy source
// role: entry resolution
// inputs: positional argument (literal or path), optional -v key=value pairs, CSV files with a PID header
// outputs: Entries (fixed with known length, or lazy with unknown length) of Entry values
// side_effects: reads input files
// invariants:
// - a path that does not exist falls through to the literal case, by design
// - records always carry a PID; the first CSV column must be titled PID
// - cells beyond the header width are kept under REST_COLUMN so reshaping can refuse the row
// errors: unreadable files and malformed CSV abort before any batch work
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs;

use anyhow::{bail, Context, Result};

use crate::fields::REST_COLUMN;
use crate::util::expand_tilde;

/// One unit of batch work: a bare identifier (PID or alias) or a record of
/// field values keyed by column name, with the PID hoisted out.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
  Identifier(String),
  Record(Record),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub pid: String,
  pub fields: Vec<(String, String)>,
}

impl Entry {
  /// Label used in progress lines. Every entry has one: identifiers are their
  /// own label and records carry their PID by construction.
  pub fn label(&self) -> &str {
    match self {
      Entry::Identifier(id) => id,
      Entry::Record(record) => &record.pid,
    }
  }
}

/// A resolved sequence of entries. Fixed sources know their length up front;
/// lazy sources (paginated search) do not and may fail mid-iteration.
pub enum Entries {
  Fixed(Vec<Entry>),
  Lazy(Box<dyn Iterator<Item = Result<Entry>>>),
}

// Lazy holds a trait object, so Debug (needed by tests' unwrap_err) is manual.
impl std::fmt::Debug for Entries {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Entries::Fixed(entries) => f.debug_tuple("Fixed").field(entries).finish(),
      Entries::Lazy(_) => f.debug_tuple("Lazy").field(&"..").finish(),
    }
  }
}

impl Entries {
  pub fn lazy<I>(iter: I) -> Entries
  where
    I: Iterator<Item = Result<Entry>> + 'static,
  {
    Entries::Lazy(Box::new(iter))
  }

  /// Known length for materialized sources, `None` for lazy ones.
  pub fn known_len(&self) -> Option<usize> {
    match self {
      Entries::Fixed(entries) => Some(entries.len()),
      Entries::Lazy(_) => None,
    }
  }
}

impl IntoIterator for Entries {
  type Item = Result<Entry>;
  type IntoIter = Box<dyn Iterator<Item = Result<Entry>>>;

  fn into_iter(self) -> Self::IntoIter {
    match self {
      Entries::Fixed(entries) => Box::new(entries.into_iter().map(Ok)),
      Entries::Lazy(iter) => iter,
    }
  }
}

/// Resolves a PID-or-file argument into identifier entries: an existing file
/// is read line by line (one identifier per non-blank line, a leading
/// PID/DOI/alias header is skipped), anything else is taken literally.
pub fn identifiers(pid_or_file: &str) -> Result<Entries> {
  let path = expand_tilde(pid_or_file);
  if !path.is_file() {
    return Ok(Entries::Fixed(vec![Entry::Identifier(pid_or_file.to_string())]));
  }

  let text =
    fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
  let mut entries = Vec::new();
  for (i, line) in text.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    if i == 0 && matches!(line, "PID" | "DOI" | "alias") {
      continue;
    }
    entries.push(Entry::Identifier(line.to_string()));
  }
  Ok(Entries::Fixed(entries))
}

/// Reads a CSV file of metadata updates: first column `PID`, remaining
/// columns flat field keys. Rows wider than the header keep their spill in
/// REST_COLUMN cells so the reshaper can reject them with a clear error.
pub fn records_from_csv(file: &str) -> Result<Entries> {
  let path = expand_tilde(file);
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .from_path(&path)
    .with_context(|| format!("opening {}", path.display()))?;

  let headers: Vec<String> = reader
    .headers()
    .with_context(|| format!("reading header row of {}", path.display()))?
    .iter()
    .map(|h| h.trim().to_string())
    .collect();
  match headers.first().map(String::as_str) {
    Some("PID") => {}
    other => bail!(
      "first column of {} must be titled `PID`, found {:?}",
      path.display(),
      other.unwrap_or("nothing")
    ),
  }

  let mut entries = Vec::new();
  for row in reader.records() {
    let row = row.with_context(|| format!("reading {}", path.display()))?;
    if row.iter().all(|cell| cell.trim().is_empty()) {
      continue;
    }
    let line = row.position().map(|p| p.line()).unwrap_or(0);
    let pid = row.get(0).unwrap_or("").trim().to_string();
    if pid.is_empty() {
      bail!("line {line} of {} has an empty PID", path.display());
    }

    let mut fields = Vec::with_capacity(headers.len() - 1);
    for (i, cell) in row.iter().enumerate().skip(1) {
      match headers.get(i) {
        Some(name) => fields.push((name.clone(), cell.to_string())),
        None => fields.push((REST_COLUMN.to_string(), cell.to_string())),
      }
    }
    // A short row leaves its trailing columns empty rather than absent.
    for name in headers.iter().skip(row.len()) {
      fields.push((name.clone(), String::new()));
    }
    entries.push(Entry::Record(Record { pid, fields }));
  }
  Ok(Entries::Fixed(entries))
}

/// Builds the single-entry source for `edit-metadata PID -v key=value ...`.
pub fn single_record(pid: &str, values: &[(String, String)]) -> Entries {
  Entries::Fixed(vec![Entry::Record(Record {
    pid: pid.to_string(),
    fields: values.to_vec(),
  })])
}
