// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for path expansion, confirmation prompts, output directories, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; paths; clap CommandFactory
// outputs: Expanded paths, ensured directories, sanitized file names, man page text
// side_effects: ensure_output_dir creates directories; confirm reads stdin
// invariants:
// - expand_tilde only rewrites a leading ~ segment; everything else passes through
// - filename_from_pid emits ASCII alphanumerics and single dashes only
// errors: IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::CommandFactory;
use directories::BaseDirs;
use log::{info, warn};

/// Expand a leading `~` to the home directory. Everything else passes
/// through unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
  if path == "~" {
    if let Some(base) = BaseDirs::new() {
      return base.home_dir().to_path_buf();
    }
  }
  if let Some(rest) = path.strip_prefix("~/") {
    if let Some(base) = BaseDirs::new() {
      return base.home_dir().join(rest);
    }
  }
  PathBuf::from(path)
}

/// Ask for confirmation on stdin; anything starting with `y` (any case)
/// counts as yes.
pub fn confirm(prompt: &str) -> Result<bool> {
  print!("{prompt} (y/n): ");
  io::stdout().flush().context("flushing prompt")?;
  let mut answer = String::new();
  io::stdin().lock().read_line(&mut answer).context("reading confirmation")?;
  Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
  answer.trim().to_lowercase().starts_with('y')
}

/// Create the output directory when missing; returns the expanded path.
pub fn ensure_output_dir(dir: &str) -> Result<PathBuf> {
  let path = expand_tilde(dir);
  if path.is_dir() {
    info!("Skipping dir creation, because it already exists: {}", path.display());
  } else {
    warn!("Creating output dir: {}", path.display());
    std::fs::create_dir_all(&path)
      .with_context(|| format!("creating output dir {}", path.display()))?;
  }
  Ok(path)
}

/// File-system safe rendition of a PID: runs of anything outside
/// `[0-9A-Za-z]` collapse into one dash.
pub fn filename_from_pid(pid: &str) -> String {
  let mut name = String::with_capacity(pid.len());
  let mut last_was_dash = false;
  for c in pid.chars() {
    if c.is_ascii_alphanumeric() {
      name.push(c);
      last_was_dash = false;
    } else if !last_was_dash {
      name.push('-');
      last_was_dash = true;
    }
  }
  name
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
