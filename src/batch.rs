// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Run a caller-supplied action over an entry source with inter-entry delay and fail-fast policy
// role: batch iteration engine
// inputs: Entries (fixed or lazy), action callback, wait duration, fail_fast flag, optional CSV report
// outputs: BatchOutcome with processed/failed counts and the aborted flag
// side_effects: sleeps between entries; logs one progress line per entry; action side effects
// invariants:
// - entries run strictly sequentially, in source order, exactly once each
// - no delay before the first entry
// - a source (pagination) failure aborts the run regardless of fail_fast
// errors: action errors are logged with their chain and handled per fail_fast; source errors propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{debug, error, info};

use crate::entries::{Entries, Entry};
use crate::report::CsvReport;

pub struct BatchProcessor {
  wait: Duration,
  fail_fast: bool,
}

/// What a finished (or aborted) run looked like. Callers log it; batch-loop
/// failures do not turn into a non-zero exit on their own.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
  pub processed: usize,
  pub failed: usize,
  pub aborted: bool,
}

impl BatchProcessor {
  pub fn new(wait: Duration, fail_fast: bool) -> BatchProcessor {
    BatchProcessor { wait, fail_fast }
  }

  /// Applies `action` to every entry in order. Entries from a lazy source
  /// arrive as results; a failed fetch ends the whole run since the source
  /// itself is broken, not one entry's action.
  pub fn process<F>(&self, entries: Entries, mut action: F) -> Result<BatchOutcome>
  where
    F: FnMut(&Entry) -> Result<()>,
  {
    let total = entries.known_len();
    match total {
      Some(n) => info!("Start batch processing on {n} entries"),
      None => info!("Start batch processing on an unknown number of entries"),
    }
    let total_label = total.map_or_else(|| "-1".to_string(), |n| n.to_string());

    let mut outcome = BatchOutcome::default();
    for (i, item) in entries.into_iter().enumerate() {
      let entry = item?;
      let i = i + 1;
      if i > 1 && !self.wait.is_zero() {
        debug!("Waiting {:.1}s before processing next entry", self.wait.as_secs_f64());
        thread::sleep(self.wait);
      }
      info!("Processing {i} of {total_label}: {}", entry.label());
      match action(&entry) {
        Ok(()) => outcome.processed += 1,
        Err(err) => {
          outcome.failed += 1;
          error!("Error processing {}: {err:#}", entry.label());
          if self.fail_fast {
            error!("Stop processing because of an error and fail-fast is on");
            outcome.aborted = true;
            break;
          }
          debug!("fail-fast is off, continuing...");
        }
      }
    }

    info!(
      "Done: {} processed, {} failed{}",
      outcome.processed,
      outcome.failed,
      if outcome.aborted { ", aborted early" } else { "" }
    );
    Ok(outcome)
  }

  /// Same loop wrapped around a CSV report scoped to the run: the sink opens
  /// before the first entry and is flushed and released on every exit path.
  pub fn process_with_report<F>(
    &self,
    entries: Entries,
    report_file: &str,
    columns: &[&str],
    mut action: F,
  ) -> Result<BatchOutcome>
  where
    F: FnMut(&Entry, &mut CsvReport) -> Result<()>,
  {
    let mut report = CsvReport::open(report_file, columns)?;
    let outcome = self.process(entries, |entry| action(entry, &mut report))?;
    report.finish()?;
    Ok(outcome)
  }
}
