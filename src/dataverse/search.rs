// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Lazy paginated access to /api/search; hits surface one at a time as the consumer asks for them
// role: search collaborator
// inputs: query, subtree (collection alias), object type, requested row count
// outputs: SearchPages iterator of search hits; dataset_pids maps hits to identifier entries
// side_effects: one GET per page, issued only when the previous page is drained
// invariants:
// - page size is 25 when rows == 0, otherwise exactly the requested rows
// - iteration stops on a short page, or after one page when rows != 0
// - dry-run prints the first page request and yields nothing
// errors: a failed page fetch yields one Err item and ends the iteration
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::VecDeque;

use anyhow::Result;
use log::debug;
use serde_json::Value;

use crate::entries::{Entries, Entry};
use crate::ext::serde_json::JsonFetch;

use super::http::Transport;

const SEARCH_PATH: &str = "/api/search";
const DEFAULT_PAGE_SIZE: usize = 25;

pub struct SearchApi {
  transport: Transport,
}

/// Fetches one page of hits: (start, per_page) -> items.
type Pager = Box<dyn FnMut(usize, usize) -> Result<Vec<Value>>>;

impl SearchApi {
  pub(super) fn new(transport: Transport) -> SearchApi {
    SearchApi { transport }
  }

  /// Searches published objects under `subtree`. `rows == 0` means "all":
  /// keep fetching 25 at a time until a page comes back short. A non-zero
  /// `rows` requests exactly one page of that size.
  pub fn search(&self, query: &str, subtree: &str, object_type: &str, rows: usize) -> SearchPages {
    if self.transport.dry_run() {
      let per_page = page_size(rows).to_string();
      let params = [
        ("q", query),
        ("subtree", subtree),
        ("type", object_type),
        ("per_page", per_page.as_str()),
        ("start", "0"),
      ];
      self.transport.print_dry_run_message("GET", SEARCH_PATH, &params, None);
      return SearchPages::exhausted();
    }

    let transport = self.transport.clone();
    let query = query.to_string();
    let subtree = subtree.to_string();
    let object_type = object_type.to_string();
    let pager = move |start: usize, per_page: usize| -> Result<Vec<Value>> {
      let per_page_param = per_page.to_string();
      let start_param = start.to_string();
      let response = transport.get_json(
        SEARCH_PATH,
        &[
          ("q", query.as_str()),
          ("subtree", subtree.as_str()),
          ("type", object_type.as_str()),
          ("per_page", per_page_param.as_str()),
          ("start", start_param.as_str()),
        ],
      )?;
      let items: Vec<Value> = response.fetch("data.items").required()?;
      debug!("search page: start={start} per_page={per_page} -> {} items", items.len());
      Ok(items)
    };
    SearchPages::new(Box::new(pager), rows)
  }

  /// Lazy entry source of dataset PIDs for batch runs over "all datasets".
  pub fn dataset_pids(&self, query: &str, subtree: &str) -> Entries {
    let hits = self.search(query, subtree, "dataset", 0);
    Entries::lazy(hits.map(|hit| {
      let hit = hit?;
      hit.fetch("global_id").required::<String>().map(Entry::Identifier)
    }))
  }
}

fn page_size(rows: usize) -> usize {
  if rows == 0 {
    DEFAULT_PAGE_SIZE
  } else {
    rows
  }
}

/// Demand-driven page walker. Holds at most one page of hits; the next page
/// is requested only after the consumer drained the buffered one.
pub struct SearchPages {
  pager: Pager,
  per_page: usize,
  single_page: bool,
  start: usize,
  buffer: VecDeque<Value>,
  done: bool,
}

impl SearchPages {
  pub fn new(pager: Pager, rows: usize) -> SearchPages {
    SearchPages {
      pager,
      per_page: page_size(rows),
      single_page: rows != 0,
      start: 0,
      buffer: VecDeque::new(),
      done: false,
    }
  }

  fn exhausted() -> SearchPages {
    SearchPages {
      pager: Box::new(|_, _| Ok(Vec::new())),
      per_page: DEFAULT_PAGE_SIZE,
      single_page: true,
      start: 0,
      buffer: VecDeque::new(),
      done: true,
    }
  }
}

impl Iterator for SearchPages {
  type Item = Result<Value>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if let Some(item) = self.buffer.pop_front() {
        return Some(Ok(item));
      }
      if self.done {
        return None;
      }
      match (self.pager)(self.start, self.per_page) {
        Ok(items) => {
          if items.len() < self.per_page || self.single_page {
            self.done = true;
          }
          self.start += self.per_page;
          self.buffer.extend(items);
        }
        Err(err) => {
          self.done = true;
          return Some(Err(err));
        }
      }
    }
  }
}
