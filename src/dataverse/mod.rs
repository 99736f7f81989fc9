// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Group the Dataverse API surface: shared transport, search, per-PID and per-alias wrappers, services
// role: module/aggregation
// outputs: DataverseClient facade handing out SearchApi, DatasetApi and CollectionApi values
// invariants: one Transport per client; wrappers clone it, so dry-run mode is uniform across calls
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod collection;
pub mod dataset;
pub mod datasets;
pub mod http;
pub mod roles;
pub mod search;
#[cfg(test)]
pub mod testing;

use crate::config::DataverseConfig;

use self::collection::CollectionApi;
use self::dataset::DatasetApi;
use self::http::Transport;
use self::search::SearchApi;

/// Entry point to the Dataverse REST API for one configured server.
pub struct DataverseClient {
  transport: Transport,
}

impl DataverseClient {
  pub fn new(config: &DataverseConfig, dry_run: bool) -> DataverseClient {
    DataverseClient {
      transport: Transport::new(&config.server_url, &config.api_token, dry_run),
    }
  }

  pub fn search(&self) -> SearchApi {
    SearchApi::new(self.transport.clone())
  }

  pub fn dataset(&self, pid: &str) -> DatasetApi {
    DatasetApi::new(self.transport.clone(), pid)
  }

  pub fn collection(&self, alias: &str) -> CollectionApi {
    CollectionApi::new(self.transport.clone(), alias)
  }
}
