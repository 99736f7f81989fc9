// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch nested serde_json values via dotted paths, with optional and required typed extraction
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper; required() names the missing path in its error
// invariants: No panics; missing paths yield None (or a contextual error via required)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

/// A JSON location plus the path that led there, so errors can name it.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
  path: String,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// Deserialize as `T`, failing with the dotted path when the response does
  /// not carry it. Used on envelope members the API always promises.
  pub fn required<T>(&self) -> Result<T>
  where
    T: DeserializeOwned,
  {
    self.to::<T>().ok_or_else(|| anyhow!("response has no usable `{}` member", self.path))
  }
}

/// Extension to fetch nested values via dotted paths like "data.items".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self), path: path.to_string() };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None, path: path.to_string() },
      }
    }

    JsonFetched { inner: Some(cur), path: path.to_string() }
  }
}
