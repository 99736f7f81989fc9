// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Shared blocking HTTP plumbing: auth header, query params, JSON decoding, dry-run printing
// role: API transport
// inputs: base URL, API token, request method/path/params/body
// outputs: decoded serde_json values or raw text; printed request description in dry-run mode
// side_effects: network calls; stdout writes in dry-run mode
// invariants:
// - non-2xx statuses become errors carrying method, URL, status and response body
// - GETs always execute; state-changing sends honor dry-run and return Null without connecting
// - the token header is omitted when the token is empty (manage-deposit service)
// errors: transport and status failures with request context; no retries, no internal timeouts
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{bail, Context, Result};
use serde_json::Value;

pub const AUTH_HEADER: &str = "X-Dataverse-key";

#[derive(Clone)]
pub struct Transport {
  base_url: String,
  api_token: String,
  agent: ureq::Agent,
  dry_run: bool,
}

impl Transport {
  pub fn new(server_url: &str, api_token: &str, dry_run: bool) -> Transport {
    Transport {
      base_url: server_url.trim_end_matches('/').to_string(),
      api_token: api_token.to_string(),
      agent: ureq::AgentBuilder::new().build(),
      dry_run,
    }
  }

  pub fn dry_run(&self) -> bool {
    self.dry_run
  }

  pub fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// Read-only JSON call. Runs even in dry-run mode: reads are what dry runs
  /// use to show what would change.
  pub fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
    let response = self.execute("GET", path, params, None, "application/json")?;
    response
      .into_json::<Value>()
      .with_context(|| format!("decoding response of GET {}", self.url(path)))
  }

  /// Read-only call returning the body as text, with an explicit Accept
  /// header (the manage-deposit report endpoint serves csv or json).
  pub fn get_text(&self, path: &str, params: &[(&str, &str)], accept: &str) -> Result<String> {
    let response = self.execute("GET", path, params, None, accept)?;
    response
      .into_string()
      .with_context(|| format!("reading response of GET {}", self.url(path)))
  }

  /// State-changing call (PUT/POST/DELETE). In dry-run mode the request is
  /// printed instead of sent and the result is Null.
  pub fn send_json(
    &self,
    method: &str,
    path: &str,
    params: &[(&str, &str)],
    body: Option<&Value>,
  ) -> Result<Value> {
    if self.dry_run {
      self.print_dry_run_message(method, path, params, body);
      return Ok(Value::Null);
    }
    let response = self.execute(method, path, params, body, "application/json")?;
    response
      .into_json::<Value>()
      .with_context(|| format!("decoding response of {method} {}", self.url(path)))
  }

  /// State-changing call whose reply is plain text rather than JSON.
  pub fn send_text(
    &self,
    method: &str,
    path: &str,
    params: &[(&str, &str)],
    accept: &str,
  ) -> Result<String> {
    if self.dry_run {
      self.print_dry_run_message(method, path, params, None);
      return Ok(String::new());
    }
    let response = self.execute(method, path, params, None, accept)?;
    response
      .into_string()
      .with_context(|| format!("reading response of {method} {}", self.url(path)))
  }

  pub fn print_dry_run_message(
    &self,
    method: &str,
    path: &str,
    params: &[(&str, &str)],
    body: Option<&Value>,
  ) {
    println!("DRY-RUN: only printing request, not sending it...");
    println!("{method} {}", self.url(path));
    if !self.api_token.is_empty() {
      println!("headers: {AUTH_HEADER}={}", self.api_token);
    }
    if !params.is_empty() {
      let joined =
        params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(", ");
      println!("params: {joined}");
    }
    if let Some(json) = body {
      println!("data: {json}");
    }
    println!();
  }

  fn execute(
    &self,
    method: &str,
    path: &str,
    params: &[(&str, &str)],
    body: Option<&Value>,
    accept: &str,
  ) -> Result<ureq::Response> {
    let url = self.url(path);
    let mut request = self.agent.request(method, &url).set("Accept", accept);
    if !self.api_token.is_empty() {
      request = request.set(AUTH_HEADER, &self.api_token);
    }
    for (key, value) in params {
      request = request.query(key, value);
    }

    let result = match body {
      Some(json) => request.send_json(json),
      None => request.call(),
    };
    match result {
      Ok(response) => Ok(response),
      Err(ureq::Error::Status(code, response)) => {
        let detail = response.into_string().unwrap_or_default();
        bail!("{method} {url} failed with status {code}: {detail}")
      }
      Err(err) => Err(err).with_context(|| format!("{method} {url}")),
    }
  }
}
