//! test_support: helpers shared by the CLI integration tests.
//!
//! Add as a dev-dependency in the top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support" }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::{cmd_bin, write_config, StubServer};
//!
//! let server = StubServer::start(vec![("200 OK", r#"{"status":"OK","data":[]}"#)]);
//! let dir = test_support::tempdir();
//! let config = write_config(dir.path(), server.url());
//! cmd_bin("dv-batch").arg("--config").arg(&config).assert();
//! ```

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
  assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
  tempfile::tempdir().expect("create tempdir")
}

/// Write a config file pointing both the Dataverse server and the
/// manage-deposit service at `base_url`; returns the file's path.
pub fn write_config(dir: &Path, base_url: &str) -> PathBuf {
  let path = dir.join("dv-batch.yml");
  let text = format!(
    "dataverse:\n  server_url: {base_url}\n  api_token: test-token\n\
     manage_deposit:\n  service_baseurl: {base_url}\n"
  );
  std::fs::write(&path, text).expect("write config fixture");
  path
}

/// A loopback HTTP server playing a script of canned responses, one
/// connection per response. Responses carry `Connection: close`, so the
/// client reconnects for every call and the exchanges stay in order.
pub struct StubServer {
  url: String,
  handle: JoinHandle<Vec<String>>,
}

impl StubServer {
  pub fn start(responses: Vec<(&'static str, &'static str)>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    let handle = thread::spawn(move || {
      let mut requests = Vec::new();
      for (status_line, body) in responses {
        match listener.accept() {
          Ok((stream, _)) => requests.push(handle_client(stream, status_line, body)),
          Err(_) => break,
        }
      }
      requests
    });
    StubServer { url: format!("http://{addr}"), handle }
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  /// Wait for the whole script to play out; returns the raw requests in
  /// arrival order. Call only after the command under test finished.
  pub fn finish(self) -> Vec<String> {
    self.handle.join().expect("stub server thread")
  }
}

fn handle_client(mut stream: TcpStream, status_line: &str, body: &str) -> String {
  let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
  let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
  let mut raw = Vec::new();
  let mut buf = [0u8; 4096];
  loop {
    match stream.read(&mut buf) {
      Ok(0) => break,
      Ok(n) => {
        raw.extend_from_slice(&buf[..n]);
        if request_complete(&raw) {
          break;
        }
      }
      Err(_) => break,
    }
  }
  let request = String::from_utf8_lossy(&raw).to_string();
  let response = format!(
    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
    status_line,
    body.len(),
    body
  );
  let _ = stream.write_all(response.as_bytes());
  request
}

// A request is complete once the headers ended and the announced body, if
// any, arrived in full.
fn request_complete(raw: &[u8]) -> bool {
  let text = String::from_utf8_lossy(raw);
  let Some(header_end) = text.find("\r\n\r\n") else {
    return false;
  };
  let content_length = text
    .lines()
    .find_map(|line| {
      let (name, value) = line.split_once(':')?;
      name.eq_ignore_ascii_case("content-length").then(|| value.trim())
    })
    .and_then(|value| value.parse::<usize>().ok())
    .unwrap_or(0);
  raw.len() >= header_end + 4 + content_length
}
