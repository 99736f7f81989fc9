//! Loopback HTTP stubs shared by the API wrapper tests.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

/// Serve one canned response on an ephemeral port; the join handle yields the
/// raw request the client sent.
pub fn serve_once(
  status_line: &'static str,
  body: &'static str,
) -> (String, thread::JoinHandle<String>) {
  let listener = TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = listener.local_addr().unwrap();
  let handle = thread::spawn(move || {
    let mut request = String::new();
    if let Ok((stream, _)) = listener.accept() {
      request = handle_client(stream, status_line, body);
    }
    request
  });
  (format!("http://{addr}"), handle)
}

/// Serve a scripted sequence of responses, one connection each; the join
/// handle yields the requests in arrival order. Responses carry
/// `Connection: close`, so the agent reconnects for every call.
pub fn serve_script(
  responses: Vec<(&'static str, &'static str)>,
) -> (String, thread::JoinHandle<Vec<String>>) {
  let listener = TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = listener.local_addr().unwrap();
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
  (format!("http://{addr}"), handle)
}

fn handle_client(mut stream: TcpStream, status_line: &str, body: &str) -> String {
  let _ = stream.set_read_timeout(Some(Duration::from_secs(1)));
  let _ = stream.set_write_timeout(Some(Duration::from_secs(1)));
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
