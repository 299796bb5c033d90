//! Mock rewards backend for testing
//!
//! A small HTTP server that answers routed requests with canned JSON and
//! records everything it receives, so tests can assert which endpoints were
//! (or were not) called and with what headers and bodies.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value as JsonValue;

/// One request as seen by the mock server
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<JsonValue>,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), (u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Mock backend server
pub struct MockBackend {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<MockState>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockBackend {
    /// Start a new mock server on a random available port
    pub fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let state = Arc::new(MockState::default());

        // Non-blocking accept so stop() can end the loop
        listener.set_nonblocking(true)?;

        let running_clone = Arc::clone(&running);
        let state_clone = Arc::clone(&state);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let state = Arc::clone(&state_clone);
                        thread::spawn(move || handle_connection(stream, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    /// Answer `method path` with `status` and `body`
    pub fn route(&self, method: &str, path: &str, status: u16, body: JsonValue) -> &Self {
        if let Ok(mut routes) = self.state.routes.lock() {
            routes.insert(
                (method.to_uppercase(), path.to_string()),
                (status, body.to_string()),
            );
        }
        self
    }

    /// Answer `method path` with a raw (possibly non-JSON) body
    pub fn route_raw(&self, method: &str, path: &str, status: u16, body: &str) -> &Self {
        if let Ok(mut routes) = self.state.routes.lock() {
            routes.insert(
                (method.to_uppercase(), path.to_string()),
                (status, body.to_string()),
            );
        }
        self
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of requests received for `method path`
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, state: &MockState) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let Some(raw) = read_request(&mut stream) else {
        send_response(&mut stream, 400, r#"{"error": "Invalid request"}"#);
        return;
    };

    let head_end = raw.find("\r\n\r\n").unwrap_or(raw.len());
    let (head, body) = raw.split_at(head_end);
    let body = body.trim_start_matches("\r\n\r\n");

    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or("");
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, r#"{"error": "Invalid request"}"#);
        return;
    }

    let method = parts[0].to_string();
    let path = parts[1].split('?').next().unwrap_or(parts[1]).to_string();
    let authorization = lines.find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("authorization")
            .then(|| value.trim().to_string())
    });
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_str(body).ok()
    };

    if let Ok(mut requests) = state.requests.lock() {
        requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            authorization,
            body,
        });
    }

    let routed = state
        .routes
        .lock()
        .ok()
        .and_then(|routes| routes.get(&(method, path)).cloned());

    match routed {
        Some((status, body)) => send_response(&mut stream, status, &body),
        None => send_response(&mut stream, 404, r#"{"error": "Endpoint not found"}"#),
    }
}

/// Read headers, then as much body as Content-Length announces
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    if data.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&data).into_owned())
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        _ => "Internal Server Error",
    }
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mock_server_starts() {
        let server = MockBackend::start().unwrap();
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_unrouted_path_is_404_and_recorded() {
        let server = MockBackend::start().unwrap();
        server.route("GET", "/surveys", 200, json!([]));

        let mut stream = TcpStream::connect(("127.0.0.1", server.port)).unwrap();
        stream
            .write_all(b"GET /nowhere HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        assert!(response.starts_with("HTTP/1.1 404"));
        assert_eq!(server.hits("GET", "/nowhere"), 1);
        assert_eq!(server.hits("GET", "/surveys"), 0);
    }
}
