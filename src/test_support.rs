//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::{BTreeMap, VecDeque};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::core::error::ProviderError;
use crate::core::traits::VideoProviderAdapter;
use crate::core::types::{
    GenerationResult, GenerationStatus, NormalizedResponse, ProviderId, VideoRequest,
};

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status_code: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl MockResponse {
    pub fn json(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            content_type: Some("application/json; charset=utf-8"),
            body: body.to_string(),
        }
    }

    pub fn text(status_code: u16, body: &str) -> Self {
        Self {
            status_code,
            content_type: Some("text/plain"),
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl CapturedRequest {
    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("captured body should be JSON")
    }
}

/// Replays queued responses, one connection per response, then stops.
pub struct MockServer {
    addr: std::net::SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockServer {
    pub fn start(responses: Vec<MockResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");

        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));
        let captured = Arc::new(Mutex::new(Vec::new()));

        let queue_clone = Arc::clone(&queue);
        let captured_clone = Arc::clone(&captured);

        let handle = thread::spawn(move || {
            loop {
                let next_response = {
                    let mut queue = queue_clone.lock().expect("queue lock");
                    queue.pop_front()
                };

                let Some(response) = next_response else {
                    break;
                };

                let (mut stream, _) = listener.accept().expect("accept connection");
                stream
                    .set_read_timeout(Some(Duration::from_secs(3)))
                    .expect("set stream timeout");

                let raw_request = read_http_request_with_body(&mut stream);
                captured_clone
                    .lock()
                    .expect("capture lock")
                    .push(parse_request(&raw_request));

                stream
                    .write_all(build_http_response(&response).as_bytes())
                    .expect("write response");
                stream.flush().expect("flush response");
            }
        });

        Self {
            addr,
            captured,
            handle: Some(handle),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.captured.lock().expect("capture lock").clone()
    }

    pub fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("join mock server");
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn read_http_request_with_body(stream: &mut std::net::TcpStream) -> String {
    let mut request = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(bytes_read) => {
                request.extend_from_slice(&chunk[..bytes_read]);

                if let Some(header_end) =
                    request.windows(4).position(|window| window == b"\r\n\r\n")
                {
                    let headers = String::from_utf8_lossy(&request[..header_end]).to_string();
                    let content_length = headers
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            if name.eq_ignore_ascii_case("content-length") {
                                value.trim().parse::<usize>().ok()
                            } else {
                                None
                            }
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            Err(error)
                if error.kind() == std::io::ErrorKind::WouldBlock
                    || error.kind() == std::io::ErrorKind::TimedOut =>
            {
                break;
            }
            Err(error) => panic!("failed reading request: {error}"),
        }
    }

    String::from_utf8_lossy(&request).to_string()
}

fn parse_request(raw_request: &str) -> CapturedRequest {
    let (head, body) = raw_request
        .split_once("\r\n\r\n")
        .unwrap_or((raw_request, ""));
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let headers = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect();

    CapturedRequest {
        method,
        path,
        headers,
        body: body.to_string(),
    }
}

fn build_http_response(response: &MockResponse) -> String {
    let mut rendered = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status_code,
        status_reason(response.status_code),
        response.body.len(),
    );
    if let Some(content_type) = response.content_type {
        rendered.push_str("Content-Type: ");
        rendered.push_str(content_type);
        rendered.push_str("\r\n");
    }
    rendered.push_str("\r\n");
    rendered.push_str(&response.body);
    rendered
}

fn status_reason(status_code: u16) -> &'static str {
    match status_code {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Adapter that answers status checks from a fixed script of statuses.
///
/// Once the script runs out the last status repeats.
pub struct ScriptedAdapter {
    provider: ProviderId,
    statuses: Mutex<VecDeque<GenerationStatus>>,
    last_status: Mutex<GenerationStatus>,
    start_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new(provider: ProviderId, statuses: Vec<GenerationStatus>) -> Self {
        Self {
            provider,
            statuses: Mutex::new(VecDeque::from(statuses)),
            last_status: Mutex::new(GenerationStatus::Processing),
            start_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn next_status(&self) -> GenerationStatus {
        let mut last = self.last_status.lock().expect("last status lock");
        if let Some(status) = self.statuses.lock().expect("statuses lock").pop_front() {
            *last = status;
        }
        *last
    }
}

#[async_trait]
impl VideoProviderAdapter for ScriptedAdapter {
    fn id(&self) -> ProviderId {
        self.provider
    }

    async fn start_generation(
        &self,
        request: &VideoRequest,
        _api_key_override: Option<&str>,
    ) -> Result<GenerationResult, ProviderError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        Ok(GenerationResult::from_normalized(
            self.provider,
            NormalizedResponse {
                request_id: Some("scripted-job".to_string()),
                status: Some(GenerationStatus::Queued),
                ..NormalizedResponse::default()
            },
            json!({"prompt": request.prompt}),
        ))
    }

    async fn get_status(
        &self,
        request_id: &str,
        _api_key_override: Option<&str>,
    ) -> Result<GenerationResult, ProviderError> {
        let poll = self.status_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let status = self.next_status();

        Ok(GenerationResult::from_normalized(
            self.provider,
            NormalizedResponse {
                request_id: Some(request_id.to_string()),
                status: Some(status),
                ..NormalizedResponse::default()
            },
            json!({"poll": poll}),
        ))
    }
}
