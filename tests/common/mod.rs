//! Shared test infrastructure for integration tests
//!
//! Provides an in-process mock S3 endpoint (axum) that records every
//! request it receives and can be scripted to fail, flake or delay
//! individual parts.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// UploadId handed out by the mock Initiate handler.
pub const UPLOAD_ID: &str = "XYZ";

/// One request as seen by the mock server.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Scripted server behaviour, fixed at startup.
#[derive(Default, Clone)]
pub struct MockBehavior {
    /// Parts that 500 on every attempt.
    pub fail_parts: HashSet<u32>,
    /// Parts that 500 this many times, then succeed.
    pub flaky_parts: HashMap<u32, usize>,
    /// Per-part response delay, to force out-of-order completion.
    pub part_delays_ms: HashMap<u32, u64>,
    /// Delay applied to every part PUT.
    pub delay_all_ms: u64,
}

pub struct MockState {
    pub requests: Mutex<Vec<Recorded>>,
    behavior: MockBehavior,
    flaky_remaining: Mutex<HashMap<u32, usize>>,
}

/// In-process mock S3 endpoint.
pub struct MockS3 {
    pub state: Arc<MockState>,
    addr: SocketAddr,
}

impl MockS3 {
    pub async fn start(behavior: MockBehavior) -> Self {
        let state = Arc::new(MockState {
            requests: Mutex::new(Vec::new()),
            flaky_remaining: Mutex::new(behavior.flaky_parts.clone()),
            behavior,
        });
        let app = Router::new()
            .fallback(handler)
            // axum caps extracted bodies at 2 MB by default; parts are 5 MiB+
            .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });
        Self { state, addr }
    }

    pub async fn start_default() -> Self {
        Self::start(MockBehavior::default()).await
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn initiate_requests(&self) -> Vec<Recorded> {
        self.recorded()
            .into_iter()
            .filter(|r| r.method == "POST" && r.query.contains("uploads"))
            .collect()
    }

    pub fn complete_requests(&self) -> Vec<Recorded> {
        self.recorded()
            .into_iter()
            .filter(|r| r.method == "POST" && r.query.contains("uploadId"))
            .collect()
    }

    pub fn abort_requests(&self) -> Vec<Recorded> {
        self.recorded()
            .into_iter()
            .filter(|r| r.method == "DELETE" && r.query.contains("uploadId"))
            .collect()
    }

    /// How many times a given part number was PUT (retries included).
    pub fn part_attempts(&self, part: u32) -> usize {
        let needle = format!("partNumber={}", part);
        self.recorded()
            .iter()
            .filter(|r| r.method == "PUT" && r.query.contains(&needle))
            .count()
    }

    /// Body of the last PUT for a part.
    pub fn part_body(&self, part: u32) -> Option<Vec<u8>> {
        let needle = format!("partNumber={}", part);
        self.recorded()
            .into_iter()
            .filter(|r| r.method == "PUT" && r.query.contains(&needle))
            .map(|r| r.body)
            .next_back()
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn xml_response(status: StatusCode, body: String) -> Response {
    (status, [("Content-Type", "application/xml")], body).into_response()
}

fn error_response(status: StatusCode, code: &str) -> Response {
    xml_response(
        status,
        format!(
            "<?xml version=\"1.0\"?><Error><Code>{}</Code><Message>injected failure</Message></Error>",
            code
        ),
    )
}

async fn handler(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query = uri.query().unwrap_or("").to_string();
    let params = parse_query(&query);

    let mut recorded_headers = HashMap::new();
    for (name, value) in headers.iter() {
        recorded_headers.insert(
            name.as_str().to_ascii_lowercase(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers: recorded_headers,
        body: body.to_vec(),
    });

    // Initiate
    if method == Method::POST && params.contains_key("uploads") {
        return xml_response(
            StatusCode::OK,
            format!(
                "<InitiateMultipartUploadResult><UploadId>{}</UploadId></InitiateMultipartUploadResult>",
                UPLOAD_ID
            ),
        );
    }

    // UploadPart
    if method == Method::PUT {
        if let Some(part) = params.get("partNumber") {
            let part: u32 = part.parse().unwrap_or(0);
            if state.behavior.delay_all_ms > 0 {
                tokio::time::sleep(Duration::from_millis(state.behavior.delay_all_ms)).await;
            }
            if let Some(delay) = state.behavior.part_delays_ms.get(&part) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            if state.behavior.fail_parts.contains(&part) {
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "InternalError");
            }
            {
                let mut flaky = state.flaky_remaining.lock().unwrap();
                if let Some(remaining) = flaky.get_mut(&part) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "InternalError");
                    }
                }
            }
            return (StatusCode::OK, [("ETag", format!("\"e{}\"", part))]).into_response();
        }

        // Single-shot PUT of the whole object
        return (StatusCode::OK, [("ETag", "\"abc123\"")]).into_response();
    }

    // Complete
    if method == Method::POST && params.contains_key("uploadId") {
        let text = String::from_utf8_lossy(&body);
        let part_count = text.matches("<Part>").count();
        return xml_response(
            StatusCode::OK,
            format!(
                "<CompleteMultipartUploadResult><ETag>\"composite-{}\"</ETag></CompleteMultipartUploadResult>",
                part_count
            ),
        );
    }

    // Abort
    if method == Method::DELETE && params.contains_key("uploadId") {
        return StatusCode::NO_CONTENT.into_response();
    }

    StatusCode::NOT_FOUND.into_response()
}
