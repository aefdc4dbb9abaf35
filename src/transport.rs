//! HTTP transport facade
//!
//! A thin typed contract over a pluggable HTTP/1.1 client: set URL, method,
//! headers and body, execute, read back status / headers / body. Nothing
//! else is assumed, so tests can swap the implementation freely.
//!
//! The reqwest implementation streams file-range PUT bodies from a
//! read-only handle (never buffering the whole range) and maps every
//! network-level failure (DNS, connect, TLS, reset, broken pipe, timeout)
//! to the retriable `Transport` error kind. Rust ignores SIGPIPE on startup,
//! so broken pipes surface as ordinary I/O errors rather than signals, and
//! reqwest clients need no process-wide init or teardown.

use crate::error::ClientError;
use crate::sigv4::Method;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Default per-request transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Where a request body comes from.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    /// In-memory payload, sent verbatim (part lists, small PUTs).
    Bytes(Bytes),
    /// Exactly `length` bytes starting at `offset` of a seekable file,
    /// opened read-only and streamed.
    FileRange {
        path: PathBuf,
        offset: u64,
        length: u64,
    },
}

/// A fully built request, ready to execute.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

/// Captured response. Headers are kept as a raw `name: value` block so the
/// response parser can search them with the same pattern machinery it uses
/// for XML.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: String,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The §6.3 transport contract. Object-safe so orchestrator internals can
/// be exercised with a scripted implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &PreparedRequest) -> Result<HttpResponse, ClientError>;
}

/// reqwest-backed transport. Each worker owns its own instance; clients
/// hold their own connection pools and need no shared global state.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client with the given per-request timeout. `insecure`
    /// disables TLS certificate verification; debugging only.
    pub fn new(timeout: Duration, insecure: bool) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_defaults() -> Result<Self, ClientError> {
        Self::new(DEFAULT_TIMEOUT, false)
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Put => reqwest::Method::PUT,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: &PreparedRequest) -> Result<HttpResponse, ClientError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(bytes) => builder.body(bytes.clone()),
            RequestBody::FileRange {
                path,
                offset,
                length,
            } => {
                let mut file = tokio::fs::File::open(path).await?;
                file.seek(SeekFrom::Start(*offset)).await?;
                let stream = ReaderStream::new(file.take(*length));
                builder
                    .header(reqwest::header::CONTENT_LENGTH, *length)
                    .body(reqwest::Body::wrap_stream(stream))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let mut headers = String::new();
        for (name, value) in response.headers() {
            headers.push_str(name.as_str());
            headers.push_str(": ");
            headers.push_str(&String::from_utf8_lossy(value.as_bytes()));
            headers.push_str("\r\n");
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
