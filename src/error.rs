//! Client error taxonomy
//!
//! Five kinds, matching how they propagate: `InvalidArgument` and `Io` are
//! surfaced immediately and never retried; `Transport` is always retriable;
//! `Protocol` is retriable only for 5xx and the two throttling statuses
//! (408, 429); `Cancelled` marks a worker stopped by a sibling's failure and
//! is never reported as the upload's own error.

use thiserror::Error;

/// Errors produced by signing, transport and upload orchestration.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed endpoint, empty credential, out-of-range expiration,
    /// invalid method, inconsistent jobs/file-size.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Cannot open, stat, seek or read the local file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// DNS, connect, TLS, socket, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response, missing ETag or UploadId, malformed XML.
    #[error("protocol error: status {status}{}: {message}", code_suffix(.code))]
    Protocol {
        status: u16,
        /// S3 `<Code>` element from the error body, when present.
        code: String,
        message: String,
    },

    /// Upstream cancellation signal: a sibling worker already failed.
    #[error("cancelled")]
    Cancelled,
}

fn code_suffix(code: &str) -> String {
    if code.is_empty() {
        String::new()
    } else {
        format!(" ({code})")
    }
}

impl ClientError {
    /// Shorthand for a `Protocol` error with no parsed S3 error code.
    pub fn protocol(status: u16, message: impl Into<String>) -> Self {
        ClientError::Protocol {
            status,
            code: String::new(),
            message: message.into(),
        }
    }

    /// Whether a retry may succeed. Transport failures are always worth
    /// retrying; protocol failures only when the server said "try again"
    /// (5xx, 408 Request Timeout, 429 Too Many Requests).
    pub fn is_retriable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Protocol { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }
}
