//! Error types for registry operations.
//!
//! Every failure a command can hit maps to one [`TacosError`] variant, and
//! every variant maps to a process exit code via [`TacosError::exit_code`].

use reqwest::StatusCode;
use thiserror::Error;

/// Longest response body kept in an error message.
const MAX_BODY_CHARS: usize = 512;

/// Errors raised while talking to the DTR or MSCR, or while shaping their data.
#[derive(Debug, Error)]
pub enum TacosError {
    /// The request never produced a response (connection refused, timeout, TLS).
    #[error("network error while requesting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The registry answered with a missing-resource status.
    #[error("not found: {url} returned {status}")]
    NotFound { url: String, status: u16 },
    /// The registry rejected a submitted document, or a document was rejected
    /// locally before it could be submitted.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A fetched document could not be mapped into the requested shape.
    #[error("conversion failed: {0}")]
    Conversion(String),
    /// Any other non-success status.
    #[error("unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Input was requested from stdin while stdin is an interactive terminal.
    #[error("input from stdin which is a tty - aborting")]
    InteractiveStdin,
}

impl TacosError {
    /// Wrap a transport failure for `url`.
    pub fn network(url: &str, source: reqwest::Error) -> Self {
        TacosError::Network {
            url: url.to_string(),
            source,
        }
    }

    /// Classify a non-success response.
    ///
    /// 404/410 mean the resource is missing, 400/409/415/422 mean the registry
    /// refused what we sent; everything else is reported as-is.
    pub fn from_status(url: &str, status: StatusCode, body: &str) -> Self {
        let body = truncate(body);
        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => TacosError::NotFound {
                url: url.to_string(),
                status: status.as_u16(),
            },
            StatusCode::BAD_REQUEST
            | StatusCode::CONFLICT
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::UNPROCESSABLE_ENTITY => {
                TacosError::Validation(format!("{url} returned {status}: {body}"))
            }
            _ => TacosError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            TacosError::Network { .. } => 2,
            TacosError::NotFound { .. } => 3,
            TacosError::Validation(_) => 4,
            TacosError::Conversion(_) => 5,
            TacosError::InteractiveStdin => 128,
            TacosError::UnexpectedStatus { .. }
            | TacosError::Io { .. }
            | TacosError::Config(_) => 1,
        }
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
