use async_trait::async_trait;
use hagal_core::proxy::{ProxyRequest, ProxyResponse};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Debug;
use thiserror::Error;

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Capability to send one request to the metrics API.
///
/// Implementations own timeouts and connection handling; the pipeline neither
/// retries nor cancels.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    async fn send(&self, request: &ProxyRequest) -> Result<ProxyResponse, TransportError>;
}

/// The `error` object the backend attaches to failed responses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub missing: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BackendErrorBody {
    pub(crate) error: BackendError,
}

/// Failure of a single transport call.
///
/// The `Display` output is the message shown to users for a failed series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The backend answered with a structured error body.
    #[error("{}", format_backend(.status, .error))]
    Backend {
        status: Option<u16>,
        error: BackendError,
    },

    /// The request failed without a structured body (network error, plain text body).
    #[error("{}", format_plain(.status, .message))]
    Http { status: Option<u16>, message: String },

    /// Nothing usable was reported.
    #[error("Unknown error")]
    Unknown,

    /// The transport cannot issue requests at all; fails the whole query.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        TransportError::Backend {
            status: Some(status),
            error: BackendError {
                code: Some(status as i64),
                message: Some(message.into()),
                missing: Vec::new(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Backend { status, .. } | TransportError::Http { status, .. } => {
                *status
            }
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, TransportError::Unavailable(_))
    }
}

fn error_prefix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("[{} ERROR]", code),
        None => "[ERROR]".to_string(),
    }
}

fn format_backend(status: &Option<u16>, error: &BackendError) -> String {
    let message = if !error.missing.is_empty() {
        Some(format!("Missing: {}", Value::Array(error.missing.clone())))
    } else {
        error.message.clone().filter(|m| !m.is_empty())
    };

    match message {
        Some(message) => format!("{} {}", error_prefix(status), message),
        None => UNKNOWN_ERROR.to_string(),
    }
}

fn format_plain(status: &Option<u16>, message: &str) -> String {
    if message.is_empty() {
        return UNKNOWN_ERROR.to_string();
    }
    format!("{} {}", error_prefix(status), message)
}
