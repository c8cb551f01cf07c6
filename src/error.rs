//! Error types for the image recognition client.
//!
//! Each failure category gets its own type so callers can tell a malformed
//! request from a flaky network or a corrupted response. [`Error`] is what an
//! `analyse` call returns.

use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::AnalysisAttribute;

/// Malformed caller input, caught before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Image URL or its base64-encoded content required")]
    MissingImageSource,
    #[error("Detect request needs at least one image")]
    EmptyBatch,
    #[error("Detect request needs at least one analysis attribute")]
    NoAttributes,
}

/// An attribute name that is not one of [`AnalysisAttribute::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown analysis attribute: {name}. Expected one of: {expected}")]
pub struct UnknownAttributeError {
    name: String,
    expected: String,
}

impl UnknownAttributeError {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: AnalysisAttribute::ALL.map(|a| a.as_str()).join(", "),
        }
    }

    /// The name as it was given.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Client construction problems. Raised before any call is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),
    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Invalid value for header {0}")]
    InvalidHeader(&'static str),
    #[error("Retry budget must be at least 1, got {0}")]
    InvalidRetryBudget(u32),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// What went wrong while talking to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection could not be established.
    Connect,
    /// The request or the response read timed out.
    Timeout,
    /// The server answered with a non-2xx status.
    Status(StatusCode),
    /// The response body could not be read.
    Body,
    /// The transport was closed before the request was sent.
    Closed,
    Other,
}

/// A network-level failure. Everything except [`TransportErrorKind::Closed`]
/// is worth retrying.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn closed() -> Self {
        Self::new(TransportErrorKind::Closed, "HTTP transport is closed")
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// The HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self.kind {
            TransportErrorKind::Status(status) => Some(status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self.kind, TransportErrorKind::Closed)
    }
}

/// The server was reachable but its answer could not be turned into a
/// response. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Failed to decode detect response: {reason}")]
pub struct DecodeError {
    reason: String,
    payload: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            payload: payload.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The raw text that failed to decode.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Outcome of a failed client call.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Analysis call was cancelled")]
    Cancelled,
    #[error("Client is closed")]
    Closed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
