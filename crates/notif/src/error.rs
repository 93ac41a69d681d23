//! Error types for notification delivery.
//!
//! Every layer wraps the error it received instead of replacing it, so the
//! outermost caller can walk [`std::error::Error::source`] down to the root
//! cause (a refused connection, a non-200 status, a cancelled context).

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Network-level failure category for a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The per-request timeout of the HTTP client elapsed.
    Timeout,
    /// The connection could not be established (refused, DNS, TLS).
    Connect,
    /// The request or response body could not be transferred.
    Body,
    /// Any other request failure.
    Request,
}

impl TransportKind {
    /// Classify a reqwest error.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_body() || err.is_decode() {
            Self::Body
        } else {
            Self::Request
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connect"),
            Self::Body => write!(f, "body"),
            Self::Request => write!(f, "request"),
        }
    }
}

/// Errors produced while delivering a notification.
#[derive(Error, Debug)]
pub enum Error {
    /// The backend payload could not be encoded.
    #[error("failed to marshal {backend} message: {source}")]
    Serialization {
        backend: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request never produced a response.
    #[error("failed to send {backend} notification ({kind}): {source}")]
    Transport {
        backend: &'static str,
        kind: TransportKind,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a status other than its success status.
    #[error("{backend} returned status code: {status}")]
    Status {
        backend: &'static str,
        status: StatusCode,
        /// Response body, truncated.
        body: String,
    },

    /// The caller cancelled the context.
    #[error("context canceled")]
    Cancelled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Every attempt of the retry decorator failed.
    #[error("failed after {retries} retries: {source}")]
    RetriesExhausted {
        retries: u32,
        #[source]
        source: Box<Error>,
    },

    /// Invalid construction-time configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Wrap a reqwest error for the given backend.
    pub fn transport(backend: &'static str, source: reqwest::Error) -> Self {
        Self::Transport {
            backend,
            kind: TransportKind::classify(&source),
            source,
        }
    }

    /// Whether this error comes from the caller's context (cancel or deadline).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// The HTTP status for status errors, looking through retry exhaustion.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RetriesExhausted { source, .. } => source.status(),
            _ => None,
        }
    }

    /// The error that ended the last attempt, if this is an exhaustion error.
    pub fn last_error(&self) -> Option<&Error> {
        match self {
            Self::RetriesExhausted { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the failure is likely transient.
    ///
    /// Transport failures, 5xx and 429 are transient; other statuses,
    /// serialization and configuration errors are permanent. Cancellation is
    /// never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::RetriesExhausted { source, .. } => source.is_retryable(),
            Self::Serialization { .. }
            | Self::Cancelled
            | Self::DeadlineExceeded
            | Self::Configuration(_) => false,
        }
    }
}
