//! Error types for the request pipeline.
//!
//! # Design
//! Batch validation failures get their own enum because they are raised
//! synchronously, before any future exists, and callers branch on them
//! differently from transport failures. A transport failure keeps the
//! failing `HttpResponse` when the server produced one so error handlers can
//! inspect status and body. Descriptors skipped for a method mismatch are not
//! errors at all; see `SkipReason`.

use thiserror::Error;

use crate::http::HttpResponse;

/// Boxed error returned by pluggable collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the pipeline and the `Api` facade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A batch failed validation and was never dispatched.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transport collaborator reported a failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An extension could not be loaded during bootstrap.
    #[error("extension '{resource}' failed to load: {source}")]
    Bootstrap {
        resource: String,
        #[source]
        source: BoxError,
    },

    /// The configured body parser rejected a request body.
    #[error("body parser failed: {0}")]
    BodyParser(String),

    /// Leftover parameters could not be form-encoded.
    #[error("query encoding failed: {0}")]
    QueryEncode(#[from] serde_urlencoded::ser::Error),

    /// A per-call `settings` override did not fit the field it replaced.
    #[error("invalid settings override: {0}")]
    InvalidSettings(#[source] serde_json::Error),

    /// A dispatch task panicked or was cancelled by its runtime.
    #[error("dispatch aborted: {0}")]
    Aborted(String),

    /// Configuration overrides could not be merged onto the defaults.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
}

/// Reasons a batch is rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no requests passed")]
    EmptyBatch,

    #[error("request {index} has no url")]
    MissingUrl { index: usize },
}

/// Failure signalled by the transport collaborator.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server answered with a status the transport treats as failure.
    #[error("HTTP {}: {}", .0.status, .0.body)]
    Status(HttpResponse),

    /// No response was produced (connection refused, DNS, I/O, ...).
    #[error("transport failed: {0}")]
    Connection(String),
}

impl TransportError {
    /// The failing response, when the server produced one.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            TransportError::Status(response) => Some(response),
            TransportError::Connection(_) => None,
        }
    }
}

impl ApiError {
    /// The failing response carried by a transport failure, if any.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::Transport(err) => err.response(),
            _ => None,
        }
    }
}

/// Why a descriptor was left out of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The descriptor names a method other than the entry point's verb.
    MethodMismatch {
        expected: &'static str,
        found: String,
    },

    /// The generic entry point received a descriptor without a method.
    MissingMethod,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MethodMismatch { expected, found } => {
                write!(f, "passed method {found} differs from {expected}")
            }
            SkipReason::MissingMethod => write!(f, "no method found"),
        }
    }
}
