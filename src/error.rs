//! Client error taxonomy.

use std::fmt;

use thiserror::Error;

use crate::allocation::ValidationError;
use crate::http::response::{ApiError, RawResponse};
use crate::http::transport::TransportError;
use crate::resources::identities::IdentityValidationError;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transfer was rejected locally; nothing was sent.
    #[error("invalid transfer: {0}")]
    Validation(#[from] ValidationError),

    /// The identity was rejected locally; nothing was sent.
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] IdentityValidationError),

    /// A required argument was missing or malformed; nothing was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request could not be assembled (bad URL, unserialisable body, bad header).
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every attempt failed with a transport error or a 5xx response.
    #[error("retry budget exhausted after {attempts} attempt(s){}", describe_last(.last_failure))]
    RetryBudgetExhausted {
        attempts: u32,
        last_failure: Option<LastFailure>,
    },

    /// The service answered with a 4xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A response arrived but its body was cut short. Not retried, since the
    /// service may already have applied the request.
    #[error("response {status} could not be read: {source}")]
    IncompleteResponse { status: u16, source: TransportError },

    /// The service answered successfully but the body did not match the expected shape.
    #[error("failed to decode response body: {source}")]
    Decode {
        source: serde_json::Error,
        body: String,
    },
}

impl ClientError {
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, ClientError::RetryBudgetExhausted { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// The 4xx error, if the service rejected the request.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status of a client failure.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|e| e.status)
    }
}

fn describe_last(last: &Option<LastFailure>) -> String {
    match last {
        Some(failure) => format!(" (last failure: {})", failure),
        None => String::new(),
    }
}

/// The final retryable failure seen before the budget ran out.
#[derive(Debug, Clone)]
pub enum LastFailure {
    Transport(TransportError),
    Server {
        status: u16,
        status_text: String,
        body: Vec<u8>,
    },
}

impl From<RawResponse> for LastFailure {
    fn from(response: RawResponse) -> Self {
        LastFailure::Server {
            status: response.status,
            status_text: response.status_text,
            body: response.body,
        }
    }
}

impl fmt::Display for LastFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastFailure::Transport(e) => write!(f, "{}", e),
            LastFailure::Server { status_text, .. } => write!(f, "server responded {}", status_text),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
