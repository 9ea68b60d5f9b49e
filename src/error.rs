//! Error taxonomy for API calls.
//!
//! Client methods return `anyhow::Result`. Errors raised by the client itself
//! are [`ApiError`] values and can be classified with
//! `err.downcast_ref::<ApiError>()`. Transport failures from the HTTP agent
//! are passed through untouched.

use std::time::Duration;

/// Code reported for a response body that is not valid JSON.
pub const UNPARSABLE_CONTENT_CODE: u16 = 500;

/// Code reported when polling exceeds its wait budget.
pub const POLL_TIMEOUT_CODE: u16 = 488;

/// Errors raised by the client.
#[derive(Debug)]
pub enum ApiError {
    /// The response body could not be parsed as JSON (checked before the status).
    UnparsableContent {
        source: serde_json::Error,
        body: String,
    },
    /// The server answered with a non-2xx status.
    Http { status: u16, text: String },
    /// An asynchronous job was still in progress when the wait budget ran out.
    PollTimeout { elapsed: Duration, max_wait: Duration },
}

impl ApiError {
    /// Numeric code of the error. For HTTP failures this is the status itself.
    pub fn code(&self) -> u16 {
        match self {
            ApiError::UnparsableContent { .. } => UNPARSABLE_CONTENT_CODE,
            ApiError::Http { status, .. } => *status,
            ApiError::PollTimeout { .. } => POLL_TIMEOUT_CODE,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::UnparsableContent { source, body } => {
                write!(f, "Unparsable content: {} (body: {:?})", source, body)
            }
            ApiError::Http { status, text } => {
                write!(f, "HTTP {} error: {}", status, text)
            }
            ApiError::PollTimeout { elapsed, max_wait } => {
                write!(
                    f,
                    "Maximum wait time exceeded ({:.1}s elapsed, limit {:.1}s)",
                    elapsed.as_secs_f64(),
                    max_wait.as_secs_f64()
                )
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::UnparsableContent { source, .. } => Some(source),
            _ => None,
        }
    }
}
