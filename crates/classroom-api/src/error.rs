//! Error types for the classroom API client
//!
//! Three failure families:
//! - Transport failures (connection, timeout, body read)
//! - Session failures (401 that could not be recovered by a refresh)
//! - Plain HTTP failures, propagated unchanged to the caller

use crate::request::ApiResponse;
use std::sync::Arc;

/// Main client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the credentials and the session could not be renewed
    /// for this request (already retried once, or the refresh itself failed).
    #[error("unauthorized: {path}")]
    Unauthorized {
        /// Path of the rejected request
        path: String,
    },

    /// The shared session refresh this request was queued behind failed
    #[error("session refresh failed: {0}")]
    RefreshFailed(#[source] Arc<RefreshError>),

    /// Non-success status other than 401
    #[error("http {status} for {path}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Path of the failed request
        path: String,
        /// The full response, untouched
        response: ApiResponse,
    },

    /// Transport level failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response body did not decode into the requested type
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Check if this error ended in a forced logout or a rejected session
    #[inline]
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::RefreshFailed(_))
    }

    /// Check if the caller may reasonably try again later
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Timeout) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// HTTP status associated with this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the underlying HTTP transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Any other reqwest failure
    #[error("http request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Failure reported by a non-reqwest transport
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Failures of the session refresh call
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// Refresh endpoint answered with a non-success status
    #[error("refresh endpoint returned {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
    },

    /// Refresh call never reached the server
    #[error("refresh transport error: {0}")]
    Transport(#[from] TransportError),

    /// The request driving the refresh was dropped before it settled
    #[error("refresh abandoned before completion")]
    Abandoned,
}
