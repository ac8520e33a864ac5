//! Page fetch error types.

use thiserror::Error;

/// Errors raised while retrieving a page of search results.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("could not build search request: {reason}")]
    InvalidRequest { reason: String },

    #[error("network error while fetching results: {message}")]
    Network { message: String },

    #[error("catalog responded with HTTP {status}")]
    Status { status: u16 },

    #[error("failed to decode search response: {message}")]
    Decode { message: String },
}

impl FetchError {
    /// Creates invalid request error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns whether repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status } => *status >= 500 || *status == 429,
            Self::InvalidRequest { .. } | Self::Decode { .. } => false,
        }
    }
}
