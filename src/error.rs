//! Breaker error types.

use crate::store::StoreError;
use thiserror::Error;

/// Result type for breaker operations.
pub type Result<T> = std::result::Result<T, BreakerError>;

/// Errors surfaced by [`Breaker::run`](crate::Breaker::run) and friends.
#[derive(Debug, Error)]
pub enum BreakerError {
    /// The breaker is open; no request was attempted.
    #[error("Circuit: {name} is tripped")]
    CircuitTripped {
        /// Name of the tripped breaker.
        name: String,
    },

    /// The wrapped call failed or timed out. The fault has already been
    /// recorded against the breaker by the time this surfaces.
    #[error("{message}")]
    Upstream {
        /// HTTP status code of the failed response (500 for timeouts).
        status: u16,
        /// `"{status}: {body}"` for failures, `"Request timed out"` for timeouts.
        message: String,
    },

    /// The persistence layer failed during gate-check or record update.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Transport-level breakdown before any response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL in the request specification.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl BreakerError {
    /// Check if this error means the circuit is open.
    pub fn is_tripped(&self) -> bool {
        matches!(self, Self::CircuitTripped { .. })
    }

    /// Check if this error came from the upstream call itself.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Http(_))
    }

    /// Get the HTTP status code if this is an upstream error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
