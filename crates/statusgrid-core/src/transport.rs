//! The status transport seam.
//!
//! Aggregation depends only on this trait and on the transient/fatal
//! split of `TransportError`. How a status is actually obtained (HTTP
//! endpoint, in-memory fixture) is an implementation concern behind
//! the seam.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::cancel::CancelToken;
use crate::types::{StatusRecord, TargetQuery};

/// Errors a single status call can produce.
///
/// Transient variants are worth retrying; everything else fails the
/// target on first occurrence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not complete within the transport's deadline.
    #[error("status call timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint could not be reached, or the connection dropped
    /// mid-call.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The endpoint is up but answered with a retryable status
    /// (5xx or 429).
    #[error("endpoint unavailable (http {status})")]
    Unavailable { status: u16 },

    /// The target does not exist at this source.
    #[error("target not found: {0}")]
    NotFound(String),

    /// The endpoint rejected the request outright (4xx other than 404
    /// and 429).
    #[error("request rejected (http {status})")]
    Rejected { status: u16 },

    /// The endpoint answered 200 with a body that could not be decoded.
    #[error("malformed status payload: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Whether retrying this failure could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connect(_) | Self::Unavailable { .. }
        )
    }
}

/// A single-call status source for deployment targets.
///
/// Implementations perform exactly one fetch per `get_status` call;
/// retries and aggregation live above this seam. Implementations
/// should give up promptly once `cancel` is raised.
#[async_trait]
pub trait StatusTransport: Send + Sync {
    async fn get_status(
        &self,
        target: &TargetQuery,
        cancel: &CancelToken,
    ) -> Result<StatusRecord, TransportError>;
}
