//! Per-target status fetcher.
//!
//! Binds one target identity to one transport call, runs it through a
//! fresh retry execution, and converts the outcome into a tagged
//! per-target result. Exhausted and fatal failures become report
//! entries here; only cancellation escapes as an error.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use statusgrid_core::{
    CancelToken, RetryPolicy, StatusError, StatusRecord, StatusTransport, TargetQuery,
};

use crate::retry::{RetryError, RetryExecutor};

/// Marker error for a poll abandoned by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("status poll cancelled")]
pub struct Cancelled;

/// Tagged outcome of one target's fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The target answered with a snapshot.
    Status(StatusRecord),
    /// The target could not be polled; the error says why.
    Error(StatusError),
}

/// Fetches one target's status with retries.
pub struct StatusFetcher<T> {
    transport: Arc<T>,
    executor: RetryExecutor,
}

impl<T: StatusTransport> StatusFetcher<T> {
    pub fn new(transport: Arc<T>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            executor: RetryExecutor::new(policy),
        }
    }

    /// Poll `target` once, retrying transient failures per policy.
    ///
    /// Always yields a tagged outcome for the target unless the whole
    /// batch was cancelled mid-flight.
    pub async fn fetch(
        &self,
        target: &TargetQuery,
        cancel: &CancelToken,
    ) -> Result<FetchOutcome, Cancelled> {
        let run = self
            .executor
            .execute(|| self.transport.get_status(target, cancel), cancel)
            .await;

        match run {
            Ok(record) => {
                debug!(
                    target = %target,
                    ready = record.ready_replicas,
                    desired = record.desired_replicas,
                    phase = %record.phase,
                    "status fetched"
                );
                Ok(FetchOutcome::Status(record))
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                warn!(target = %target, attempts, error = %last, "retries exhausted");
                Ok(FetchOutcome::Error(StatusError {
                    target: target.clone(),
                    message: format!("retries exhausted after {attempts} attempts: {last}"),
                }))
            }
            Err(RetryError::Fatal(err)) => {
                warn!(target = %target, error = %err, "status fetch failed");
                Ok(FetchOutcome::Error(StatusError {
                    target: target.clone(),
                    message: err.to_string(),
                }))
            }
            Err(RetryError::Cancelled) => Err(Cancelled),
        }
    }
}

// Manual impl: cloning shares the transport, T itself need not be Clone.
impl<T> Clone for StatusFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            executor: self.executor.clone(),
        }
    }
}
