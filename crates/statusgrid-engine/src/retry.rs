//! Retry executor: runs one async operation under exponential backoff.
//!
//! All mutable retry state (the attempt counter, the last transient
//! error) lives on the stack of a single `execute` call. The executor
//! itself carries only the immutable `RetryPolicy`, so any number of
//! concurrent calls can share one executor without their retry
//! accounting bleeding into each other.

use std::fmt;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

use statusgrid_core::{CancelToken, RetryPolicy, TransportError};

/// Classifies failures for the retry loop.
pub trait Retryable {
    /// Whether retrying this failure could plausibly succeed.
    fn is_transient(&self) -> bool;
}

impl Retryable for TransportError {
    fn is_transient(&self) -> bool {
        TransportError::is_transient(self)
    }
}

/// Terminal outcome of a retry run that did not produce a value.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The retry budget ran out. `attempts` counts every failed
    /// invocation, including the first; `last` is the final transient
    /// failure observed.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    /// A failure not worth retrying, surfaced from the first
    /// invocation that produced it.
    #[error("{0}")]
    Fatal(E),

    /// The cancel signal was raised before the run could finish.
    #[error("operation cancelled")]
    Cancelled,
}

/// Runs operations to completion under an exponential-backoff policy.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run `op` until it succeeds, fails fatally, exhausts the retry
    /// budget, or the batch is cancelled.
    ///
    /// With `max_retries = n` the operation is invoked at most `n + 1`
    /// times. The cancel signal is checked before and after every
    /// invocation and raced against every backoff sleep; once it is
    /// raised the run reports `Cancelled` and makes no further calls
    /// to `op`.
    pub async fn execute<T, E, F, Fut>(
        &self,
        mut op: F,
        cancel: &CancelToken,
    ) -> Result<T, RetryError<E>>
    where
        E: Retryable + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            // A cancel raised mid-call outranks the error the call
            // came back with.
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            if !err.is_transient() {
                return Err(RetryError::Fatal(err));
            }

            attempts += 1;
            if attempts > self.policy.max_retries {
                return Err(RetryError::Exhausted {
                    attempts,
                    last: err,
                });
            }

            let delay = self.policy.delay_for(attempts);
            debug!(
                attempt = attempts,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient failure, backing off"
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            }
        }
    }
}
