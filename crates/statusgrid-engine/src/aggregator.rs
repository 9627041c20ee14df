//! Batch aggregation: one fetch task per target, one consolidated
//! report out.
//!
//! Tasks share nothing mutable. The transport sits behind an `Arc`,
//! the retry policy is immutable, and the cancel token is the only
//! cross-task signal. Every spawned task is joined whether it
//! succeeded or not; a target that fails only ever adds an entry to
//! the report's error list.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use statusgrid_core::{
    CancelToken, RetryPolicy, StatusError, StatusReport, StatusTransport, TargetQuery, epoch_secs,
};

use crate::fetcher::{Cancelled, FetchOutcome, StatusFetcher};

/// Polls a batch of targets concurrently and consolidates the
/// outcomes.
pub struct StatusAggregator<T> {
    fetcher: StatusFetcher<T>,
}

impl<T: StatusTransport + 'static> StatusAggregator<T> {
    pub fn new(transport: Arc<T>, policy: RetryPolicy) -> Self {
        Self {
            fetcher: StatusFetcher::new(transport, policy),
        }
    }

    /// Poll every target in parallel and wait for all of them.
    ///
    /// The report accounts for each input target exactly once, in
    /// either `statuses` or `errors`. Individual failures never abort
    /// the batch; only a raised cancel signal does.
    pub async fn aggregate(
        &self,
        targets: &[TargetQuery],
        cancel: &CancelToken,
    ) -> Result<StatusReport, Cancelled> {
        if targets.is_empty() {
            return Ok(StatusReport::empty());
        }

        let started = Instant::now();

        let mut handles = Vec::with_capacity(targets.len());
        for target in targets {
            let fetcher = self.fetcher.clone();
            let task_target = target.clone();
            let task_cancel = cancel.clone();
            let handle =
                tokio::spawn(async move { fetcher.fetch(&task_target, &task_cancel).await });
            handles.push((target.clone(), handle));
        }

        // Join unconditionally: one target's failure never cuts
        // another's fetch short.
        let mut statuses = Vec::new();
        let mut errors = Vec::new();
        let mut cancelled = false;

        for (target, handle) in handles {
            match handle.await {
                Ok(Ok(FetchOutcome::Status(record))) => statuses.push(record),
                Ok(Ok(FetchOutcome::Error(err))) => errors.push(err),
                Ok(Err(Cancelled)) => cancelled = true,
                // A panicked fetch task still accounts for its target.
                Err(join_err) => {
                    warn!(target = %target, error = %join_err, "fetch task failed");
                    errors.push(StatusError {
                        target,
                        message: format!("fetch task failed: {join_err}"),
                    });
                }
            }
        }

        if cancelled {
            info!(targets = targets.len(), "status poll cancelled");
            return Err(Cancelled);
        }

        let report = StatusReport {
            statuses,
            errors,
            generated_at: epoch_secs(),
        };
        info!(
            targets = targets.len(),
            ok = report.statuses.len(),
            failed = report.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "status poll complete"
        );
        Ok(report)
    }
}
