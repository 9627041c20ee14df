//! statusgrid-engine: the concurrent fetch-and-retry core.
//!
//! # Architecture
//!
//! ```text
//! StatusAggregator::aggregate(targets, cancel)
//!   ├── spawns one task per target              (fan-out)
//!   │     └── StatusFetcher::fetch(target)
//!   │           └── RetryExecutor::execute      (fresh state per call)
//!   │                 └── StatusTransport::get_status
//!   └── joins every task, partitions outcomes   (fan-in)
//! ```
//!
//! Retry state is allocated inside each `execute` call. Concurrent
//! fetches share only the transport handle, the immutable policy, and
//! the cancel token, so one target's failures can never spend another
//! target's retry budget.

pub mod aggregator;
pub mod fetcher;
pub mod retry;

pub use aggregator::StatusAggregator;
pub use fetcher::{Cancelled, FetchOutcome, StatusFetcher};
pub use retry::{RetryError, RetryExecutor, Retryable};
