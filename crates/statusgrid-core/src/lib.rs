//! statusgrid-core: shared types, configuration, and seams for statusgrid.
//!
//! # Architecture
//!
//! ```text
//! Config (statusgrid.toml)
//!   ├── RetryPolicy        immutable backoff settings, shared read-only
//!   ├── TargetQuery list   what to poll
//!   └── source endpoints   where each target is polled from
//! StatusTransport (trait)  one fallible status call per invocation
//! CancelToken              one shared cancel signal per batch
//! StatusReport             fan-in outcome: statuses + per-target errors
//! ```
//!
//! Everything that performs I/O or drives concurrency lives in the
//! crates layered on top; this crate only defines the contracts they
//! share.

pub mod cancel;
pub mod config;
pub mod policy;
pub mod transport;
pub mod types;

pub use cancel::CancelToken;
pub use config::{Config, ConfigError};
pub use policy::RetryPolicy;
pub use transport::{StatusTransport, TransportError};
pub use types::*;
