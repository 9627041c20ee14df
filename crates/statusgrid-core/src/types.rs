//! Domain types for status polling.
//!
//! These types describe what gets polled (`TargetQuery`), what a poll
//! returns (`StatusRecord`), how a failed poll is reported
//! (`StatusError`), and the consolidated batch outcome (`StatusReport`).
//! All types are serializable to/from JSON for report output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// ── Target identity ───────────────────────────────────────────────

/// Identity of one deployment target to poll.
///
/// Carried unchanged from request to result so outcomes can be matched
/// back to inputs regardless of completion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetQuery {
    /// Deployment name.
    pub name: String,
    /// Namespace the deployment lives in.
    pub namespace: String,
    /// Source (cluster) the deployment is polled from.
    pub source: String,
}

impl TargetQuery {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            source: source.into(),
        }
    }

    /// Build the composite key `{source}/{namespace}/{name}`.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.source, self.namespace, self.name)
    }
}

impl fmt::Display for TargetQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.source, self.namespace, self.name)
    }
}

// ── Status snapshot ───────────────────────────────────────────────

/// Lifecycle phase reported by a status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl DeploymentPhase {
    /// Parse a wire phase string. Anything unrecognized maps to
    /// `Unknown` so one odd endpoint cannot poison a whole report.
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time status snapshot for one deployment target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusRecord {
    pub name: String,
    pub namespace: String,
    pub source: String,
    /// Replica count the deployment wants.
    pub desired_replicas: u32,
    /// Replica count currently ready.
    pub ready_replicas: u32,
    pub phase: DeploymentPhase,
    /// Unix timestamp (seconds) when this snapshot was taken.
    pub observed_at: u64,
}

impl StatusRecord {
    /// Build the composite key `{source}/{namespace}/{name}`.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.source, self.namespace, self.name)
    }

    /// Whether every desired replica is ready.
    pub fn is_ready(&self) -> bool {
        self.ready_replicas >= self.desired_replicas
    }
}

/// Per-target fetch failure, tagged with the target it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusError {
    pub target: TargetQuery,
    /// Human-readable failure description.
    pub message: String,
}

// ── Consolidated report ───────────────────────────────────────────

/// Consolidated outcome of polling a batch of targets.
///
/// Every input target lands in exactly one of the two lists. Ordering
/// within a list follows completion order and carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub statuses: Vec<StatusRecord>,
    pub errors: Vec<StatusError>,
    /// Unix timestamp (seconds) when the report was assembled.
    pub generated_at: u64,
}

impl StatusReport {
    /// Report for a zero-target batch.
    pub fn empty() -> Self {
        Self {
            statuses: Vec::new(),
            errors: Vec::new(),
            generated_at: epoch_secs(),
        }
    }

    /// Total targets represented across both lists.
    pub fn target_count(&self) -> usize {
        self.statuses.len() + self.errors.len()
    }

    /// Whether every target answered and has all replicas ready.
    pub fn all_ready(&self) -> bool {
        self.errors.is_empty() && self.statuses.iter().all(StatusRecord::is_ready)
    }
}

/// Current unix time in whole seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
