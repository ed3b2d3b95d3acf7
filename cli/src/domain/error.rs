//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Callers that branch on the kind recover it with
//! `anyhow::Error::downcast_ref`, which also sees through added context.

use std::time::Duration;

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Bad or incomplete unit configuration. Raised before any pipeline runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no image selection criteria{unit}: set at least one of --image-name, --image-owners, --image-filters"
    )]
    MissingImageCriteria { unit: UnitSuffix },

    #[error("missing required value{unit}: {field}")]
    MissingField { field: &'static str, unit: UnitSuffix },

    #[error("invalid unit identity '{0}': must match [A-Za-z0-9_-]{{1,32}}")]
    InvalidUnitId(String),

    #[error("duplicate unit identity '{0}' in batch")]
    DuplicateUnit(String),

    #[error("batch input contains no units")]
    EmptyBatch,

    #[error("terminate batches need descriptors ({{\"<unit>\": {{\"instance_id\": ..., \"label\": ...}}}}), not a list of identities")]
    TerminateNeedsDescriptors,

    #[error("invalid JSON in {what}: {message}")]
    InvalidJson { what: &'static str, message: String },

    #[error("invalid repository '{0}': expected owner/repo")]
    InvalidRepository(String),
}

/// Renders ` for unit 'x'` after a message, or nothing for a single unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSuffix(pub String);

impl std::fmt::Display for UnitSuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, " for unit '{}'", self.0)
        }
    }
}

// ── Provider errors ───────────────────────────────────────────────────────────

/// The compute provider rejected a call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transient rate-limit rejection. The only retryable kind.
    #[error("{operation} throttled by provider: {message}")]
    Throttled { operation: String, message: String },

    #[error("{operation} rejected by provider: {message}")]
    Rejected { operation: String, message: String },

    #[error("{operation} still throttled after {attempts} attempts: {message}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        message: String,
    },

    #[error("instance {instance_id} failed to reach running state: {reason}")]
    InstanceFailed { instance_id: String, reason: String },

    #[error("unexpected provider response for {operation}: {message}")]
    BadResponse { operation: String, message: String },
}

impl ProviderError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }
}

// ── Registry errors ───────────────────────────────────────────────────────────

/// A call against the CI coordinator failed.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation} failed: {message}")]
    Request { operation: String, message: String },
}

// ── Selection and timeout errors ──────────────────────────────────────────────

/// No boot image survived the selection filters.
#[derive(Debug, Error)]
#[error("no boot image matches {criteria}")]
pub struct NoMatchError {
    pub criteria: String,
}

/// A bounded wait exceeded its ceiling.
#[derive(Debug, Error)]
pub enum TimeoutError {
    #[error("instance {instance_id} not running after {}s", after.as_secs())]
    InstanceRunning { instance_id: String, after: Duration },

    #[error("worker '{label}' not online after {}s of polling", after.as_secs())]
    WorkerOnline { label: String, after: Duration },
}
