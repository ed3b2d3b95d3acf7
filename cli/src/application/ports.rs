//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `runner_common`, never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use runner_common::{ImageFilter, ResourceTag, Runner};

use crate::domain::Image;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Provider-side narrowing for an image listing.
///
/// Implementations must also restrict the listing to images executable by the
/// caller and exclude deprecated images.
#[derive(Debug, Clone, Copy)]
pub struct ImageQuery<'a> {
    pub owners: &'a [String],
    pub filters: &'a [ImageFilter],
}

/// One page of an image listing.
#[derive(Debug, Clone, Default)]
pub struct ImagePage {
    pub images: Vec<Image>,
    /// Continuation token; `None` on the last page.
    pub next_token: Option<String>,
}

/// Parameters for creating exactly one instance.
#[derive(Debug, Clone, Copy)]
pub struct InstanceRequest<'a> {
    pub image_id: &'a str,
    pub instance_type: &'a str,
    pub subnet_id: Option<&'a str>,
    pub security_group_ids: &'a [String],
    /// Boot script run on first start.
    pub user_data: &'a str,
    /// Applied to the instance and its volumes when non-empty.
    pub tags: &'a [ResourceTag],
}

/// A created compute instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
}

/// Result of one provider-native "wait until running" call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Running,
    /// The wait primitive asks to be polled again.
    Retry,
    /// The wait primitive hit its ceiling.
    TimedOut,
    /// The instance entered a failure state.
    Failed(String),
}

/// One page of the coordinator's worker list.
#[derive(Debug, Clone, Default)]
pub struct WorkerPage {
    /// Total number of workers across all pages.
    pub total_count: u64,
    pub workers: Vec<Runner>,
}

// ── Compute Provider Port ─────────────────────────────────────────────────────

/// Compute provisioning operations.
///
/// Transient rate-limit rejections must be reported as
/// [`crate::domain::ProviderError::Throttled`]; that is the only error the
/// application layer retries.
#[allow(async_fn_in_trait)]
pub trait ComputeProvider {
    /// List one page of candidate boot images.
    async fn list_images(&self, query: &ImageQuery<'_>, next_token: Option<&str>)
    -> Result<ImagePage>;
    /// Submit one create request with count = 1.
    async fn create_instance(&self, request: &InstanceRequest<'_>) -> Result<Instance>;
    /// Block until the instance is running, giving up after `max_wait`.
    async fn wait_until_running(&self, instance_id: &str, max_wait: Duration)
    -> Result<WaitOutcome>;
    /// Submit one destroy request. Does not wait for termination.
    async fn destroy_instance(&self, instance_id: &str) -> Result<()>;
}

// ── Coordinator Port ──────────────────────────────────────────────────────────

/// CI coordinator worker registry operations.
#[allow(async_fn_in_trait)]
pub trait CoordinatorApi {
    /// Create a one-time worker registration token.
    async fn create_registration_token(&self) -> Result<String>;
    /// List one page (1-based) of registered workers.
    async fn list_workers(&self, page: u32, per_page: u32) -> Result<WorkerPage>;
    /// Delete a worker by its numeric id.
    async fn delete_worker(&self, worker_id: u64) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned) and
    /// the error must downcast to `crate::infra::command_runner::CommandTimeout`.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Logging and Output Ports ──────────────────────────────────────────────────

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Receives leveled log messages. Sync trait, no async needed.
pub trait LogSink {
    fn log(&self, level: LogLevel, message: &str);
}

/// Receives named outputs of a run.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink {
    /// Publish one output value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set_output(&self, name: &str, value: &str) -> Result<()>;
}
