//! Application context: unified state passed to every command handler.
//!
//! `AppContext` bundles the terminal output context, the log sink handed to
//! the unit pipelines, and the step output sink. Adding a cross-cutting
//! concern requires only one field change here.

use anyhow::Result;

use crate::application::ports::OutputSink;
use crate::domain::BatchReport;
use crate::infra::env::RuntimeEnv;
use crate::infra::logging::TracingLogSink;
use crate::infra::output_sink::{GithubOutputFile, StdoutOutputs};
use crate::output::{HumanRenderer, OutputContext, json};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Sink for per-unit log messages.
    pub log: TracingLogSink,
    /// Where step outputs go; `None` when stdout is taken by `--json`.
    pub outputs: Option<Box<dyn OutputSink>>,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags and the runtime
    /// environment.
    #[must_use]
    pub fn new(flags: AppFlags, env: &RuntimeEnv) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            mode,
            log: TracingLogSink,
            outputs: select_output_sink(env.output.as_deref(), mode),
        }
    }

    /// Render the settled batch in the active mode.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_report(&self, report: &BatchReport) -> Result<()> {
        match self.mode {
            OutputMode::Human => HumanRenderer::new(&self.output).render_report(report),
            OutputMode::Json => println!("{}", json::format_report(report)?),
        }
        Ok(())
    }
}

/// The step output file when configured, otherwise stdout unless a JSON
/// report claims it. The JSON report carries the result map itself.
fn select_output_sink(
    github_output: Option<&str>,
    mode: OutputMode,
) -> Option<Box<dyn OutputSink>> {
    match github_output.filter(|p| !p.is_empty()) {
        Some(path) => Some(Box::new(GithubOutputFile::new(path))),
        None if mode == OutputMode::Json => None,
        None => Some(Box::new(StdoutOutputs)),
    }
}
