//! `ec2-runner terminate`: destroy runner instances and deregister them.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::run_batch;
use crate::commands::{GithubArgs, exit_code};
use crate::domain::{Batch, BatchInput, Operation, TerminateInput, resolve_terminate};
use crate::infra::aws::AwsCliProvider;

/// Arguments for the terminate command.
#[derive(Args, Debug, Clone)]
pub struct TerminateArgs {
    #[command(flatten)]
    pub github: GithubArgs,

    /// Provider region (falls back to the AWS CLI's own configuration)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Instance to terminate (single unit)
    #[arg(long, env = "EC2_INSTANCE_ID")]
    pub instance_id: Option<String>,

    /// Runner label to remove (single unit)
    #[arg(long, env = "RUNNER_LABEL")]
    pub label: Option<String>,

    /// JSON object of unit -> {"instance_id", "label"}, e.g. a launch result-map
    #[arg(long, env = "RUNNER_BATCH")]
    pub batch: Option<String>,
}

impl TerminateArgs {
    /// # Errors
    ///
    /// Returns a `ConfigError` for any invalid input.
    pub fn resolve(&self) -> Result<Batch> {
        let input = BatchInput::parse(self.batch.as_deref())?;
        let direct = TerminateInput {
            instance_id: self.instance_id.clone(),
            label: self.label.clone(),
        };
        resolve_terminate(&direct, input)
    }
}

/// Run `ec2-runner terminate`. Emits no step outputs.
///
/// # Errors
///
/// Returns an error for invalid configuration. Unit failures are reported,
/// not returned.
pub async fn run(args: &TerminateArgs, app: &AppContext) -> Result<ExitCode> {
    let batch = args.resolve()?;
    let coordinator = args.github.coordinator()?;
    let compute = AwsCliProvider::default_runner(args.region.clone());

    tracing::info!(units = batch.units.len(), "terminating");
    let report = run_batch(&compute, &coordinator, &app.log, Operation::Terminate, &batch).await;

    app.render_report(&report)?;
    Ok(exit_code(&report))
}
