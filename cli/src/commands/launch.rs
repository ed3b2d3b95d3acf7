//! `ec2-runner launch`: start runner instances for one unit or a batch.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::OutputSink;
use crate::application::services::run_batch;
use crate::commands::{GithubArgs, exit_code};
use crate::domain::config::{parse_json_list, split_list};
use crate::domain::{Batch, BatchInput, BatchReport, LaunchOverrides, Operation, resolve_launch};
use crate::infra::aws::AwsCliProvider;
use crate::output::json::format_result_map;

/// Arguments for the launch command.
#[derive(Args, Debug, Clone)]
pub struct LaunchArgs {
    #[command(flatten)]
    pub github: GithubArgs,

    /// Provider region (falls back to the AWS CLI's own configuration)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Instance type, e.g. t3.medium
    #[arg(long, env = "EC2_INSTANCE_TYPE")]
    pub instance_type: Option<String>,

    /// Subnet to launch into
    #[arg(long, env = "EC2_SUBNET_ID")]
    pub subnet_id: Option<String>,

    /// Comma separated security group ids
    #[arg(long, env = "EC2_SECURITY_GROUP_IDS")]
    pub security_group_ids: Option<String>,

    /// Image name pattern (`*` and `?` wildcards)
    #[arg(long, env = "EC2_IMAGE_NAME")]
    pub image_name: Option<String>,

    /// Comma separated image owners (account ids, `self`, `amazon`)
    #[arg(long, env = "EC2_IMAGE_OWNERS")]
    pub image_owners: Option<String>,

    /// Image filters as JSON: [{"Name": "...", "Values": ["..."]}]
    #[arg(long, env = "EC2_IMAGE_FILTERS")]
    pub image_filters: Option<String>,

    /// Resource tags as JSON: [{"Key": "...", "Value": "..."}]
    #[arg(long, env = "EC2_TAGS")]
    pub tags: Option<String>,

    /// User that runs the runner on the instance
    #[arg(long, env = "RUNNER_USER", default_value = "ubuntu")]
    pub runner_user: String,

    /// Directory holding the preinstalled runner
    #[arg(long, env = "RUNNER_DIR", default_value = "/home/ubuntu/actions-runner")]
    pub runner_dir: String,

    /// Unit identities, or a JSON object of per-unit overrides
    #[arg(long, env = "RUNNER_BATCH")]
    pub batch: Option<String>,
}

impl LaunchArgs {
    /// Command-line settings every unit starts from.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a JSON list flag does not parse.
    pub fn base(&self) -> Result<LaunchOverrides> {
        Ok(LaunchOverrides {
            instance_type: self.instance_type.clone(),
            subnet_id: self.subnet_id.clone(),
            security_group_ids: self.security_group_ids.as_deref().map(split_list),
            image_name: self.image_name.clone(),
            image_owners: self.image_owners.as_deref().map(split_list),
            image_filters: self
                .image_filters
                .as_deref()
                .map(|raw| parse_json_list("--image-filters", raw))
                .transpose()?,
            tags: self
                .tags
                .as_deref()
                .map(|raw| parse_json_list("--tags", raw))
                .transpose()?,
            runner_user: Some(self.runner_user.clone()),
            runner_dir: Some(self.runner_dir.clone()),
        })
    }

    /// Resolve every unit up front so bad input fails before anything launches.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for any invalid input.
    pub fn resolve(&self) -> Result<Batch> {
        let input = BatchInput::parse(self.batch.as_deref())?;
        resolve_launch(&self.base()?, &self.github.repository_url()?, input)
    }
}

/// Run `ec2-runner launch`.
///
/// # Errors
///
/// Returns an error for invalid configuration, a missing AWS CLI, or a
/// failure to publish outputs. Unit failures are reported, not returned.
pub async fn run(args: &LaunchArgs, app: &AppContext) -> Result<ExitCode> {
    let batch = args.resolve()?;
    let coordinator = args.github.coordinator()?;
    let compute = AwsCliProvider::default_runner(args.region.clone());
    compute.check_prerequisites().await?;

    tracing::info!(units = batch.units.len(), "launching");
    let report = run_batch(&compute, &coordinator, &app.log, Operation::Launch, &batch).await;

    if let Some(sink) = app.outputs.as_deref() {
        publish_outputs(sink, &report)?;
    }
    app.render_report(&report)?;
    Ok(exit_code(&report))
}

/// Publish `result-map`, plus `instance-id` and `label` for a single
/// non-batch launch that succeeded.
///
/// # Errors
///
/// Returns an error if the sink rejects a value.
pub fn publish_outputs(sink: &dyn OutputSink, report: &BatchReport) -> Result<()> {
    sink.set_output("result-map", &format_result_map(report)?)?;
    if let Some(record) = report.single_result() {
        sink.set_output("instance-id", &record.instance_id)?;
        sink.set_output("label", &record.label)?;
    }
    Ok(())
}
