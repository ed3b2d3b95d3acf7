//! Infrastructure implementation of the `ComputeProvider` port.
//!
//! `AwsCliProvider<R>` routes every EC2 call through the `aws` CLI via a
//! `CommandRunner`, parsing its JSON output and classifying its stderr.

use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use runner_common::ResourceTag;
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::{
    CommandRunner, ComputeProvider, ImagePage, ImageQuery, Instance, InstanceRequest, WaitOutcome,
};
use crate::domain::{Image, ProviderError};
use crate::infra::command_runner::{CommandTimeout, DEFAULT_CMD_TIMEOUT, TokioCommandRunner};

/// Page size requested from `describe-images`.
pub const IMAGE_PAGE_SIZE: &str = "100";

/// Oldest supported AWS CLI.
pub const AWS_CLI_MIN_VERSION: semver::Version = semver::Version::new(2, 0, 0);

/// Error codes the EC2 API uses for rate limiting.
const THROTTLE_MARKERS: &[&str] = &[
    "RequestLimitExceeded",
    "Throttling",
    "ThrottlingException",
    "TooManyRequests",
];

/// Printed by the CLI waiter when its own poll budget runs out.
const WAITER_EXHAUSTED: &str = "Max attempts exceeded";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeImages {
    #[serde(default)]
    images: Vec<ImageRecord>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageRecord {
    image_id: String,
    #[serde(default)]
    name: String,
    creation_date: Option<String>,
    deprecation_time: Option<String>,
}

impl From<ImageRecord> for Image {
    fn from(record: ImageRecord) -> Self {
        Self {
            id: record.image_id,
            name: record.name,
            created_at: record.creation_date.as_deref().and_then(parse_time),
            deprecated_at: record.deprecation_time.as_deref().and_then(parse_time),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RunInstances {
    #[serde(default)]
    instances: Vec<InstanceRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceRecord {
    instance_id: String,
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok()
}

/// Whether CLI stderr reports an API throttle.
#[must_use]
pub fn is_throttled(stderr: &str) -> bool {
    THROTTLE_MARKERS.iter().any(|m| stderr.contains(m))
}

/// Compute provider backed by the AWS CLI.
///
/// Generic over `R: CommandRunner` so tests can inject a recording runner
/// without spawning real processes.
pub struct AwsCliProvider<R: CommandRunner> {
    runner: R,
    region: Option<String>,
}

impl<R: CommandRunner> AwsCliProvider<R> {
    pub fn new(runner: R, region: Option<String>) -> Self {
        Self { runner, region }
    }

    /// The underlying command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Fail early when the installed AWS CLI is missing or too old.
    ///
    /// # Errors
    ///
    /// Returns an error if `aws --version` cannot run or reports a version
    /// below [`AWS_CLI_MIN_VERSION`].
    pub async fn check_prerequisites(&self) -> Result<()> {
        let output = self
            .runner
            .run("aws", &["--version"])
            .await
            .map_err(|_| anyhow::anyhow!("AWS CLI not available. Install AWS CLI v2 and retry."))?;
        // Older builds print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        if let Some(ver_str) = banner
            .split_whitespace()
            .next()
            .and_then(|tok| tok.strip_prefix("aws-cli/"))
            && let Ok(v) = semver::Version::parse(ver_str)
            && v < AWS_CLI_MIN_VERSION
        {
            anyhow::bail!("AWS CLI {v} is too old; version {AWS_CLI_MIN_VERSION} or newer is required");
        }
        Ok(())
    }

    fn with_common(&self, mut args: Vec<String>) -> Vec<String> {
        if let Some(region) = &self.region {
            args.push("--region".into());
            args.push(region.clone());
        }
        args.push("--output".into());
        args.push("json".into());
        args
    }

    /// Run one `aws ec2` call and return stdout on success.
    async fn ec2(&self, operation: &str, args: Vec<String>) -> Result<String> {
        let args = self.with_common(args);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run("aws", &argv)
            .await
            .with_context(|| format!("aws ec2 {operation}"))?;
        check_status(operation, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl AwsCliProvider<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(region: Option<String>) -> Self {
        Self::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT), region)
    }
}

fn check_status(operation: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let message = if stderr.is_empty() {
        format!("aws exited with {}", output.status)
    } else {
        stderr
    };
    if is_throttled(&message) {
        return Err(ProviderError::Throttled {
            operation: operation.to_string(),
            message,
        }
        .into());
    }
    Err(ProviderError::Rejected {
        operation: operation.to_string(),
        message,
    }
    .into())
}

fn bad_response(operation: &str, err: impl std::fmt::Display) -> anyhow::Error {
    ProviderError::BadResponse {
        operation: operation.to_string(),
        message: err.to_string(),
    }
    .into()
}

fn tag_specifications(tags: &[ResourceTag]) -> String {
    json!([
        { "ResourceType": "instance", "Tags": tags },
        { "ResourceType": "volume", "Tags": tags },
    ])
    .to_string()
}

impl<R: CommandRunner> ComputeProvider for AwsCliProvider<R> {
    async fn list_images(
        &self,
        query: &ImageQuery<'_>,
        next_token: Option<&str>,
    ) -> Result<ImagePage> {
        const OP: &str = "describe-images";
        let mut args: Vec<String> = vec![
            "ec2".into(),
            OP.into(),
            "--executable-users".into(),
            "self".into(),
        ];
        if !query.owners.is_empty() {
            args.push("--owners".into());
            args.extend(query.owners.iter().cloned());
        }
        if !query.filters.is_empty() {
            args.push("--filters".into());
            args.push(serde_json::to_string(query.filters)?);
        }
        args.push("--max-items".into());
        args.push(IMAGE_PAGE_SIZE.into());
        if let Some(token) = next_token {
            args.push("--starting-token".into());
            args.push(token.into());
        }

        let stdout = self.ec2(OP, args).await?;
        let parsed: DescribeImages =
            serde_json::from_str(&stdout).map_err(|e| bad_response(OP, e))?;
        Ok(ImagePage {
            images: parsed.images.into_iter().map(Image::from).collect(),
            next_token: parsed.next_token.filter(|t| !t.is_empty()),
        })
    }

    async fn create_instance(&self, request: &InstanceRequest<'_>) -> Result<Instance> {
        const OP: &str = "run-instances";
        let mut args: Vec<String> = vec![
            "ec2".into(),
            OP.into(),
            "--image-id".into(),
            request.image_id.into(),
            "--instance-type".into(),
            request.instance_type.into(),
            "--min-count".into(),
            "1".into(),
            "--max-count".into(),
            "1".into(),
        ];
        if let Some(subnet) = request.subnet_id {
            args.push("--subnet-id".into());
            args.push(subnet.into());
        }
        if !request.security_group_ids.is_empty() {
            args.push("--security-group-ids".into());
            args.extend(request.security_group_ids.iter().cloned());
        }
        args.push("--user-data".into());
        args.push(request.user_data.into());
        if !request.tags.is_empty() {
            args.push("--tag-specifications".into());
            args.push(tag_specifications(request.tags));
        }

        let stdout = self.ec2(OP, args).await?;
        let parsed: RunInstances =
            serde_json::from_str(&stdout).map_err(|e| bad_response(OP, e))?;
        let record = parsed
            .instances
            .into_iter()
            .next()
            .ok_or_else(|| bad_response(OP, "no instance in response"))?;
        Ok(Instance {
            id: record.instance_id,
        })
    }

    async fn wait_until_running(
        &self,
        instance_id: &str,
        max_wait: Duration,
    ) -> Result<WaitOutcome> {
        let args = self.with_common(vec![
            "ec2".into(),
            "wait".into(),
            "instance-running".into(),
            "--instance-ids".into(),
            instance_id.into(),
        ]);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = match self.runner.run_with_timeout("aws", &argv, max_wait).await {
            Ok(output) => output,
            Err(err) if err.downcast_ref::<CommandTimeout>().is_some() => {
                return Ok(WaitOutcome::TimedOut);
            }
            Err(err) => return Err(err.context("aws ec2 wait instance-running")),
        };
        if output.status.success() {
            return Ok(WaitOutcome::Running);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains(WAITER_EXHAUSTED) || is_throttled(&stderr) {
            return Ok(WaitOutcome::Retry);
        }
        Ok(WaitOutcome::Failed(stderr))
    }

    async fn destroy_instance(&self, instance_id: &str) -> Result<()> {
        const OP: &str = "terminate-instances";
        self.ec2(
            OP,
            vec![
                "ec2".into(),
                OP.into(),
                "--instance-ids".into(),
                instance_id.into(),
            ],
        )
        .await?;
        Ok(())
    }
}
