//! Command implementations

pub mod launch;
pub mod terminate;
pub mod version;

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::domain::BatchReport;
use crate::domain::config::repository_url;
use crate::infra::github::GithubCoordinator;

/// Coordinator connection arguments shared by `launch` and `terminate`.
#[derive(Args, Debug, Clone)]
pub struct GithubArgs {
    /// Token allowed to administer the repository's self-hosted runners
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Repository the runners register with, as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// Web base URL the runner registers against
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = "https://github.com")]
    pub github_server_url: String,
}

impl GithubArgs {
    /// Repository URL embedded in the boot script.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `--repository` is not `owner/repo`.
    pub fn repository_url(&self) -> Result<String> {
        repository_url(&self.github_server_url, &self.repository)
    }

    /// Build the coordinator client after validating the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository is malformed or the HTTP client
    /// cannot be built.
    pub fn coordinator(&self) -> Result<GithubCoordinator> {
        self.repository_url()?;
        GithubCoordinator::new(&self.github_api_url, &self.repository, &self.github_token)
    }
}

/// Non-zero when any unit failed.
#[must_use]
pub fn exit_code(report: &BatchReport) -> ExitCode {
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
