//! Infrastructure implementation of the `CoordinatorApi` port for the GitHub
//! Actions self-hosted runner REST API.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use runner_common::{RegistrationToken, RunnerList};
use serde::de::DeserializeOwned;

use crate::application::ports::{CoordinatorApi, WorkerPage};
use crate::domain::RegistryError;

pub const GITHUB_API_VERSION: &str = "2022-11-28";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Coordinator client scoped to one repository.
pub struct GithubCoordinator {
    client: Client,
    runners_url: String,
    token: String,
}

impl GithubCoordinator {
    /// Build a client for `repository` (`owner/repo`) under `api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_url: &str, repository: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        let client = Client::builder()
            .user_agent(concat!("ec2-runner/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            runners_url: format!(
                "{}/repos/{repository}/actions/runners",
                api_url.trim_end_matches('/')
            ),
            token: token.to_string(),
        })
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| RegistryError::Request {
                operation: operation.to_string(),
                message: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: body.trim().to_string(),
            }
            .into());
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(operation, request).await?;
        let value = response.json().await.map_err(|e| RegistryError::Request {
            operation: operation.to_string(),
            message: format!("invalid response body: {e}"),
        })?;
        Ok(value)
    }
}

impl CoordinatorApi for GithubCoordinator {
    async fn create_registration_token(&self) -> Result<String> {
        let url = format!("{}/registration-token", self.runners_url);
        let token: RegistrationToken = self
            .send_json("create registration token", self.client.post(url))
            .await?;
        Ok(token.token)
    }

    async fn list_workers(&self, page: u32, per_page: u32) -> Result<WorkerPage> {
        let request = self
            .client
            .get(&self.runners_url)
            .query(&[("per_page", per_page), ("page", page)]);
        let list: RunnerList = self.send_json("list runners", request).await?;
        Ok(WorkerPage {
            total_count: list.total_count,
            workers: list.runners,
        })
    }

    async fn delete_worker(&self, worker_id: u64) -> Result<()> {
        let url = format!("{}/{worker_id}", self.runners_url);
        self.send("delete runner", self.client.delete(url)).await?;
        Ok(())
    }
}
