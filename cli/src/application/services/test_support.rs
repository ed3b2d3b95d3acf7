//! Shared test helpers for service tests.
//!
//! Provides macros to generate `ComputeProvider` / `CoordinatorApi` stub
//! methods that bail with "not expected", plus small record builders.

use runner_common::{Runner, RunnerLabel, RunnerStatus};

use crate::domain::{Image, ImageCriteria, LaunchConfig};

pub fn worker(id: u64, label: &str, status: RunnerStatus) -> Runner {
    Runner {
        id,
        name: format!("runner-{id}"),
        status,
        busy: false,
        labels: vec![
            RunnerLabel {
                id: None,
                name: "self-hosted".into(),
                kind: Some("read-only".into()),
            },
            RunnerLabel {
                id: None,
                name: label.into(),
                kind: Some("custom".into()),
            },
        ],
    }
}

pub fn image(id: &str, name: &str, created: &str) -> Image {
    Image {
        id: id.into(),
        name: name.into(),
        created_at: Some(created.parse().expect("timestamp")),
        deprecated_at: None,
    }
}

pub fn launch_config() -> LaunchConfig {
    LaunchConfig {
        repository_url: "https://github.com/acme/widgets".into(),
        runner_user: "ubuntu".into(),
        runner_dir: "/home/ubuntu/actions-runner".into(),
        instance_type: "t3.micro".into(),
        subnet_id: Some("subnet-1".into()),
        security_group_ids: vec!["sg-1".into()],
        tags: Vec::new(),
        image: ImageCriteria {
            name_pattern: Some("runner-*".into()),
            ..ImageCriteria::default()
        },
    }
}

/// Generate `ComputeProvider` stub methods that bail with "not expected".
///
/// Usage: `impl_compute_stubs!(list_images, create_instance);`
/// Omit any method you implement yourself.
macro_rules! impl_compute_stubs {
    ($($method:ident),* $(,)?) => {
        $(impl_compute_stubs!(@one $method);)*
    };
    (@one list_images) => {
        async fn list_images(
            &self,
            _: &$crate::application::ports::ImageQuery<'_>,
            _: Option<&str>,
        ) -> anyhow::Result<$crate::application::ports::ImagePage> {
            anyhow::bail!("not expected")
        }
    };
    (@one create_instance) => {
        async fn create_instance(
            &self,
            _: &$crate::application::ports::InstanceRequest<'_>,
        ) -> anyhow::Result<$crate::application::ports::Instance> {
            anyhow::bail!("not expected")
        }
    };
    (@one wait_until_running) => {
        async fn wait_until_running(
            &self,
            _: &str,
            _: std::time::Duration,
        ) -> anyhow::Result<$crate::application::ports::WaitOutcome> {
            anyhow::bail!("not expected")
        }
    };
    (@one destroy_instance) => {
        async fn destroy_instance(&self, _: &str) -> anyhow::Result<()> {
            anyhow::bail!("not expected")
        }
    };
}

/// Generate `CoordinatorApi` stub methods that bail with "not expected".
macro_rules! impl_coordinator_stubs {
    ($($method:ident),* $(,)?) => {
        $(impl_coordinator_stubs!(@one $method);)*
    };
    (@one create_registration_token) => {
        async fn create_registration_token(&self) -> anyhow::Result<String> {
            anyhow::bail!("not expected")
        }
    };
    (@one list_workers) => {
        async fn list_workers(
            &self,
            _: u32,
            _: u32,
        ) -> anyhow::Result<$crate::application::ports::WorkerPage> {
            anyhow::bail!("not expected")
        }
    };
    (@one delete_worker) => {
        async fn delete_worker(&self, _: u64) -> anyhow::Result<()> {
            anyhow::bail!("not expected")
        }
    };
}

pub(crate) use impl_compute_stubs;
pub(crate) use impl_coordinator_stubs;
