//! Instance lifecycle: create, wait for running, destroy.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{ComputeProvider, Instance, InstanceRequest, WaitOutcome};
use crate::application::unit_log::UnitLog;
use crate::domain::{Image, LaunchConfig, ProviderError, TimeoutError, bootscript};

/// Ceiling handed to each provider-native running wait.
pub const RUNNING_WAIT_CEILING: Duration = Duration::from_secs(5 * 60);

/// Total attempts (first call included) for a throttled provider call.
pub const THROTTLE_MAX_ATTEMPTS: u32 = 6;

/// Fixed pause between throttled attempts.
pub const THROTTLE_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Run `call`, retrying only on [`ProviderError::Throttled`].
///
/// At most [`THROTTLE_MAX_ATTEMPTS`] calls are made, [`THROTTLE_RETRY_INTERVAL`]
/// apart.
///
/// # Errors
///
/// Returns [`ProviderError::RetriesExhausted`] when every attempt was
/// throttled, or the first non-retryable error as a `ProviderError`.
pub async fn with_throttle_retry<T, F, Fut>(
    operation: &str,
    log: &UnitLog<'_>,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        let retryable = err
            .downcast_ref::<ProviderError>()
            .is_some_and(ProviderError::is_retryable);
        if !retryable {
            return Err(into_provider_error(operation, err));
        }
        if attempt >= THROTTLE_MAX_ATTEMPTS {
            return Err(ProviderError::RetriesExhausted {
                operation: operation.to_string(),
                attempts: attempt,
                message: format!("{err:#}"),
            }
            .into());
        }
        log.warn(&format!(
            "{operation} throttled (attempt {attempt}/{THROTTLE_MAX_ATTEMPTS}), retrying in {}s",
            THROTTLE_RETRY_INTERVAL.as_secs()
        ));
        tokio::time::sleep(THROTTLE_RETRY_INTERVAL).await;
        attempt += 1;
    }
}

/// Keep a `ProviderError` as is; wrap anything else as a rejection of `operation`.
pub(crate) fn into_provider_error(operation: &str, err: anyhow::Error) -> anyhow::Error {
    if err.downcast_ref::<ProviderError>().is_some() {
        return err;
    }
    ProviderError::Rejected {
        operation: operation.to_string(),
        message: format!("{err:#}"),
    }
    .into()
}

/// Create the instance that will register as runner `label`.
///
/// # Errors
///
/// Returns a `ProviderError` if the create request is rejected or stays
/// throttled.
pub async fn launch(
    compute: &impl ComputeProvider,
    config: &LaunchConfig,
    label: &str,
    registration_token: &str,
    image: &Image,
    log: &UnitLog<'_>,
) -> Result<Instance> {
    let user_data = bootscript::render(config, label, registration_token);
    let request = InstanceRequest {
        image_id: &image.id,
        instance_type: &config.instance_type,
        subnet_id: config.subnet_id.as_deref(),
        security_group_ids: &config.security_group_ids,
        user_data: &user_data,
        tags: &config.tags,
    };
    let request = &request;
    let instance = with_throttle_retry("create instance", log, move || {
        compute.create_instance(request)
    })
    .await?;
    log.info(&format!(
        "instance {} created ({}, image {})",
        instance.id, config.instance_type, image.id
    ));
    Ok(instance)
}

/// Wait for the instance to reach the running state.
///
/// Each provider wait is bounded by [`RUNNING_WAIT_CEILING`]; a
/// [`WaitOutcome::Retry`] starts a fresh wait.
///
/// # Errors
///
/// Returns [`TimeoutError::InstanceRunning`] when the wait hits its ceiling,
/// or a `ProviderError` when the instance fails or the wait call errors.
pub async fn await_running(
    compute: &impl ComputeProvider,
    instance: &Instance,
    log: &UnitLog<'_>,
) -> Result<()> {
    log.info(&format!("waiting for instance {} to run", instance.id));
    loop {
        let outcome = compute
            .wait_until_running(&instance.id, RUNNING_WAIT_CEILING)
            .await
            .map_err(|e| into_provider_error("wait for instance running", e))?;
        match outcome {
            WaitOutcome::Running => {
                log.info(&format!("instance {} is running", instance.id));
                return Ok(());
            }
            WaitOutcome::Retry => log.debug("running wait asked to poll again"),
            WaitOutcome::TimedOut => {
                return Err(TimeoutError::InstanceRunning {
                    instance_id: instance.id.clone(),
                    after: RUNNING_WAIT_CEILING,
                }
                .into());
            }
            WaitOutcome::Failed(reason) => {
                return Err(ProviderError::InstanceFailed {
                    instance_id: instance.id.clone(),
                    reason,
                }
                .into());
            }
        }
    }
}

/// Submit the destroy request. Does not wait for termination.
///
/// # Errors
///
/// Returns a `ProviderError` if the request is rejected or stays throttled.
pub async fn terminate(
    compute: &impl ComputeProvider,
    instance_id: &str,
    log: &UnitLog<'_>,
) -> Result<()> {
    with_throttle_retry("terminate instance", log, move || {
        compute.destroy_instance(instance_id)
    })
    .await?;
    log.info(&format!("instance {instance_id} terminating"));
    Ok(())
}
