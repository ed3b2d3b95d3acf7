//! Worker registry: registration tokens, online polling, removal.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! None of these calls are retried; a failed poll ends the wait.

use std::time::Duration;

use anyhow::Result;
use runner_common::Runner;
use tokio::time::Instant;

use crate::application::ports::CoordinatorApi;
use crate::application::unit_log::UnitLog;
use crate::domain::{RegistryError, TimeoutError};

/// Page size for worker listings.
pub const WORKER_PAGE_SIZE: u32 = 100;

/// Pause before the first online poll; a fresh instance needs time to boot
/// and register.
pub const ONLINE_GRACE: Duration = Duration::from_secs(30);

pub const ONLINE_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Polling budget after the grace period.
pub const ONLINE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Keep a `RegistryError` as is; wrap anything else as a failed `operation`.
fn into_registry_error(operation: &str, err: anyhow::Error) -> anyhow::Error {
    if err.downcast_ref::<RegistryError>().is_some() {
        return err;
    }
    RegistryError::Request {
        operation: operation.to_string(),
        message: format!("{err:#}"),
    }
    .into()
}

/// Fetch a one-time registration token.
///
/// # Errors
///
/// Returns a `RegistryError` if the coordinator call fails.
pub async fn get_registration_token(
    registry: &impl CoordinatorApi,
    log: &UnitLog<'_>,
) -> Result<String> {
    let token = registry
        .create_registration_token()
        .await
        .map_err(|e| into_registry_error("create registration token", e))?;
    log.debug("registration token acquired");
    Ok(token)
}

/// Find the worker carrying `label`, paging through the full worker list.
///
/// # Errors
///
/// Returns a `RegistryError` if any page fails to load.
pub async fn find_worker(registry: &impl CoordinatorApi, label: &str) -> Result<Option<Runner>> {
    let mut workers = Vec::new();
    let mut page = 1;
    loop {
        let listing = registry
            .list_workers(page, WORKER_PAGE_SIZE)
            .await
            .map_err(|e| into_registry_error("list workers", e))?;
        let received = listing.workers.len();
        workers.extend(listing.workers);
        // An empty page means the reported total is stale; stop instead of spinning.
        if received == 0 || workers.len() as u64 >= listing.total_count {
            break;
        }
        page += 1;
    }
    Ok(workers.into_iter().find(|w| w.has_label(label)))
}

/// Wait for the worker labelled `label` to come online.
///
/// Sleeps [`ONLINE_GRACE`], then polls every [`ONLINE_POLL_INTERVAL`] for up
/// to [`ONLINE_TIMEOUT`].
///
/// # Errors
///
/// Returns [`TimeoutError::WorkerOnline`] when the budget runs out, or a
/// `RegistryError` as soon as a poll fails.
pub async fn await_online(
    registry: &impl CoordinatorApi,
    label: &str,
    log: &UnitLog<'_>,
) -> Result<Runner> {
    log.info(&format!(
        "waiting {}s for worker '{label}' to register",
        ONLINE_GRACE.as_secs()
    ));
    tokio::time::sleep(ONLINE_GRACE).await;

    let started = Instant::now();
    loop {
        match find_worker(registry, label).await? {
            Some(worker) if worker.is_online() => {
                log.info(&format!("worker '{label}' is online (id {})", worker.id));
                return Ok(worker);
            }
            Some(worker) => log.debug(&format!(
                "worker '{label}' registered but {:?}",
                worker.status
            )),
            None => log.debug(&format!("worker '{label}' not registered yet")),
        }
        if started.elapsed() >= ONLINE_TIMEOUT {
            return Err(TimeoutError::WorkerOnline {
                label: label.to_string(),
                after: ONLINE_TIMEOUT,
            }
            .into());
        }
        tokio::time::sleep(ONLINE_POLL_INTERVAL).await;
    }
}

/// Remove the worker labelled `label`. A missing worker is not an error.
///
/// # Errors
///
/// Returns a `RegistryError` if the lookup or the delete call fails.
pub async fn remove_worker(
    registry: &impl CoordinatorApi,
    label: &str,
    log: &UnitLog<'_>,
) -> Result<()> {
    let Some(worker) = find_worker(registry, label).await? else {
        log.info(&format!("no worker labelled '{label}'; nothing to remove"));
        return Ok(());
    };
    registry
        .delete_worker(worker.id)
        .await
        .map_err(|e| into_registry_error("delete worker", e))?;
    log.info(&format!("worker '{label}' removed (id {})", worker.id));
    Ok(())
}
