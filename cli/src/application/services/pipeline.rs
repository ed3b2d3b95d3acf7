//! Per-unit pipelines.
//!
//! Steps inside a unit run strictly in order and the first failure aborts the
//! unit. Failures are wrapped with the step that produced them.

use anyhow::{Context, Result};
use runner_common::UnitRecord;

use crate::application::ports::{ComputeProvider, CoordinatorApi};
use crate::application::services::{image_select, instance, registry};
use crate::application::unit_log::UnitLog;
use crate::domain::{LaunchConfig, TerminateConfig, Unit, UnitPlan, generate_label};

/// Launch one unit: label, token, image, instance, running, online.
///
/// # Errors
///
/// Returns the first failing step's error with the step name as context.
pub async fn launch_unit(
    compute: &impl ComputeProvider,
    coordinator: &impl CoordinatorApi,
    config: &LaunchConfig,
    log: &UnitLog<'_>,
) -> Result<UnitRecord> {
    let label = generate_label(log.unit());
    log.info(&format!("launching runner '{label}'"));

    let token = registry::get_registration_token(coordinator, log)
        .await
        .context("requesting registration token")?;
    let image = image_select::select_image(compute, &config.image, log)
        .await
        .context("selecting boot image")?;
    let created = instance::launch(compute, config, &label, &token, &image, log)
        .await
        .context("creating instance")?;
    instance::await_running(compute, &created, log)
        .await
        .with_context(|| format!("waiting for instance {} to run", created.id))?;
    registry::await_online(coordinator, &label, log)
        .await
        .with_context(|| format!("waiting for runner on instance {} to come online", created.id))?;

    Ok(UnitRecord {
        instance_id: created.id,
        label,
    })
}

/// Terminate one unit: destroy the instance, then deregister its worker.
///
/// # Errors
///
/// Returns the first failing step's error; the worker is left registered if
/// the destroy request fails.
pub async fn terminate_unit(
    compute: &impl ComputeProvider,
    coordinator: &impl CoordinatorApi,
    config: &TerminateConfig,
    log: &UnitLog<'_>,
) -> Result<()> {
    instance::terminate(compute, &config.instance_id, log)
        .await
        .with_context(|| format!("terminating instance {}", config.instance_id))?;
    registry::remove_worker(coordinator, &config.label, log)
        .await
        .with_context(|| format!("removing runner '{}'", config.label))?;
    Ok(())
}

/// Run whichever pipeline `unit` carries. Launch yields its record.
///
/// # Errors
///
/// Propagates the pipeline's error.
pub async fn run_unit(
    compute: &impl ComputeProvider,
    coordinator: &impl CoordinatorApi,
    unit: &Unit,
    log: &UnitLog<'_>,
) -> Result<Option<UnitRecord>> {
    match &unit.plan {
        UnitPlan::Launch(config) => launch_unit(compute, coordinator, config, log)
            .await
            .map(Some),
        UnitPlan::Terminate(config) => terminate_unit(compute, coordinator, config, log)
            .await
            .map(|()| None),
    }
}
