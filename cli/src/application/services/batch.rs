//! Batch orchestration: run every unit concurrently and settle them all.

use anyhow::Result;
use futures_util::future::join_all;
use runner_common::UnitRecord;

use crate::application::ports::{ComputeProvider, CoordinatorApi, LogSink};
use crate::application::services::pipeline::run_unit;
use crate::application::unit_log::UnitLog;
use crate::domain::{Batch, BatchReport, Operation, Unit};

/// Run all units of `batch` and wait for every one of them to settle.
///
/// A failing unit never cancels its siblings. Each failure is logged at
/// error level under the unit's prefix and recorded in the report; launch
/// results of successful units are always kept.
pub async fn run_batch(
    compute: &impl ComputeProvider,
    coordinator: &impl CoordinatorApi,
    sink: &dyn LogSink,
    operation: Operation,
    batch: &Batch,
) -> BatchReport {
    let settled = join_all(
        batch
            .units
            .iter()
            .map(|unit| settle_unit(compute, coordinator, sink, unit)),
    )
    .await;

    let mut report = BatchReport::new(operation, batch.declared, batch.units.len());
    for (unit, outcome) in batch.units.iter().zip(settled) {
        report.settle(&unit.id, outcome.map_err(|e| format!("{e:#}")));
    }
    report
}

async fn settle_unit(
    compute: &impl ComputeProvider,
    coordinator: &impl CoordinatorApi,
    sink: &dyn LogSink,
    unit: &Unit,
) -> Result<Option<UnitRecord>> {
    let log = UnitLog::new(sink, &unit.id);
    let outcome = run_unit(compute, coordinator, unit, &log).await;
    if let Err(err) = &outcome {
        log.error(&format!("{err:#}"));
    }
    outcome
}
