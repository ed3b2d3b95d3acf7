//! Batch outcome aggregation.

use std::collections::BTreeMap;

use runner_common::UnitRecord;
use serde::Serialize;

use crate::domain::unit::UnitId;

/// Which pipeline a batch ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Launch,
    Terminate,
}

/// A unit whose pipeline failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    pub unit: String,
    pub error: String,
}

/// Aggregate outcome of a settled batch.
///
/// Successful units are always present in `results` (launch only), however
/// many siblings failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub operation: Operation,
    pub declared: bool,
    pub units: usize,
    pub results: BTreeMap<String, UnitRecord>,
    pub failures: Vec<UnitFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn new(operation: Operation, declared: bool, units: usize) -> Self {
        Self {
            operation,
            declared,
            units,
            results: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    /// Record a settled unit.
    ///
    /// Terminate units carry no record, so they never enter `results`.
    pub fn settle(&mut self, unit: &UnitId, outcome: Result<Option<UnitRecord>, String>) {
        match outcome {
            Ok(Some(record)) if self.operation == Operation::Launch => {
                self.results.insert(unit.as_str().to_string(), record);
            }
            Ok(_) => {}
            Err(error) => self.failures.push(UnitFailure {
                unit: unit.as_str().to_string(),
                error,
            }),
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.units - self.failures.len()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The lone launch result of a non-batch invocation, exposed as the
    /// `instance-id` / `label` convenience outputs.
    #[must_use]
    pub fn single_result(&self) -> Option<&UnitRecord> {
        if self.operation != Operation::Launch || self.declared || self.units != 1 {
            return None;
        }
        self.results.values().next()
    }
}
