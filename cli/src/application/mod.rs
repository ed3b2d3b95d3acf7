//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;
pub mod unit_log;

pub use ports::{
    CommandRunner, ComputeProvider, CoordinatorApi, LogLevel, LogSink, OutputSink, WaitOutcome,
};
pub use unit_log::UnitLog;
