//! Per-unit logging handle.

use crate::application::ports::{LogLevel, LogSink};
use crate::domain::UnitId;

/// A logging handle bound to one unit.
///
/// Every message is prefixed with `[unit] ` for batch units so interleaved
/// output from concurrent pipelines stays attributable. Each unit gets its own
/// handle; the sink itself is shared read-only.
#[derive(Clone, Copy)]
pub struct UnitLog<'a> {
    sink: &'a dyn LogSink,
    unit: &'a UnitId,
}

impl<'a> UnitLog<'a> {
    #[must_use]
    pub fn new(sink: &'a dyn LogSink, unit: &'a UnitId) -> Self {
        Self { sink, unit }
    }

    #[must_use]
    pub fn unit(&self) -> &UnitId {
        self.unit
    }

    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message);
    }

    fn emit(&self, level: LogLevel, message: &str) {
        self.sink
            .log(level, &format!("{}{message}", self.unit.log_prefix()));
    }
}
