//! Human-readable terminal renderer.

use crate::domain::{BatchReport, Operation};
use crate::output::OutputContext;

/// Renders batch outcomes as terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the end-of-run summary. Failures are printed even when quiet.
    pub fn render_report(&self, report: &BatchReport) {
        let (noun, verb) = match report.operation {
            Operation::Launch => ("launch", "launched"),
            Operation::Terminate => ("terminate", "terminated"),
        };
        if report.declared {
            self.ctx.header(&format!("{noun} batch ({} units)", report.units));
        }
        for (unit, record) in &report.results {
            let key = if unit.is_empty() {
                "instance:".to_string()
            } else {
                format!("{unit}:")
            };
            self.ctx.kv(&key, &format!("{} ({})", record.instance_id, record.label));
        }
        for failure in &report.failures {
            if failure.unit.is_empty() {
                self.ctx.error(&failure.error);
            } else {
                self.ctx.error(&format!("[{}] {}", failure.unit, failure.error));
            }
        }
        let summary = format!("{}/{} units {verb}", report.succeeded(), report.units);
        if report.is_success() {
            self.ctx.success(&summary);
        } else {
            self.ctx.warn(&summary);
        }
    }
}
