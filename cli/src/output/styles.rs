//! Colors for the end-of-run batch summary, via an owo-colors stylesheet.

use owo_colors::Style;

/// Stylesheet the human renderer applies to a batch report.
///
/// Stays unstyled until [`Styles::colorize`] is called for a color stderr.
#[derive(Default, Clone)]
pub struct Styles {
    /// Summary line of a fully settled batch (green)
    pub success: Style,
    /// Summary line when some units failed (yellow)
    pub warning: Style,
    /// Per-unit failure lines (red)
    pub error: Style,
    /// Unit keys in the results list
    pub dim: Style,
    /// Batch heading with the unit count
    pub header: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }
}
