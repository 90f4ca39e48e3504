//! Terminal styling for text reports.

use console::Style;

/// Styles used by the console report.
#[derive(Debug, Clone)]
pub struct ReportTheme {
    /// Passed requirements (green).
    pub success: Style,
    /// Failed optional requirements (orange).
    pub warning: Style,
    /// Failed mandatory requirements (red bold).
    pub error: Style,
    /// Report title and section headers (bold magenta).
    pub header: Style,
    /// Secondary text such as memos (dim).
    pub dim: Style,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTheme {
    /// Create the coloured theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            header: Style::new().bold().magenta(),
            dim: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            header: Style::new(),
            dim: Style::new(),
        }
    }
}

/// Whether colored output should be used.
///
/// Respects `NO_COLOR` and whether stdout is a terminal.
pub fn should_use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::Term::stdout().is_term()
}
