//! Plain-text report for terminals.
//!
//! Markup in `by` and `memo` is stripped; colors are optional.

use std::io::{self, Write};

use super::theme::ReportTheme;
use super::{strip_tags, ReportRenderer};
use crate::requirements::{CheckedRequirement, Outcome, RunResult};

const CONCLUSION_HEADER: &str = "Check conclusion:";

/// Renders a check result as plain text.
pub struct ConsoleRenderer {
    theme: ReportTheme,
}

impl ConsoleRenderer {
    /// Create a console renderer.
    pub fn new(use_color: bool) -> Self {
        let theme = if use_color {
            ReportTheme::new()
        } else {
            ReportTheme::plain()
        };
        Self { theme }
    }

    /// Create a renderer that never emits escape codes.
    pub fn plain() -> Self {
        Self::new(false)
    }

    fn render_requirement(
        &self,
        requirement: &CheckedRequirement,
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        let status = match requirement.outcome() {
            Outcome::Passed => self.theme.success.apply_to("OK"),
            Outcome::Failed => self.theme.error.apply_to("FAILED!!!"),
            Outcome::Warning => self.theme.warning.apply_to("WARNING!!!"),
        };
        writeln!(writer, "{}: {}", requirement.name, status)?;

        if !requirement.condition {
            writeln!(writer, "Required by: {}", strip_tags(&requirement.by))?;
        }
        let memo = strip_tags(&requirement.memo);
        if !memo.is_empty() {
            writeln!(writer, "{}", self.theme.dim.apply_to(memo))?;
        }
        writeln!(writer)
    }
}

impl ReportRenderer for ConsoleRenderer {
    fn render(&self, result: &RunResult, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", self.theme.header.apply_to("Requirements Checker"))?;
        writeln!(writer)?;
        writeln!(
            writer,
            "This report checks if the environment meets the requirements\n\
             declared by the application: tool versions, loaded extensions\n\
             and configuration settings."
        )?;

        writeln!(writer)?;
        writeln!(writer, "{}", self.theme.header.apply_to(CONCLUSION_HEADER))?;
        writeln!(writer, "{}", "-".repeat(CONCLUSION_HEADER.len()))?;
        writeln!(writer)?;

        for requirement in &result.requirements {
            self.render_requirement(requirement, writer)?;
        }

        let summary = format!(
            "Errors: {}   Warnings: {}   Total checks: {}",
            result.summary.errors, result.summary.warnings, result.summary.total
        );
        writeln!(writer, "{}", "-".repeat(summary.len()))?;
        writeln!(writer, "{}", summary)?;
        writeln!(writer)
    }
}
