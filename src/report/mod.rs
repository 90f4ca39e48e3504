//! Report renderers.
//!
//! Renderers turn a [`RunResult`] into a human- or machine-readable
//! report. They only read the result; selecting one is up to the caller.
//!
//! - [`ConsoleRenderer`] - plain text for terminals
//! - [`HtmlRenderer`] - an HTML page for browsers
//! - [`JsonRenderer`] - the result as JSON, for tooling

pub mod console;
pub mod html;
pub mod json;
pub mod theme;

use std::io::{self, Write};

use crate::requirements::RunResult;

pub use console::ConsoleRenderer;
pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use theme::ReportTheme;

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Plain text for terminals
    Text,
    /// HTML page for browsers
    Html,
    /// Machine-readable JSON
    Json,
}

impl ReportFormat {
    /// Default format for an invocation: text when run with command-line
    /// arguments, HTML otherwise.
    pub fn for_invocation(has_cli_args: bool) -> Self {
        if has_cli_args {
            ReportFormat::Text
        } else {
            ReportFormat::Html
        }
    }
}

/// Trait for rendering a check result.
pub trait ReportRenderer {
    /// Render the result to the given writer.
    fn render(&self, result: &RunResult, writer: &mut dyn Write) -> io::Result<()>;
}

/// Remove markup tags from text shown in plain-text reports.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
