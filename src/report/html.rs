//! HTML report for browsers.

use std::io::{self, Write};

use chrono::{DateTime, Local};

use super::ReportRenderer;
use crate::requirements::{Outcome, RunResult};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STYLESHEET: &str = "\
body { font-family: sans-serif; color: #333; margin: 0; }
.container { max-width: 960px; margin: 0 auto; padding: 0 15px; }
.text-center { text-align: center; }
.alert { padding: 15px; margin-bottom: 20px; border: 1px solid transparent; border-radius: 4px; }
.alert-success { color: #3c763d; background-color: #dff0d8; border-color: #d6e9c6; }
.alert-info { color: #31708f; background-color: #d9edf7; border-color: #bce8f1; }
.alert-danger { color: #a94442; background-color: #f2dede; border-color: #ebccd1; }
.table { width: 100%; border-collapse: collapse; margin-bottom: 20px; }
.table-bordered th, .table-bordered td { border: 1px solid #ddd; padding: 8px; }
tr.success td { background-color: #dff0d8; }
tr.warning td { background-color: #fcf8e3; }
tr.danger td { background-color: #f2dede; }
";

/// Renders a check result as a standalone HTML page.
pub struct HtmlRenderer {
    server_info: String,
    generated_at: DateTime<Local>,
}

impl HtmlRenderer {
    /// Create a renderer stamped with the current local time.
    pub fn new(server_info: impl Into<String>) -> Self {
        Self::with_timestamp(server_info, Local::now())
    }

    /// Create a renderer with an explicit generation time.
    pub fn with_timestamp(server_info: impl Into<String>, generated_at: DateTime<Local>) -> Self {
        Self {
            server_info: server_info.into(),
            generated_at,
        }
    }

    fn conclusion(result: &RunResult) -> (&'static str, &'static str) {
        if result.has_errors() {
            (
                "alert-danger",
                "Unfortunately your environment does not satisfy the requirements of this application.<br>\
                 Please refer to the table below for a detailed explanation.",
            )
        } else if result.has_warnings() {
            (
                "alert-info",
                "Your environment satisfies the minimum requirements of this application.<br>\
                 Please pay attention to the warnings listed below and check if your application \
                 will use the corresponding features.",
            )
        } else {
            (
                "alert-success",
                "Congratulations! Your environment satisfies all requirements.",
            )
        }
    }
}

impl ReportRenderer for HtmlRenderer {
    fn render(&self, result: &RunResult, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "<!DOCTYPE html>")?;
        writeln!(writer, "<html lang=\"en\">")?;
        writeln!(writer, "<head>")?;
        writeln!(writer, "    <meta charset=\"utf-8\" />")?;
        writeln!(writer, "    <title>Requirements Checker</title>")?;
        writeln!(writer, "    <style>\n{}    </style>", STYLESHEET)?;
        writeln!(writer, "</head>")?;
        writeln!(writer, "<body>")?;
        writeln!(writer, "<div class=\"container\">")?;
        writeln!(writer, "    <header class=\"text-center\"><h1>Application Requirements Checker</h1></header>")?;
        writeln!(writer, "    <hr>")?;
        writeln!(writer, "    <main>")?;
        writeln!(writer, "        <h3>Description</h3>")?;
        writeln!(
            writer,
            "        <p>This report checks if the environment meets the requirements declared by \
             the application: tool versions, loaded extensions and configuration settings.</p>"
        )?;
        writeln!(
            writer,
            "        <p>Mandatory requirements have to be met for the application to work as \
             expected. Optional requirements show a warning when they are not met; the \
             application still runs, but some functionality may be unavailable.</p>"
        )?;

        let (alert, message) = Self::conclusion(result);
        writeln!(writer, "        <h3>Conclusion</h3>")?;
        writeln!(
            writer,
            "        <div class=\"alert {}\"><strong>{}</strong></div>",
            alert, message
        )?;

        writeln!(writer, "        <h3>Details</h3>")?;
        writeln!(writer, "        <table class=\"table table-bordered\">")?;
        writeln!(
            writer,
            "            <tr><th>Name</th><th class=\"text-center\">Result</th><th>Required By</th><th>Note</th></tr>"
        )?;
        for requirement in &result.requirements {
            let (class, label) = match requirement.outcome() {
                Outcome::Passed => ("success", "Passed"),
                Outcome::Failed => ("danger", "Failed"),
                Outcome::Warning => ("warning", "Warning"),
            };
            writeln!(
                writer,
                "            <tr class=\"{}\"><td>{}</td><td class=\"text-center\"><span class=\"result\">{}</span></td><td>{}</td><td>{}</td></tr>",
                class,
                escape(&requirement.name),
                label,
                escape(&requirement.by),
                escape(&requirement.memo)
            )?;
        }
        writeln!(writer, "        </table>")?;
        writeln!(writer, "    </main>")?;
        writeln!(writer, "    <hr>")?;
        writeln!(
            writer,
            "    <footer><p>Server: {} {}</p></footer>",
            escape(&self.server_info),
            self.generated_at.format(DATE_FORMAT)
        )?;
        writeln!(writer, "</div>")?;
        writeln!(writer, "</body>")?;
        writeln!(writer, "</html>")
    }
}

/// Escape text for inclusion in HTML element content or attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
