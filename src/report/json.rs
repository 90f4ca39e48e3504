//! JSON report.

use std::io::{self, Write};

use super::ReportRenderer;
use crate::requirements::RunResult;

/// Renders a check result as pretty-printed JSON.
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, result: &RunResult, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, result)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::{CheckedRequirement, Summary};

    #[test]
    fn output_parses_back_into_result() {
        let result = RunResult {
            summary: Summary {
                total: 1,
                errors: 1,
                warnings: 0,
            },
            requirements: vec![CheckedRequirement {
                name: "Intl".into(),
                condition: false,
                mandatory: true,
                by: "Unknown".into(),
                memo: "<b>memo</b>".into(),
                error: true,
                warning: true,
            }],
        };
        let mut out = Vec::new();
        JsonRenderer::new().render(&result, &mut out).unwrap();

        let parsed: RunResult = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, result);
        assert!(out.ends_with(b"\n"));
    }
}
