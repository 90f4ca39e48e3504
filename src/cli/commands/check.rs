//! Check command implementation.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Context;

use crate::cli::args::CheckArgs;
use crate::config::load_requirements;
use crate::environment::{EnvironmentReader, StaticEnvironment, SystemEnvironment};
use crate::error::Result;
use crate::report::theme::should_use_colors;
use crate::report::{ConsoleRenderer, HtmlRenderer, JsonRenderer, ReportFormat, ReportRenderer};
use crate::requirements::RequirementsChecker;

use super::dispatcher::{Command, CommandResult, EXIT_REQUIREMENTS_FAILED};

/// Set by web servers when running a program as a CGI script.
const CGI_MARKER: &str = "GATEWAY_INTERFACE";

/// The check command implementation.
pub struct CheckCommand {
    args: CheckArgs,
    no_color: bool,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(args: CheckArgs, no_color: bool) -> Self {
        Self { args, no_color }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &CheckArgs {
        &self.args
    }

    fn environment(&self) -> Result<Box<dyn EnvironmentReader>> {
        match &self.args.env {
            Some(path) => {
                tracing::debug!("Checking against snapshot {}", path.display());
                Ok(Box::new(StaticEnvironment::load(path)?))
            }
            None => {
                tracing::debug!("Checking against the live system");
                Ok(Box::new(SystemEnvironment::new()))
            }
        }
    }

    fn format(&self) -> ReportFormat {
        self.args
            .format
            .unwrap_or_else(|| ReportFormat::for_invocation(std::env::var_os(CGI_MARKER).is_none()))
    }

    fn renderer(&self, format: ReportFormat, server_info: String) -> Box<dyn ReportRenderer> {
        match format {
            ReportFormat::Text => {
                let use_color = !self.no_color && self.args.output.is_none() && should_use_colors();
                Box::new(ConsoleRenderer::new(use_color))
            }
            ReportFormat::Html => Box::new(HtmlRenderer::new(server_info)),
            ReportFormat::Json => Box::new(JsonRenderer::new()),
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let mut checker = RequirementsChecker::new(self.environment()?);
        for file in &self.args.files {
            checker.check(load_requirements(file)?)?;
        }

        let format = self.format();
        let renderer = self.renderer(format, checker.environment().server_info());
        match &self.args.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create report file {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                checker.render(renderer.as_ref(), &mut writer)?;
                writer.flush()?;
                tracing::info!("Report written to {}", path.display());
            }
            None => {
                checker.render(renderer.as_ref(), out)?;
                out.flush()?;
            }
        }

        let failed = checker.result().is_some_and(|result| result.has_errors());
        if failed {
            Ok(CommandResult::failure(EXIT_REQUIREMENTS_FAILED))
        } else {
            Ok(CommandResult::success())
        }
    }
}
