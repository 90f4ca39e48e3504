//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::report::ReportFormat;

/// envaudit - Check an environment against declared requirements.
#[derive(Debug, Parser)]
#[command(name = "envaudit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check requirement files and render a report
    Check(CheckArgs),
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Requirement files (YAML), checked in order into one report
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Report format (defaults to text, or html when run as a CGI script)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Environment snapshot (YAML) to check instead of the live system
    #[arg(long, value_name = "FILE", env = "ENVAUDIT_ENV_FILE")]
    pub env: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
