//! Command-line interface for envaudit.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Commands};
pub use commands::{CheckCommand, Command, CommandDispatcher, CommandResult};
