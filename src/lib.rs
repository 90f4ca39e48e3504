//! envaudit - Check an environment against declared requirements.
//!
//! Requirements are named conditions with severity metadata: a failed
//! mandatory requirement is an error, a failed optional one is a warning.
//! Conditions are booleans, closures over environment predicates, or
//! `eval:` expressions in a small closed grammar. Results accumulate across
//! checks and are rendered as text, HTML or JSON.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Requirement file loading
//! - [`environment`] - Live and snapshot environment readers
//! - [`error`] - Error types and result aliases
//! - [`report`] - Text, HTML and JSON renderers
//! - [`requirements`] - Conditions, predicates and the checker
//!
//! # Example
//!
//! ```
//! use envaudit::environment::StaticEnvironment;
//! use envaudit::report::ConsoleRenderer;
//! use envaudit::requirements::{Comparator, Condition, RawRequirement, RequirementsChecker};
//!
//! let env = StaticEnvironment::new()
//!     .with_extension("intl", "1.1.0")
//!     .with_ini("memory_limit", "128M");
//!
//! let mut checker = RequirementsChecker::new(env);
//! checker.check(vec![
//!     RawRequirement::new(Condition::deferred(|p| {
//!         p.extension_version_satisfies("intl", "1.0.2", Comparator::GreaterOrEqual)
//!     }))
//!     .name("Intl extension")
//!     .mandatory(true),
//!     RawRequirement::new(Condition::from_text("eval:compare_byte_size(ini_get('memory_limit'), '64M')").unwrap())
//!         .name("Memory limit"),
//! ])?;
//!
//! let mut report = Vec::new();
//! checker.render(&ConsoleRenderer::plain(), &mut report)?;
//! let report = String::from_utf8(report).unwrap();
//! assert!(report.contains("Intl extension: OK"));
//! assert!(report.contains("Errors: 0   Warnings: 0   Total checks: 2"));
//! # Ok::<(), envaudit::AuditError>(())
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod report;
pub mod requirements;

pub use error::{AuditError, Result};
