//! Requirement and environment files.
//!
//! - Requirement files in [`loader`]
//! - Environment snapshots are loaded by
//!   [`StaticEnvironment::load`](crate::environment::StaticEnvironment::load)
//!
//! # Example
//!
//! ```
//! use envaudit::config::load_requirements;
//! use envaudit::environment::StaticEnvironment;
//! use envaudit::requirements::RequirementsChecker;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("requirements.yml");
//! fs::write(&path, "pdo:\n  condition: \"eval:extension_loaded('pdo')\"\n  mandatory: true\n").unwrap();
//!
//! let env = StaticEnvironment::new().with_extension("pdo", "8.2.0");
//! let mut checker = RequirementsChecker::new(env);
//! checker.check(load_requirements(&path).unwrap()).unwrap();
//! assert_eq!(checker.result().unwrap().summary.errors, 0);
//! ```

pub mod loader;

pub use loader::{load_requirements, parse_requirements};
