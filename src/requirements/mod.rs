//! Requirement declaration, evaluation and accumulation.
//!
//! A requirement is a named condition with severity metadata. The
//! [`RequirementsChecker`] resolves conditions against an
//! [`EnvironmentReader`](crate::environment::EnvironmentReader) and
//! accumulates the outcomes into a [`RunResult`].
//!
//! # Modules
//!
//! - [`compare`] - Comparison operators shared by sizes and versions
//! - [`condition`] - Literal, closure and expression conditions
//! - [`engine`] - The checker and requirement normalization
//! - [`expr`] - The `eval:` expression grammar
//! - [`model`] - Raw, normalized and checked requirement records
//! - [`predicates`] - Environment predicates used by conditions
//! - [`size`] - Verbose byte size parsing
//! - [`version`] - Version string ordering

pub mod compare;
pub mod condition;
pub mod engine;
pub mod expr;
pub mod model;
pub mod predicates;
pub mod size;
pub mod version;

pub use compare::Comparator;
pub use condition::Condition;
pub use engine::{normalize, RequirementsChecker};
pub use model::{
    CheckedRequirement, NormalizedRequirement, Outcome, RawRequirement, RequirementKey,
    RequirementSet, RunResult, Summary,
};
pub use predicates::Predicates;
pub use size::{compare_byte_size, parse_bytes};
pub use version::{compare_versions, version_satisfies};
