//! The requirements checker.
//!
//! [`RequirementsChecker`] normalizes raw requirements, resolves their
//! conditions against an environment, classifies each outcome, and
//! accumulates everything into one [`RunResult`]. `check` may be called
//! several times; each call appends to the same result.
//!
//! # Example
//!
//! ```
//! use envaudit::environment::StaticEnvironment;
//! use envaudit::requirements::{Condition, RawRequirement, RequirementsChecker};
//!
//! let env = StaticEnvironment::new().with_extension("pdo", "7.4.3");
//! let mut checker = RequirementsChecker::new(env);
//!
//! checker
//!     .check(vec![
//!         RawRequirement::new(Condition::deferred(|p| p.extension_loaded("pdo")))
//!             .name("PDO extension")
//!             .mandatory(true),
//!     ])?
//!     .check(vec![RawRequirement::new(false).name("Optional cache")])?;
//!
//! let result = checker.result().unwrap();
//! assert_eq!(result.summary.total, 2);
//! assert_eq!(result.summary.errors, 0);
//! assert_eq!(result.summary.warnings, 1);
//! # Ok::<(), envaudit::AuditError>(())
//! ```

use std::io::Write;

use super::model::{
    CheckedRequirement, NormalizedRequirement, RawRequirement, RequirementKey, RequirementSet,
    RunResult, UNKNOWN_DEPENDENT,
};
use super::predicates::Predicates;
use crate::environment::EnvironmentReader;
use crate::error::{AuditError, Result};
use crate::report::ReportRenderer;

/// Checks requirement sets against an environment.
#[derive(Debug)]
pub struct RequirementsChecker<E> {
    env: E,
    result: Option<RunResult>,
}

impl<E: EnvironmentReader> RequirementsChecker<E> {
    /// Create a checker reading from the given environment.
    pub fn new(env: E) -> Self {
        Self { env, result: None }
    }

    /// The environment conditions are resolved against.
    pub fn environment(&self) -> &E {
        &self.env
    }

    /// Check a set of requirements, appending to the accumulated result.
    ///
    /// A set is all-or-nothing: if any requirement is malformed or its
    /// expression fails, nothing from the set is recorded.
    pub fn check(&mut self, requirements: impl Into<RequirementSet>) -> Result<&mut Self> {
        let requirements = requirements.into();
        let predicates = Predicates::new(&self.env);

        let mut checked = Vec::with_capacity(requirements.len());
        for (key, raw) in requirements {
            let requirement = normalize(raw, &key, &predicates)?.classify();
            tracing::debug!(
                "Requirement '{}': condition={} mandatory={}",
                requirement.name,
                requirement.condition,
                requirement.mandatory
            );
            checked.push(requirement);
        }

        let result = self.result.get_or_insert_with(RunResult::default);
        for requirement in checked {
            result.record(requirement);
        }
        tracing::debug!(
            "Checked {} requirement(s): {} error(s), {} warning(s)",
            result.summary.total,
            result.summary.errors,
            result.summary.warnings
        );
        Ok(self)
    }

    /// The accumulated result, or `None` before the first successful check.
    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    /// Consume the checker, returning the accumulated result.
    pub fn into_result(self) -> Option<RunResult> {
        self.result
    }

    /// Render the accumulated result.
    ///
    /// Fails with a usage error when nothing has been checked yet.
    pub fn render(&self, renderer: &dyn ReportRenderer, writer: &mut dyn Write) -> Result<()> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| AuditError::usage("Nothing to render!"))?;
        renderer.render(result, writer)?;
        Ok(())
    }
}

/// Apply defaults to a raw requirement and resolve its condition.
pub fn normalize(
    raw: RawRequirement,
    key: &RequirementKey,
    predicates: &Predicates<'_>,
) -> Result<NormalizedRequirement> {
    let Some(condition) = raw.condition else {
        return Err(AuditError::usage(format!(
            "Requirement \"{}\" has no condition!",
            key
        )));
    };
    let condition = condition.resolve(predicates)?;

    Ok(NormalizedRequirement {
        name: raw.name.unwrap_or_else(|| key.default_name()),
        condition,
        mandatory: raw.mandatory.or(raw.required).unwrap_or(false),
        by: raw.by.unwrap_or_else(|| UNKNOWN_DEPENDENT.to_string()),
        memo: raw.memo.unwrap_or_default(),
    })
}

impl CheckedRequirement {
    /// Check a single requirement without accumulating it.
    pub fn evaluate(
        raw: RawRequirement,
        key: &RequirementKey,
        env: &dyn EnvironmentReader,
    ) -> Result<Self> {
        Ok(normalize(raw, key, &Predicates::new(env))?.classify())
    }
}
