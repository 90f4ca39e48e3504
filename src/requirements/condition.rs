//! Requirement conditions.
//!
//! A condition is a literal boolean, a closure over the environment
//! predicates, or an `eval:` expression parsed by [`super::expr`].
//!
//! # Example
//!
//! ```
//! use envaudit::environment::StaticEnvironment;
//! use envaudit::requirements::{Comparator, Condition, Predicates};
//!
//! let env = StaticEnvironment::new().with_extension("pdo", "7.4.3");
//! let predicates = Predicates::new(&env);
//!
//! let closure = Condition::deferred(|p| {
//!     p.extension_version_satisfies("pdo", "7.0", Comparator::GreaterOrEqual)
//! });
//! let expression = Condition::from_text("eval:extension_loaded('pdo')").unwrap();
//!
//! assert!(closure.resolve(&predicates).unwrap());
//! assert!(expression.resolve(&predicates).unwrap());
//! assert!(Condition::from_text("yes").is_none());
//! ```

use std::fmt;

use super::expr::{self, EVAL_PREFIX};
use super::predicates::Predicates;
use crate::error::Result;

type DeferredFn = Box<dyn Fn(&Predicates<'_>) -> bool>;

/// How a requirement decides whether it is satisfied.
pub enum Condition {
    /// A value computed up front.
    Literal(bool),
    /// Computed at check time from the environment predicates.
    Deferred(DeferredFn),
    /// An expression in the closed `eval:` grammar, without the prefix.
    Expression(String),
}

impl Condition {
    /// Wrap a closure evaluated at check time.
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(&Predicates<'_>) -> bool + 'static,
    {
        Condition::Deferred(Box::new(f))
    }

    /// Wrap an expression (without the `eval:` prefix).
    pub fn expression(text: impl Into<String>) -> Self {
        Condition::Expression(text.into())
    }

    /// Interpret condition text. Only `eval:`-prefixed text is a condition;
    /// anything else returns `None`.
    pub fn from_text(text: &str) -> Option<Self> {
        text.strip_prefix(EVAL_PREFIX).map(Condition::expression)
    }

    /// Resolve to a boolean.
    ///
    /// Expression failures propagate as [`AuditError::Evaluation`](crate::AuditError::Evaluation).
    pub fn resolve(&self, predicates: &Predicates<'_>) -> Result<bool> {
        match self {
            Condition::Literal(value) => Ok(*value),
            Condition::Deferred(f) => Ok(f(predicates)),
            Condition::Expression(text) => expr::evaluate(text, predicates),
        }
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Literal(value)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Condition::Deferred(_) => f.write_str("Deferred(..)"),
            Condition::Expression(text) => f.debug_tuple("Expression").field(text).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::StaticEnvironment;
    use crate::error::AuditError;

    #[test]
    fn literal_resolves_to_itself() {
        let env = StaticEnvironment::new();
        let p = Predicates::new(&env);
        assert!(Condition::from(true).resolve(&p).unwrap());
        assert!(!Condition::from(false).resolve(&p).unwrap());
    }

    #[test]
    fn deferred_reads_predicates() {
        let env = StaticEnvironment::new().with_ini("display_errors", "Off");
        let p = Predicates::new(&env);
        let condition = Condition::deferred(|p| p.ini_off("display_errors"));
        assert!(condition.resolve(&p).unwrap());
    }

    #[test]
    fn from_text_requires_eval_prefix() {
        assert!(matches!(
            Condition::from_text("eval:2>1"),
            Some(Condition::Expression(ref text)) if text == "2>1"
        ));
        assert!(Condition::from_text("2>1").is_none());
        assert!(Condition::from_text("").is_none());
    }

    #[test]
    fn expression_resolves() {
        let env = StaticEnvironment::new();
        let p = Predicates::new(&env);
        assert!(Condition::expression("2>1").resolve(&p).unwrap());
        assert!(!Condition::expression("2<1").resolve(&p).unwrap());
    }

    #[test]
    fn malformed_expression_fails_loudly() {
        let env = StaticEnvironment::new();
        let p = Predicates::new(&env);
        let err = Condition::expression("2 >").resolve(&p).unwrap_err();
        assert!(matches!(err, AuditError::Evaluation { .. }));
    }

    #[test]
    fn debug_hides_closures() {
        let condition = Condition::deferred(|_| true);
        assert_eq!(format!("{:?}", condition), "Deferred(..)");
    }
}
