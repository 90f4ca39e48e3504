//! Requirement records at each stage of a check.
//!
//! A [`RawRequirement`] is what callers supply. It is normalized into a
//! [`NormalizedRequirement`], classified into a [`CheckedRequirement`], and
//! accumulated into a [`RunResult`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::size::parse_numeric;

/// Default `by` value for requirements that do not name their dependent.
pub const UNKNOWN_DEPENDENT: &str = "Unknown";

/// Position of a requirement in the collection it was submitted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequirementKey {
    /// Position in a list (0-based), or a plain integer mapping key.
    Index(usize),
    /// A numeric mapping key kept as written, such as `007` or `-1`.
    Numeric(String),
    /// A named mapping key.
    Name(String),
}

impl RequirementKey {
    /// Build a key from a mapping key.
    ///
    /// Canonical integers become indexes. Other numeric text keeps its
    /// spelling so `007` is still `007` in the default name.
    pub fn from_mapping_key(key: &str) -> Self {
        match key.parse::<usize>() {
            Ok(index) if index.to_string() == key => RequirementKey::Index(index),
            _ if parse_numeric(key).is_some() => RequirementKey::Numeric(key.to_string()),
            _ => RequirementKey::Name(key.to_string()),
        }
    }

    /// Name used when a requirement does not carry one.
    pub fn default_name(&self) -> String {
        match self {
            RequirementKey::Index(index) => format!("Requirement #{}", index),
            RequirementKey::Numeric(key) => format!("Requirement #{}", key),
            RequirementKey::Name(name) => name.clone(),
        }
    }
}

impl fmt::Display for RequirementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementKey::Index(index) => write!(f, "{}", index),
            RequirementKey::Numeric(key) | RequirementKey::Name(key) => f.write_str(key),
        }
    }
}

/// A requirement as supplied by the caller.
///
/// Only `condition` is needed; everything else has a default.
///
/// # Example
///
/// ```
/// use envaudit::requirements::RawRequirement;
///
/// let requirement = RawRequirement::new(true)
///     .name("Intl extension")
///     .mandatory(true)
///     .by("Date formatting")
///     .memo("Install php-intl");
/// assert!(requirement.condition.is_some());
/// ```
#[derive(Debug, Default)]
pub struct RawRequirement {
    pub name: Option<String>,
    pub condition: Option<Condition>,
    pub mandatory: Option<bool>,
    /// Legacy spelling of `mandatory`, used only when `mandatory` is absent.
    pub required: Option<bool>,
    pub by: Option<String>,
    pub memo: Option<String>,
}

impl RawRequirement {
    /// Create a requirement with the given condition.
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self {
            condition: Some(condition.into()),
            ..Self::default()
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set whether a failure is an error rather than a warning.
    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = Some(mandatory);
        self
    }

    /// Set the legacy `required` flag.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Set what depends on this requirement.
    pub fn by(mut self, by: impl Into<String>) -> Self {
        self.by = Some(by.into());
        self
    }

    /// Set the explanatory note.
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// An ordered collection of keyed raw requirements.
#[derive(Debug, Default)]
pub struct RequirementSet {
    entries: Vec<(RequirementKey, RawRequirement)>,
}

impl RequirementSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a requirement under an explicit key.
    pub fn insert(&mut self, key: RequirementKey, requirement: RawRequirement) {
        self.entries.push((key, requirement));
    }

    /// Append a requirement keyed by its position.
    pub fn push(&mut self, requirement: RawRequirement) {
        let index = self.entries.len();
        self.entries.push((RequirementKey::Index(index), requirement));
    }

    /// Number of requirements in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys and requirements in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &(RequirementKey, RawRequirement)> {
        self.entries.iter()
    }
}

impl IntoIterator for RequirementSet {
    type Item = (RequirementKey, RawRequirement);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<Vec<RawRequirement>> for RequirementSet {
    fn from(requirements: Vec<RawRequirement>) -> Self {
        requirements.into_iter().collect()
    }
}

impl FromIterator<RawRequirement> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = RawRequirement>>(iter: I) -> Self {
        let mut set = Self::new();
        for requirement in iter {
            set.push(requirement);
        }
        set
    }
}

impl<K: Into<String>> FromIterator<(K, RawRequirement)> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = (K, RawRequirement)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, requirement) in iter {
            set.insert(RequirementKey::from_mapping_key(&key.into()), requirement);
        }
        set
    }
}

/// A requirement with every default applied and its condition resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequirement {
    pub name: String,
    pub condition: bool,
    pub mandatory: bool,
    pub by: String,
    pub memo: String,
}

impl NormalizedRequirement {
    /// Classify the outcome of this requirement.
    pub fn classify(self) -> CheckedRequirement {
        let (error, warning) = match (self.condition, self.mandatory) {
            (true, _) => (false, false),
            (false, true) => (true, true),
            (false, false) => (false, true),
        };
        CheckedRequirement {
            name: self.name,
            condition: self.condition,
            mandatory: self.mandatory,
            by: self.by,
            memo: self.memo,
            error,
            warning,
        }
    }
}

/// Outcome of a checked requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Warning,
    Failed,
}

/// A requirement after its condition was evaluated and classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedRequirement {
    pub name: String,
    pub condition: bool,
    pub mandatory: bool,
    pub by: String,
    pub memo: String,
    pub error: bool,
    pub warning: bool,
}

impl CheckedRequirement {
    /// Outcome derived from the error and warning flags.
    pub fn outcome(&self) -> Outcome {
        if self.error {
            Outcome::Failed
        } else if self.warning {
            Outcome::Warning
        } else {
            Outcome::Passed
        }
    }
}

/// Counts over every checked requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Accumulated results of one or more checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub summary: Summary,
    pub requirements: Vec<CheckedRequirement>,
}

impl RunResult {
    /// Append a checked requirement and update the summary.
    ///
    /// Every failed requirement counts as a warning. A failed mandatory one
    /// also counts as an error.
    pub(crate) fn record(&mut self, requirement: CheckedRequirement) {
        self.summary.total += 1;
        if requirement.error {
            self.summary.errors += 1;
        }
        if requirement.warning {
            self.summary.warnings += 1;
        }
        self.requirements.push(requirement);
    }

    /// Whether any mandatory requirement failed.
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Whether any requirement failed.
    pub fn has_warnings(&self) -> bool {
        self.summary.warnings > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(condition: bool, mandatory: bool) -> NormalizedRequirement {
        NormalizedRequirement {
            name: "req".into(),
            condition,
            mandatory,
            by: UNKNOWN_DEPENDENT.into(),
            memo: String::new(),
        }
    }

    #[test]
    fn passed_requirement_has_no_flags() {
        for mandatory in [true, false] {
            let checked = normalized(true, mandatory).classify();
            assert!(!checked.error);
            assert!(!checked.warning);
            assert_eq!(checked.outcome(), Outcome::Passed);
        }
    }

    #[test]
    fn failed_mandatory_requirement_is_error_and_warning() {
        let checked = normalized(false, true).classify();
        assert!(checked.error);
        assert!(checked.warning);
        assert_eq!(checked.outcome(), Outcome::Failed);
    }

    #[test]
    fn failed_optional_requirement_is_warning() {
        let checked = normalized(false, false).classify();
        assert!(!checked.error);
        assert!(checked.warning);
        assert_eq!(checked.outcome(), Outcome::Warning);
    }

    #[test]
    fn record_updates_summary() {
        let mut result = RunResult::default();
        result.record(normalized(true, true).classify());
        result.record(normalized(false, true).classify());
        result.record(normalized(false, false).classify());
        assert_eq!(
            result.summary,
            Summary {
                total: 3,
                errors: 1,
                warnings: 2
            }
        );
        assert!(result.has_errors());
        assert!(result.has_warnings());
    }

    #[test]
    fn summary_counts_match_requirement_flags() {
        let mut result = RunResult::default();
        let batch = [(false, true), (true, false), (false, false), (false, true)];
        for (condition, mandatory) in batch {
            result.record(normalized(condition, mandatory).classify());
        }

        let warnings = result.requirements.iter().filter(|r| r.warning).count();
        let errors = result.requirements.iter().filter(|r| r.error).count();
        assert_eq!(result.summary.warnings, warnings);
        assert_eq!(result.summary.errors, errors);
        assert_eq!(result.summary.total, result.requirements.len());
        assert_eq!(result.summary.warnings, 3);
    }

    #[test]
    fn key_default_names() {
        assert_eq!(RequirementKey::Index(3).default_name(), "Requirement #3");
        assert_eq!(RequirementKey::Name("pdo".into()).default_name(), "pdo");
    }

    #[test]
    fn numeric_mapping_keys_become_indexes() {
        assert_eq!(
            RequirementKey::from_mapping_key("7"),
            RequirementKey::Index(7)
        );
        assert_eq!(
            RequirementKey::from_mapping_key("0"),
            RequirementKey::Index(0)
        );
        assert_eq!(
            RequirementKey::from_mapping_key("php"),
            RequirementKey::Name("php".into())
        );
    }

    #[test]
    fn numeric_mapping_keys_keep_their_spelling() {
        let padded = RequirementKey::from_mapping_key("007");
        assert_eq!(padded, RequirementKey::Numeric("007".into()));
        assert_eq!(padded.default_name(), "Requirement #007");

        let negative = RequirementKey::from_mapping_key("-1");
        assert_eq!(negative.default_name(), "Requirement #-1");
        assert_eq!(negative.to_string(), "-1");

        assert_eq!(
            RequirementKey::from_mapping_key(" 3").default_name(),
            "Requirement # 3"
        );
        assert_eq!(
            RequirementKey::from_mapping_key("1.5"),
            RequirementKey::Numeric("1.5".into())
        );
    }

    #[test]
    fn sets_keep_order_and_keys() {
        let set: RequirementSet =
            vec![RawRequirement::new(true), RawRequirement::new(false)].into();
        let keys: Vec<_> = set.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![RequirementKey::Index(0), RequirementKey::Index(1)]);

        let named: RequirementSet = vec![
            ("a", RawRequirement::new(true)),
            ("b", RawRequirement::new(true)),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = named.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn run_result_serializes_summary_and_requirements() {
        let mut result = RunResult::default();
        result.record(normalized(false, false).classify());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["summary"]["total"], 1);
        assert_eq!(json["summary"]["warnings"], 1);
        assert_eq!(json["requirements"][0]["warning"], true);
        assert_eq!(json["requirements"][0]["by"], "Unknown");
    }
}
