//! Comparison operators shared by version and byte-size checks.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A binary comparison operator.
///
/// Parses from symbolic (`>=`), mnemonic (`ge`) and typographic (`≥`) forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparator {
    #[default]
    GreaterOrEqual,
    Greater,
    LessOrEqual,
    Less,
    Equal,
    NotEqual,
}

impl Comparator {
    /// Whether an ordering of `left` relative to `right` satisfies this operator.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            Comparator::GreaterOrEqual => ordering != Ordering::Less,
            Comparator::Greater => ordering == Ordering::Greater,
            Comparator::LessOrEqual => ordering != Ordering::Greater,
            Comparator::Less => ordering == Ordering::Less,
            Comparator::Equal => ordering == Ordering::Equal,
            Comparator::NotEqual => ordering != Ordering::Equal,
        }
    }

    /// Compare two ordered values.
    pub fn compare<T: Ord + ?Sized>(self, left: &T, right: &T) -> bool {
        self.matches(left.cmp(right))
    }

    /// Canonical symbol for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::GreaterOrEqual => ">=",
            Comparator::Greater => ">",
            Comparator::LessOrEqual => "<=",
            Comparator::Less => "<",
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error returned when a comparator string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownComparator(pub String);

impl fmt::Display for UnknownComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown comparison operator '{}'", self.0)
    }
}

impl std::error::Error for UnknownComparator {}

impl FromStr for Comparator {
    type Err = UnknownComparator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">=" | "ge" | "≥" => Ok(Comparator::GreaterOrEqual),
            ">" | "gt" => Ok(Comparator::Greater),
            "<=" | "le" | "≤" => Ok(Comparator::LessOrEqual),
            "<" | "lt" => Ok(Comparator::Less),
            "==" | "=" | "===" | "eq" => Ok(Comparator::Equal),
            "!=" | "!==" | "<>" | "ne" | "≠" => Ok(Comparator::NotEqual),
            other => Err(UnknownComparator(other.to_string())),
        }
    }
}
