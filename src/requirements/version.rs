//! Version string comparison.
//!
//! Versions are split into segments at `.`, `-`, `_` and `+`, and at every
//! boundary between digits and letters, so `1.0rc1` becomes
//! `1`, `0`, `rc`, `1`. Numeric segments compare as numbers. Word segments
//! are ranked:
//!
//! ```text
//! (unknown) < dev < alpha = a < beta = b < RC = rc < (number) < pl = p
//! ```
//!
//! When one version runs out of segments, the missing segment ranks like a
//! number, which makes `1.0` newer than `1.0rc1` but older than `1.0.1`.

use std::cmp::Ordering;

use super::compare::Comparator;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Number(&'a str),
    Word(&'a str),
}

/// Rank used when a numeric segment meets a word segment.
const NUMBER_RANK: u8 = 5;

fn word_rank(word: &str) -> u8 {
    if word.starts_with("dev") {
        1
    } else if word.starts_with("alpha") || word.starts_with('a') {
        2
    } else if word.starts_with("beta") || word.starts_with('b') {
        3
    } else if word.starts_with("RC") || word.starts_with("rc") {
        4
    } else if word == "#" {
        NUMBER_RANK
    } else if word.starts_with("pl") || word.starts_with('p') {
        6
    } else {
        0
    }
}

fn segments(version: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    for part in version.split(['.', '-', '_', '+']) {
        let mut start = 0;
        let mut digit_run: Option<bool> = None;
        for (i, c) in part.char_indices() {
            let is_digit = c.is_ascii_digit();
            if let Some(run) = digit_run {
                if run != is_digit {
                    out.push(make_segment(&part[start..i], run));
                    start = i;
                }
            }
            digit_run = Some(is_digit);
        }
        if let Some(run) = digit_run {
            out.push(make_segment(&part[start..], run));
        }
    }
    out
}

fn make_segment(text: &str, numeric: bool) -> Segment<'_> {
    if numeric {
        Segment::Number(text)
    } else {
        Segment::Word(text)
    }
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_segments(a: &Segment<'_>, b: &Segment<'_>) -> Ordering {
    match (a, b) {
        (Segment::Number(x), Segment::Number(y)) => compare_numbers(x, y),
        (Segment::Number(_), Segment::Word(w)) => NUMBER_RANK.cmp(&word_rank(w)),
        (Segment::Word(w), Segment::Number(_)) => word_rank(w).cmp(&NUMBER_RANK),
        (Segment::Word(x), Segment::Word(y)) => word_rank(x).cmp(&word_rank(y)),
    }
}

/// Order two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);
    let missing = Segment::Word("#");

    let len = left.len().max(right.len());
    for i in 0..len {
        let ordering = match (left.get(i), right.get(i)) {
            (Some(x), Some(y)) => compare_segments(x, y),
            (Some(Segment::Number(_)), None) => Ordering::Greater,
            (None, Some(Segment::Number(_))) => Ordering::Less,
            (Some(x), None) => compare_segments(x, &missing),
            (None, Some(y)) => compare_segments(&missing, y),
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Whether `actual` relates to `required` as the comparator demands.
pub fn version_satisfies(actual: &str, required: &str, comparator: Comparator) -> bool {
    comparator.matches(compare_versions(actual, required))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_segments_compare_as_numbers() {
        assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare_versions("2.0.0", "10.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.02", "1.2"), Ordering::Equal);
    }

    #[test]
    fn equal_versions() {
        assert_eq!(compare_versions("7.4.3", "7.4.3"), Ordering::Equal);
        assert_eq!(compare_versions("1-0", "1.0"), Ordering::Equal);
    }

    #[test]
    fn longer_numeric_version_is_newer() {
        assert_eq!(compare_versions("1.0.1", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn prerelease_ranks() {
        assert_eq!(compare_versions("1.0dev", "1.0alpha"), Ordering::Less);
        assert_eq!(compare_versions("1.0a1", "1.0b1"), Ordering::Less);
        assert_eq!(compare_versions("1.0beta", "1.0RC1"), Ordering::Less);
        assert_eq!(compare_versions("1.0rc1", "1.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0", "1.0pl1"), Ordering::Less);
        assert_eq!(compare_versions("1.0-rc2", "1.0-rc10"), Ordering::Less);
    }

    #[test]
    fn unknown_words_rank_lowest() {
        assert_eq!(compare_versions("1.0-foo", "1.0-dev"), Ordering::Less);
    }

    #[test]
    fn digit_letter_boundaries_split() {
        assert_eq!(compare_versions("5.2.1RC2", "5.2.1"), Ordering::Less);
        assert_eq!(compare_versions("5.2.1RC2", "5.2.1RC1"), Ordering::Greater);
    }

    #[test]
    fn satisfies_with_comparators() {
        assert!(version_satisfies("7.4.3", "7.0", Comparator::GreaterOrEqual));
        assert!(!version_satisfies("5.6", "7.0", Comparator::GreaterOrEqual));
        assert!(version_satisfies("1.0", "1.0", Comparator::Equal));
        assert!(version_satisfies("2.0", "1.0", Comparator::NotEqual));
        assert!(version_satisfies("0.9", "1.0", Comparator::Less));
    }
}
