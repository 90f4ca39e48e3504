//! Verbose byte-size parsing.
//!
//! Converts human-readable sizes such as `"5M"` or `"16KB"` into bytes
//! using binary multiples.
//!
//! # Example
//!
//! ```
//! use envaudit::requirements::size::parse_bytes;
//!
//! assert_eq!(parse_bytes("456"), 456);
//! assert_eq!(parse_bytes("5K"), 5 * 1024);
//! assert_eq!(parse_bytes("2mb"), 2 * 1024 * 1024);
//! assert_eq!(parse_bytes("12TB"), 0);
//! ```

use super::compare::Comparator;

const KIB: f64 = 1024.0;

/// Parse a verbose size into bytes.
///
/// Malformed input yields 0 rather than an error.
pub fn parse_bytes(verbose: &str) -> i64 {
    if verbose.is_empty() {
        return 0;
    }
    if let Some(n) = parse_numeric(verbose) {
        return truncate(n);
    }

    let unit = verbose.trim_matches(|c: char| c.is_ascii_digit());
    let size = verbose.replace(unit, "");
    let Some(size) = parse_numeric(size.trim()) else {
        return 0;
    };

    let multiplier = match unit.to_lowercase().as_str() {
        "k" | "kb" => KIB,
        "m" | "mb" => KIB * KIB,
        "g" | "gb" => KIB * KIB * KIB,
        _ => return 0,
    };
    truncate(size * multiplier)
}

/// Compare two verbose sizes.
pub fn compare_byte_size(a: &str, b: &str, comparator: Comparator) -> bool {
    comparator.compare(&parse_bytes(a), &parse_bytes(b))
}

/// Parse a plain decimal number: optional sign, digits, fraction and exponent.
///
/// Surrounding whitespace is allowed; words such as `inf` are not.
pub(crate) fn parse_numeric(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty()
        || !text.chars().any(|c| c.is_ascii_digit())
        || !text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    text.parse::<f64>().ok()
}

fn truncate(value: f64) -> i64 {
    // `as` saturates at the i64 bounds.
    value.trunc() as i64
}
