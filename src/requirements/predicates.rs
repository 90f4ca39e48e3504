//! Environment predicates that requirement conditions are built from.
//!
//! Every predicate answers `false` when the data it needs is absent; none of
//! them fail.
//!
//! # Example
//!
//! ```
//! use envaudit::environment::StaticEnvironment;
//! use envaudit::requirements::{Comparator, Predicates};
//!
//! let env = StaticEnvironment::new()
//!     .with_extension("intl", "PECL-3.0.0")
//!     .with_ini("post_max_size", "8M")
//!     .with_ini("upload_max_filesize", "2M");
//! let predicates = Predicates::new(&env);
//!
//! assert!(predicates.extension_version_satisfies("intl", "2.0", Comparator::GreaterOrEqual));
//! assert!(predicates.upload_max_file_size_in_range(Some("1M"), None));
//! assert!(!predicates.upload_max_file_size_in_range(Some("4M"), None));
//! ```

use super::compare::Comparator;
use super::size;
use super::version::version_satisfies;
use crate::environment::EnvironmentReader;

/// Configuration option holding the maximum request body size.
pub const POST_MAX_SIZE: &str = "post_max_size";

/// Configuration option holding the maximum uploaded file size.
pub const UPLOAD_MAX_FILESIZE: &str = "upload_max_filesize";

/// Packaging prefix stripped from reported extension versions.
const PACKAGING_PREFIX: &str = "PECL-";

/// Boolean checks over an [`EnvironmentReader`].
pub struct Predicates<'a> {
    env: &'a dyn EnvironmentReader,
}

impl<'a> Predicates<'a> {
    /// Create predicates reading from the given environment.
    pub fn new(env: &'a dyn EnvironmentReader) -> Self {
        Self { env }
    }

    /// The environment the predicates read from.
    pub fn environment(&self) -> &'a dyn EnvironmentReader {
        self.env
    }

    /// Whether the named extension is loaded.
    pub fn extension_loaded(&self, name: &str) -> bool {
        self.env.is_extension_loaded(name)
    }

    /// Whether the extension is loaded and its version relates to `required`
    /// as `comparator` demands.
    pub fn extension_version_satisfies(
        &self,
        name: &str,
        required: &str,
        comparator: Comparator,
    ) -> bool {
        if !self.env.is_extension_loaded(name) {
            tracing::debug!("Extension '{}' is not loaded", name);
            return false;
        }
        let Some(reported) = self.env.extension_version(name) else {
            return false;
        };
        if reported.is_empty() {
            return false;
        }
        let version = strip_packaging_prefix(&reported);
        let satisfied = version_satisfies(version, required, comparator);
        tracing::trace!(
            "Extension '{}' {} {} {}: {}",
            name,
            version,
            comparator,
            required,
            satisfied
        );
        satisfied
    }

    /// Raw configuration value, `None` when unset.
    pub fn ini_value(&self, name: &str) -> Option<String> {
        self.env.ini_value(name)
    }

    /// Whether a configuration option is on: `"1"` or `"on"` in any case,
    /// ignoring surrounding whitespace.
    pub fn ini_on(&self, name: &str) -> bool {
        match self.env.ini_value(name) {
            Some(value) => {
                let value = value.trim();
                value == "1" || value.eq_ignore_ascii_case("on")
            }
            None => false,
        }
    }

    /// Whether a configuration option is off: unset, blank or `"off"` in any
    /// case.
    ///
    /// This is not the negation of [`ini_on`](Self::ini_on): `"0"` is neither
    /// on nor off.
    pub fn ini_off(&self, name: &str) -> bool {
        match self.env.ini_value(name) {
            Some(value) => {
                let value = value.trim();
                value.is_empty() || value.eq_ignore_ascii_case("off")
            }
            None => true,
        }
    }

    /// Compare two verbose sizes.
    pub fn compare_byte_size(&self, a: &str, b: &str, comparator: Comparator) -> bool {
        size::compare_byte_size(a, b, comparator)
    }

    /// Whether both the request body limit and the upload file limit fall
    /// within the given verbose bounds. A `None` bound is not checked.
    pub fn upload_max_file_size_in_range(&self, min: Option<&str>, max: Option<&str>) -> bool {
        let post_max_size = self.env.ini_value(POST_MAX_SIZE).unwrap_or_default();
        let upload_max_filesize = self.env.ini_value(UPLOAD_MAX_FILESIZE).unwrap_or_default();
        let limits = [post_max_size.as_str(), upload_max_filesize.as_str()];

        let min_ok = min.is_none_or(|min| {
            limits
                .iter()
                .all(|limit| self.compare_byte_size(limit, min, Comparator::GreaterOrEqual))
        });
        let max_ok = max.is_none_or(|max| {
            limits
                .iter()
                .all(|limit| self.compare_byte_size(limit, max, Comparator::LessOrEqual))
        });
        min_ok && max_ok
    }
}

fn strip_packaging_prefix(version: &str) -> &str {
    match version.get(..PACKAGING_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(PACKAGING_PREFIX) => {
            &version[PACKAGING_PREFIX.len()..]
        }
        _ => version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::StaticEnvironment;

    #[test]
    fn missing_extension_fails_version_check() {
        let env = StaticEnvironment::new();
        let p = Predicates::new(&env);
        assert!(!p.extension_version_satisfies(
            "some_non_existing_extension",
            "0.1",
            Comparator::GreaterOrEqual
        ));
    }

    #[test]
    fn loaded_extension_passes_version_check() {
        let env = StaticEnvironment::new().with_extension("pdo", "7.4.3");
        let p = Predicates::new(&env);
        assert!(p.extension_version_satisfies("pdo", "1.0", Comparator::GreaterOrEqual));
        assert!(!p.extension_version_satisfies("pdo", "8.0", Comparator::GreaterOrEqual));
        assert!(p.extension_version_satisfies("pdo", "8.0", Comparator::Less));
    }

    #[test]
    fn empty_version_fails_version_check() {
        let env = StaticEnvironment::new().with_extension("json", "");
        let p = Predicates::new(&env);
        assert!(p.extension_loaded("json"));
        assert!(!p.extension_version_satisfies("json", "0.1", Comparator::GreaterOrEqual));
    }

    #[test]
    fn packaging_prefix_is_stripped() {
        let env = StaticEnvironment::new()
            .with_extension("intl", "PECL-3.0.0")
            .with_extension("apcu", "pecl-5.1.0");
        let p = Predicates::new(&env);
        assert!(p.extension_version_satisfies("intl", "3.0.0", Comparator::Equal));
        assert!(p.extension_version_satisfies("apcu", "5.1", Comparator::Greater));
    }

    #[test]
    fn strip_packaging_prefix_handles_short_and_multibyte_input() {
        assert_eq!(strip_packaging_prefix("1.0"), "1.0");
        assert_eq!(strip_packaging_prefix("PECL"), "PECL");
        assert_eq!(strip_packaging_prefix("ΠΕ-1.0"), "ΠΕ-1.0");
    }

    #[test]
    fn ini_on_accepts_one_and_on() {
        let env = StaticEnvironment::new()
            .with_ini("a", "1")
            .with_ini("b", "On")
            .with_ini("c", "ON")
            .with_ini("d", "0")
            .with_ini("e", "off")
            .with_ini("f", "");
        let p = Predicates::new(&env);
        assert!(p.ini_on("a"));
        assert!(p.ini_on("b"));
        assert!(p.ini_on("c"));
        assert!(!p.ini_on("d"));
        assert!(!p.ini_on("e"));
        assert!(!p.ini_on("f"));
        assert!(!p.ini_on("unset"));
    }

    #[test]
    fn ini_off_accepts_empty_missing_and_off() {
        let env = StaticEnvironment::new()
            .with_ini("a", "Off")
            .with_ini("b", "")
            .with_ini("c", "0")
            .with_ini("d", "on");
        let p = Predicates::new(&env);
        assert!(p.ini_off("a"));
        assert!(p.ini_off("b"));
        assert!(p.ini_off("unset"));
        assert!(!p.ini_off("d"));
        // "0" is neither on nor off.
        assert!(!p.ini_off("c"));
        assert!(!p.ini_on("c"));
    }

    #[test]
    fn ini_flags_ignore_surrounding_whitespace() {
        let env = StaticEnvironment::new()
            .with_ini("one", " 1 ")
            .with_ini("on", " on\n")
            .with_ini("off", "\tOff ")
            .with_ini("blank", "  ");
        let p = Predicates::new(&env);
        assert!(p.ini_on("one"));
        assert!(p.ini_on("on"));
        assert!(p.ini_off("off"));
        assert!(p.ini_off("blank"));
        assert!(!p.ini_on("blank"));
    }

    fn upload_env(post: &str, upload: &str) -> StaticEnvironment {
        StaticEnvironment::new()
            .with_ini(POST_MAX_SIZE, post)
            .with_ini(UPLOAD_MAX_FILESIZE, upload)
    }

    #[test]
    fn upload_range_without_bounds_passes() {
        let env = StaticEnvironment::new();
        let p = Predicates::new(&env);
        assert!(p.upload_max_file_size_in_range(None, None));
    }

    #[test]
    fn upload_range_min_applies_to_both_limits() {
        let env = upload_env("8M", "2M");
        let p = Predicates::new(&env);
        assert!(p.upload_max_file_size_in_range(Some("2M"), None));
        assert!(!p.upload_max_file_size_in_range(Some("5M"), None));
    }

    #[test]
    fn upload_range_max_applies_to_both_limits() {
        let env = upload_env("8M", "2M");
        let p = Predicates::new(&env);
        assert!(p.upload_max_file_size_in_range(None, Some("8M")));
        assert!(!p.upload_max_file_size_in_range(None, Some("4M")));
    }

    #[test]
    fn upload_range_both_bounds() {
        let env = upload_env("16M", "16M");
        let p = Predicates::new(&env);
        assert!(p.upload_max_file_size_in_range(Some("5M"), Some("32M")));
        assert!(!p.upload_max_file_size_in_range(Some("5M"), Some("10M")));
    }

    #[test]
    fn unset_limits_count_as_zero() {
        let env = StaticEnvironment::new();
        let p = Predicates::new(&env);
        assert!(!p.upload_max_file_size_in_range(Some("1K"), None));
        assert!(p.upload_max_file_size_in_range(None, Some("1K")));
    }
}
