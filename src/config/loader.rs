//! Requirement file loading.
//!
//! Requirement files are YAML documents holding either a sequence of
//! requirement records (keyed by position) or a mapping of named records.
//! The collection may also sit under a top-level `requirements:` key.
//!
//! ```yaml
//! requirements:
//!   pdo:
//!     name: PDO extension
//!     mandatory: true
//!     condition: "eval:extension_loaded('pdo')"
//!     by: All database related classes
//!   memory:
//!     condition: "eval:compare_byte_size(ini_get('memory_limit'), '64M')"
//!     memo: Raise memory_limit for large imports
//! ```

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{AuditError, Result};
use crate::requirements::{Condition, RawRequirement, RequirementKey, RequirementSet};

const WRAPPER_KEY: &str = "requirements";

/// Load a requirement set from a YAML file.
pub fn load_requirements(path: &Path) -> Result<RequirementSet> {
    let content = fs::read_to_string(path)?;
    let document: Value =
        serde_yaml::from_str(&content).map_err(|e| AuditError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let set = parse_requirements(document)?;
    tracing::debug!(
        "Loaded {} requirement(s) from {}",
        set.len(),
        path.display()
    );
    Ok(set)
}

impl RequirementSet {
    /// Parse a requirement set from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(content)
            .map_err(|e| AuditError::usage(format!("Invalid requirements YAML: {}", e)))?;
        parse_requirements(document)
    }
}

/// Build a requirement set from a parsed YAML document.
pub fn parse_requirements(document: Value) -> Result<RequirementSet> {
    let collection = unwrap_wrapper(document);

    let mut set = RequirementSet::new();
    match collection {
        Value::Sequence(entries) => {
            for (index, entry) in entries.into_iter().enumerate() {
                let key = RequirementKey::Index(index);
                let requirement = parse_requirement(entry, &key)?;
                set.insert(key, requirement);
            }
        }
        Value::Mapping(entries) => {
            for (key, entry) in entries {
                let key = mapping_key(&key)?;
                let requirement = parse_requirement(entry, &key)?;
                set.insert(key, requirement);
            }
        }
        other => {
            return Err(AuditError::usage(format!(
                "Requirements must be a list or a mapping, \"{}\" has been given!",
                type_name(&other)
            )))
        }
    }
    Ok(set)
}

/// Unwrap a `requirements:` document. A mapping whose only key is
/// `requirements` holding a record (it has a `condition`) is a single
/// requirement named "requirements" and is left alone.
fn unwrap_wrapper(document: Value) -> Value {
    let mut mapping = match document {
        Value::Mapping(mapping) => mapping,
        other => return other,
    };
    if mapping.len() == 1 {
        let wraps = match mapping.get(WRAPPER_KEY) {
            Some(Value::Sequence(_)) => true,
            Some(Value::Mapping(inner)) => !inner.contains_key("condition"),
            _ => false,
        };
        if wraps {
            if let Some(inner) = mapping.remove(WRAPPER_KEY) {
                return inner;
            }
        }
    }
    Value::Mapping(mapping)
}

fn mapping_key(key: &Value) -> Result<RequirementKey> {
    match key {
        Value::String(s) => Ok(RequirementKey::from_mapping_key(s)),
        Value::Number(n) => Ok(RequirementKey::from_mapping_key(&n.to_string())),
        other => Err(AuditError::usage(format!(
            "Requirement keys must be strings or integers, \"{}\" has been given!",
            type_name(other)
        ))),
    }
}

fn parse_requirement(entry: Value, key: &RequirementKey) -> Result<RawRequirement> {
    let record = match entry {
        Value::Mapping(record) => record,
        other => {
            return Err(AuditError::usage(format!(
                "Requirement must be a mapping, \"{}\" has been given!",
                type_name(&other)
            )))
        }
    };

    Ok(RawRequirement {
        name: text_field(&record, "name", key)?,
        condition: condition_field(&record, key)?,
        mandatory: flag_field(&record, "mandatory", key)?,
        required: flag_field(&record, "required", key)?,
        by: text_field(&record, "by", key)?,
        memo: text_field(&record, "memo", key)?,
    })
}

fn condition_field(record: &Mapping, key: &RequirementKey) -> Result<Option<Condition>> {
    match record.get("condition") {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(Condition::Literal(false))),
        Some(Value::Bool(value)) => Ok(Some(Condition::Literal(*value))),
        Some(Value::String(text)) => Condition::from_text(text).map(Some).ok_or_else(|| {
            AuditError::usage(format!(
                "Requirement \"{}\" has a string condition without the \"eval:\" prefix: \"{}\"",
                key, text
            ))
        }),
        Some(other) => Err(AuditError::usage(format!(
            "Requirement \"{}\" condition must be a boolean or an \"eval:\" expression, \"{}\" has been given!",
            key,
            type_name(other)
        ))),
    }
}

fn flag_field(record: &Mapping, field: &str, key: &RequirementKey) -> Result<Option<bool>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(other) => Err(AuditError::usage(format!(
            "Requirement \"{}\" field \"{}\" must be a boolean, \"{}\" has been given!",
            key,
            field,
            type_name(other)
        ))),
    }
}

fn text_field(record: &Mapping, field: &str, key: &RequirementKey) -> Result<Option<String>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(AuditError::usage(format!(
            "Requirement \"{}\" field \"{}\" must be text, \"{}\" has been given!",
            key,
            field,
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::StaticEnvironment;
    use crate::requirements::RequirementsChecker;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn keys(set: &RequirementSet) -> Vec<String> {
        set.iter().map(|(k, _)| k.to_string()).collect()
    }

    #[test]
    fn sequence_entries_are_indexed() {
        let set = RequirementSet::from_yaml_str(
            r#"
- name: First
  condition: true
- condition: "eval:2>1"
"#,
        )
        .unwrap();
        assert_eq!(keys(&set), vec!["0", "1"]);
    }

    #[test]
    fn mapping_entries_keep_names_and_order() {
        let set = RequirementSet::from_yaml_str(
            r#"
zlib:
  condition: true
apcu:
  condition: false
3:
  condition: true
"#,
        )
        .unwrap();
        let collected: Vec<_> = set.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            collected,
            vec![
                RequirementKey::Name("zlib".into()),
                RequirementKey::Name("apcu".into()),
                RequirementKey::Index(3),
            ]
        );
    }

    #[test]
    fn wrapper_key_is_unwrapped() {
        let set = RequirementSet::from_yaml_str(
            r#"
requirements:
  - condition: true
  - condition: false
"#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn requirement_named_requirements_is_kept() {
        let set = RequirementSet::from_yaml_str(
            r#"
requirements:
  condition: true
"#,
        )
        .unwrap();
        assert_eq!(keys(&set), vec!["requirements"]);
    }

    #[test]
    fn fields_are_parsed() {
        let set = RequirementSet::from_yaml_str(
            r#"
- name: Intl
  condition: false
  required: true
  by: "<a href='https://example.com'>Formatter</a>"
  memo: Install intl
"#,
        )
        .unwrap();
        let (_, requirement) = set.iter().next().unwrap();
        assert_eq!(requirement.name.as_deref(), Some("Intl"));
        assert_eq!(requirement.required, Some(true));
        assert_eq!(requirement.mandatory, None);
        assert_eq!(requirement.memo.as_deref(), Some("Install intl"));
        assert!(matches!(requirement.condition, Some(Condition::Literal(false))));
    }

    #[test]
    fn scalar_document_is_usage_error() {
        let err = RequirementSet::from_yaml_str("just text").unwrap_err();
        assert!(err.is_usage());
        assert_eq!(
            err.to_string(),
            "Requirements must be a list or a mapping, \"string\" has been given!"
        );
    }

    #[test]
    fn scalar_entry_is_usage_error() {
        let err = RequirementSet::from_yaml_str("- 42").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Requirement must be a mapping, \"integer\" has been given!"
        );
    }

    #[test]
    fn unmarked_string_condition_is_usage_error() {
        let err = RequirementSet::from_yaml_str("php:\n  condition: \"2 > 1\"").unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("\"php\""));
        assert!(err.to_string().contains("eval:"));
    }

    #[test]
    fn non_boolean_mandatory_is_usage_error() {
        let err = RequirementSet::from_yaml_str("- condition: true\n  mandatory: yes please")
            .unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("\"mandatory\""));
    }

    #[test]
    fn missing_condition_is_left_to_checker() {
        let set = RequirementSet::from_yaml_str("- name: Nothing").unwrap();
        let mut checker = RequirementsChecker::new(StaticEnvironment::new());
        let err = checker.check(set).unwrap_err();
        assert_eq!(err.to_string(), "Requirement \"0\" has no condition!");
    }

    #[test]
    fn null_condition_is_false() {
        let set = RequirementSet::from_yaml_str("- condition: ~").unwrap();
        let (_, requirement) = set.iter().next().unwrap();
        assert!(matches!(requirement.condition, Some(Condition::Literal(false))));
    }

    #[test]
    fn load_requirements_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "- condition: \"eval:compare_byte_size('2M', '2K', '>')\"").unwrap();

        let set = load_requirements(file.path()).unwrap();
        let mut checker = RequirementsChecker::new(StaticEnvironment::new());
        checker.check(set).unwrap();
        let result = checker.result().unwrap();
        assert_eq!(result.summary.total, 1);
        assert!(!result.requirements[0].warning);
    }

    #[test]
    fn load_requirements_reports_path_on_syntax_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "- condition: [unclosed").unwrap();

        let err = load_requirements(file.path()).unwrap_err();
        assert!(matches!(err, AuditError::ConfigParse { .. }));
        assert!(err
            .to_string()
            .contains(&file.path().display().to_string()));
    }

    #[test]
    fn load_requirements_missing_file_is_io_error() {
        let err = load_requirements(Path::new("/nonexistent/requirements.yml")).unwrap_err();
        assert!(matches!(err, AuditError::Io(_)));
    }
}
