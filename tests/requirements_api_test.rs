//! Integration tests for the public requirements API.

use envaudit::environment::StaticEnvironment;
use envaudit::requirements::{
    compare_byte_size, parse_bytes, Comparator, Condition, Predicates, RawRequirement,
    RequirementSet, RequirementsChecker,
};

fn requirement(name: &str, mandatory: bool, condition: impl Into<Condition>) -> RawRequirement {
    RawRequirement::new(condition)
        .name(name)
        .mandatory(mandatory)
        .by(name)
        .memo(name)
}

#[test]
fn check_classifies_keyed_requirements() {
    let set: RequirementSet = vec![
        ("requirementPass", requirement("Requirement 1", true, true)),
        ("requirementError", requirement("Requirement 2", true, false)),
        ("requirementWarning", requirement("Requirement 3", false, false)),
    ]
    .into_iter()
    .collect();

    let mut checker = RequirementsChecker::new(StaticEnvironment::new());
    let result = checker.check(set).unwrap().result().unwrap();

    assert_eq!(result.summary.total, 3, "Wrong summary total!");
    assert_eq!(result.summary.errors, 1, "Wrong summary errors!");
    assert_eq!(result.summary.warnings, 2, "Wrong summary warnings!");

    assert!(!result.requirements[0].error, "Passed requirement has an error!");
    assert!(!result.requirements[0].warning, "Passed requirement has a warning!");
    assert!(result.requirements[1].error, "Error requirement has no error!");
    assert!(!result.requirements[2].error, "Warning requirement has an error!");
    assert!(result.requirements[2].warning, "Warning requirement has no warning!");
}

#[test]
fn check_evaluates_eval_conditions() {
    let set: RequirementSet = vec![
        (
            "requirementPass",
            requirement("Requirement 1", true, Condition::from_text("eval:2>1").unwrap()),
        ),
        (
            "requirementError",
            requirement("Requirement 2", true, Condition::from_text("eval:2<1").unwrap()),
        ),
    ]
    .into_iter()
    .collect();

    let mut checker = RequirementsChecker::new(StaticEnvironment::new());
    let result = checker.check(set).unwrap().result().unwrap();

    assert!(!result.requirements[0].error);
    assert!(!result.requirements[0].warning);
    assert!(result.requirements[1].error);
}

#[test]
fn chained_checks_merge_in_order() {
    let mut checker = RequirementsChecker::new(StaticEnvironment::new());
    checker
        .check(vec![requirement("Requirement 1", true, true)])
        .unwrap()
        .check(vec![requirement("Requirement 2", true, true)])
        .unwrap();

    let result = checker.result().unwrap();
    assert_eq!(result.summary.total, 2, "Wrong total checks count!");
    assert_eq!(result.requirements[0].name, "Requirement 1");
    assert_eq!(result.requirements[1].name, "Requirement 2");
}

#[test]
fn extension_version_checks() {
    let env = StaticEnvironment::new().with_extension("pdo", "PECL-1.0.4");
    let predicates = Predicates::new(&env);

    assert!(
        !predicates.extension_version_satisfies(
            "some_non_existing_extension",
            "0.1",
            Comparator::GreaterOrEqual
        ),
        "No fail while checking non existing extension!"
    );
    assert!(predicates.extension_version_satisfies("pdo", "1.0", Comparator::GreaterOrEqual));
}

#[test]
fn byte_sizes() {
    let cases = [
        ("456", 456),
        ("5K", 5 * 1024),
        ("16KB", 16 * 1024),
        ("4M", 4 * 1024 * 1024),
        ("14MB", 14 * 1024 * 1024),
        ("7G", 7 * 1024 * 1024 * 1024),
        ("12GB", 12 * 1024 * 1024 * 1024),
    ];
    for (verbose, expected) in cases {
        assert_eq!(parse_bytes(verbose), expected, "Wrong byte size for {verbose:?}!");
    }
}

#[test]
fn byte_size_comparisons() {
    let cases = [
        ("2M", "2K", ">"),
        ("2M", "2K", ">="),
        ("1K", "1024", "=="),
        ("10M", "11M", "<"),
        ("10M", "11M", "<="),
    ];
    for (a, b, op) in cases {
        let comparator: Comparator = op.parse().unwrap();
        assert!(
            compare_byte_size(a, b, comparator),
            "Wrong compare \"{a}{op}{b}\""
        );
    }
}

#[test]
fn yaml_requirements_run_against_snapshot() {
    let env = StaticEnvironment::from_yaml_str(
        r#"
extensions:
  intl: 1.1.0
ini:
  post_max_size: 8M
  upload_max_filesize: 2M
  expose_php: Off
server: Apache/2.4
"#,
    )
    .unwrap();

    let set = RequirementSet::from_yaml_str(
        r#"
requirements:
  - name: Intl extension
    mandatory: true
    condition: "eval:extension_version('intl', '1.0.2', '>=')"
    by: Internationalization support
  - name: Uploads
    condition: "eval:upload_max_file_size('1M', '8M')"
  - name: Expose PHP
    condition: "eval:ini_off('expose_php')"
  - name: APC
    condition: "eval:extension_loaded('apcu')"
"#,
    )
    .unwrap();

    let mut checker = RequirementsChecker::new(env);
    let result = checker.check(set).unwrap().result().unwrap();

    assert_eq!(result.summary.total, 4);
    assert_eq!(result.summary.errors, 0);
    assert_eq!(result.summary.warnings, 1);
    assert_eq!(result.requirements[3].name, "APC");
    assert!(result.requirements[3].warning);
}
