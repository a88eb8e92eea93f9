//! Schema description for circle.yml
//!
//! The schema is a fixed table of [`SectionRule`]s, one per top-level
//! section. Each rule carries a [`Shape`] that the validator walks
//! recursively against the parsed document.

mod circle;

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::ValidationError;
use crate::validation::{DocPath, check_shape};

pub use circle::{REQUIRED_FILENAME, SECTIONS};

/// Required shape of a value in the document.
#[derive(Debug)]
pub enum Shape {
    /// No constraint
    Any,
    List,
    Str,
    StrOrList,
    /// Any mapping, contents unchecked
    Mapping,
    /// Mapping whose single key is `version`, holding a truthy value
    Versioned,
    /// List of mappings that each carry a truthy value under the given key
    ListOfTruthy(&'static str),
    Record(Record),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Checked whenever the key exists
    Optional,
    /// Missing key is a violation
    Required,
    /// Checked only when the value is truthy; falsy values count as absent
    WhenTruthy,
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub presence: Presence,
}

impl Field {
    pub const fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            presence: Presence::Optional,
        }
    }

    pub const fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            presence: Presence::Required,
        }
    }

    pub const fn when_truthy(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            presence: Presence::WhenTruthy,
        }
    }
}

/// A mapping restricted to a fixed allow-list of keys.
///
/// When `others` is set, keys outside `fields` are accepted too and each is
/// checked against that shape instead.
#[derive(Debug)]
pub struct Record {
    pub fields: &'static [Field],
    pub others: Option<&'static Shape>,
}

impl Record {
    pub const fn closed(fields: &'static [Field]) -> Self {
        Self {
            fields,
            others: None,
        }
    }

    pub const fn open(others: &'static Shape) -> Self {
        Self {
            fields: &[],
            others: Some(others),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn allows(&self, name: &str) -> bool {
        self.others.is_some() || self.field(name).is_some()
    }
}

impl Shape {
    /// Short description of the shape, as shown by `circlecheck sections`
    pub fn describe(&self) -> String {
        match self {
            Shape::Any => "any value".to_string(),
            Shape::List => "list".to_string(),
            Shape::Str => "string".to_string(),
            Shape::StrOrList => "string or list".to_string(),
            Shape::Mapping => "mapping".to_string(),
            Shape::Versioned => "mapping with only 'version'".to_string(),
            Shape::ListOfTruthy(key) => format!("list of '{key}: <{key}>' items"),
            Shape::Record(record) if record.others.is_some() => {
                "mapping of user-defined names".to_string()
            }
            Shape::Record(_) => "mapping".to_string(),
        }
    }
}

/// Rule for one top-level section.
#[derive(Debug)]
pub struct SectionRule {
    pub name: &'static str,
    pub shape: Shape,
}

impl SectionRule {
    /// Check the value of this section on its own.
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        check_shape(&self.shape, value, &DocPath::root().key(self.name))
    }
}

impl fmt::Display for SectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.name, self.shape.describe())?;
        write_children(f, &self.shape, 1)
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, shape: &Shape, depth: usize) -> fmt::Result {
    let Shape::Record(record) = shape else {
        return Ok(());
    };
    let indent = "  ".repeat(depth);

    for field in record.fields {
        let marker = match field.presence {
            Presence::Required => " (required)",
            _ => "",
        };
        writeln!(
            f,
            "{indent}{}: {}{marker}",
            field.name,
            field.shape.describe()
        )?;
        write_children(f, &field.shape, depth + 1)?;
    }

    if let Some(others) = record.others {
        writeln!(f, "{indent}<name>: {}", others.describe())?;
        write_children(f, others, depth + 1)?;
    }

    Ok(())
}

static RULES_BY_NAME: Lazy<BTreeMap<&'static str, &'static SectionRule>> =
    Lazy::new(|| SECTIONS.iter().map(|rule| (rule.name, rule)).collect());

/// All section rules, in table order
pub fn section_rules() -> impl Iterator<Item = &'static SectionRule> {
    SECTIONS.iter()
}

pub fn section_rule(name: &str) -> Option<&'static SectionRule> {
    RULES_BY_NAME.get(name).copied()
}

/// The top-level allow-list
pub fn allowed_sections() -> BTreeSet<&'static str> {
    RULES_BY_NAME.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(name: &str) -> &'static SectionRule {
        section_rule(name).unwrap_or_else(|| panic!("no rule for {name}"))
    }

    fn invalid_path(result: Result<(), ValidationError>) -> String {
        match result {
            Err(ValidationError::InvalidSection { path, .. }) => path.to_string(),
            other => panic!("expected InvalidSection, got {other:?}"),
        }
    }

    fn names(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|key| key.to_string()).collect()
    }

    fn unrecognized_keys(result: Result<(), ValidationError>) -> BTreeSet<String> {
        match result {
            Err(ValidationError::UnrecognizedSection { keys, .. }) => keys.into_iter().collect(),
            other => panic!("expected UnrecognizedSection, got {other:?}"),
        }
    }

    #[test]
    fn test_allow_list() {
        let expected: BTreeSet<&str> = [
            "checkout",
            "database",
            "dependencies",
            "deployment",
            "experimental",
            "general",
            "machine",
            "notify",
            "test",
        ]
        .into_iter()
        .collect();
        assert_eq!(allowed_sections(), expected);
        assert_eq!(section_rules().count(), expected.len());
        assert!(section_rule("foo").is_none());
    }

    #[test]
    fn test_checkout_rule() {
        let checkout = rule("checkout");
        assert!(checkout.check(&json!({"post": ["git submodule sync"]})).is_ok());
        assert!(checkout.check(&json!({})).is_ok());
        assert_eq!(
            invalid_path(checkout.check(&json!({"post": "git submodule sync"}))),
            "checkout.post"
        );
        assert_eq!(
            unrecognized_keys(checkout.check(&json!({"pre": [], "override": []}))),
            names(&["override", "pre"])
        );
    }

    #[test]
    fn test_machine_rule() {
        let machine = rule("machine");
        let valid = json!({
            "pre": ["sudo apt-get update"],
            "post": "anything goes for conditions",
            "timezone": "America/Los_Angeles",
            "environment": {"RAILS_ENV": "test"},
            "hosts": {"circlehost": "127.0.0.1"},
            "services": ["redis", "elasticsearch"],
            "python": {"version": "2.7.10"},
            "ruby": {"version": 2.2},
        });
        assert!(machine.check(&valid).is_ok());

        assert_eq!(
            invalid_path(machine.check(&json!({"timezone": ["UTC"]}))),
            "machine.timezone"
        );
        assert_eq!(
            invalid_path(machine.check(&json!({"services": "redis"}))),
            "machine.services"
        );
        assert_eq!(
            invalid_path(machine.check(&json!({"hosts": ["127.0.0.1"]}))),
            "machine.hosts"
        );
        assert_eq!(
            invalid_path(machine.check(&json!({"node": {"version": ""}}))),
            "machine.node"
        );
        assert_eq!(
            unrecognized_keys(machine.check(&json!({"override": []}))),
            names(&["override"])
        );
    }

    #[test]
    fn test_machine_language_only_supports_version() {
        let err = rule("machine")
            .check(&json!({"python": {"version": "2.7", "extra": 1}}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'machine.python' subsection only supports 'version'"
        );
    }

    #[test]
    fn test_dependencies_rule() {
        let dependencies = rule("dependencies");
        assert!(
            dependencies
                .check(&json!({
                    "pre": ["gem uninstall bundler"],
                    "override": ["bundle install"],
                    "cache_directories": ["vendor/bundle"],
                    "bundler": {"without": ["production"]},
                }))
                .is_ok()
        );
        assert_eq!(
            invalid_path(dependencies.check(&json!({"bundler": ["without"]}))),
            "dependencies.bundler"
        );
        assert_eq!(
            invalid_path(dependencies.check(&json!({"bundler": {"without": "production"}}))),
            "dependencies.bundler.without"
        );
        assert_eq!(
            unrecognized_keys(dependencies.check(&json!({"bundler": {"with": []}}))),
            names(&["with"])
        );
    }

    #[test]
    fn test_database_and_test_rules() {
        assert!(rule("database").check(&json!({"override": ["rake db:create"]})).is_ok());
        assert_eq!(
            invalid_path(rule("database").check(&json!({"pre": {"a": 1}}))),
            "database.pre"
        );
        assert!(rule("test").check(&json!({"minitest_globs": ["test/**/*_test.rb"]})).is_ok());
        assert_eq!(
            unrecognized_keys(rule("test").check(&json!({"minitest_globs": [], "rspec": []}))),
            names(&["rspec"])
        );
    }

    #[test]
    fn test_deployment_rule() {
        let deployment = rule("deployment");
        assert!(
            deployment
                .check(&json!({
                    "production": {
                        "branch": "master",
                        "commands": ["./deploy.sh"],
                        "heroku": {"appname": "foo-bar-123"},
                        "owner": "circleci",
                    },
                    "staging": {"branch": ["develop", "/feature-.*/"], "tag": "/v.*/"},
                }))
                .is_ok()
        );

        let err = deployment
            .check(&json!({"prod": {"commands": []}}))
            .unwrap_err();
        assert_eq!(err.to_string(), "'branch' missing from 'deployment.prod'");

        assert_eq!(
            invalid_path(deployment.check(&json!({"prod": {"branch": {"name": "x"}}}))),
            "deployment.prod.branch"
        );
        assert_eq!(
            invalid_path(deployment.check(&json!({"prod": {"branch": "x", "owner": ["a"]}}))),
            "deployment.prod.owner"
        );
        assert_eq!(
            invalid_path(deployment.check(&json!({"prod": "master"}))),
            "deployment.prod"
        );
        assert_eq!(
            unrecognized_keys(deployment.check(&json!({"prod": {"branch": "x", "region": 1}}))),
            names(&["region"])
        );
    }

    #[test]
    fn test_deployment_falsy_optionals_count_as_absent() {
        let deployment = rule("deployment");
        assert!(
            deployment
                .check(&json!({"prod": {"branch": "x", "commands": null, "heroku": "", "owner": null}}))
                .is_ok()
        );
        assert_eq!(
            invalid_path(deployment.check(&json!({"prod": {"branch": "x", "commands": "deploy"}}))),
            "deployment.prod.commands"
        );
    }

    #[test]
    fn test_notify_rule() {
        let notify = rule("notify");
        assert!(
            notify
                .check(&json!({"webhooks": [{"url": "https://example.com/hooks/circle"}]}))
                .is_ok()
        );
        assert_eq!(
            invalid_path(notify.check(&json!({"webhooks": [{"url": "http://x"}, {"nope": 1}]}))),
            "notify.webhooks[1]"
        );
        assert_eq!(
            invalid_path(notify.check(&json!({"webhooks": {"url": "http://x"}}))),
            "notify.webhooks"
        );
    }

    #[test]
    fn test_general_rule() {
        let general = rule("general");
        assert!(
            general
                .check(&json!({
                    "artifacts": ["coverage"],
                    "build_dir": "api",
                    "branches": {"only": ["master"], "ignore": ["/dev.*/"]},
                }))
                .is_ok()
        );
        assert_eq!(
            invalid_path(general.check(&json!({"build_dir": ["api"]}))),
            "general.build_dir"
        );
        assert_eq!(
            invalid_path(general.check(&json!({"branches": {"only": "master"}}))),
            "general.branches.only"
        );
        assert_eq!(
            unrecognized_keys(general.check(&json!({"branches": {"except": []}}))),
            names(&["except"])
        );
    }

    #[test]
    fn test_experimental_rule() {
        let experimental = rule("experimental");
        assert!(
            experimental
                .check(&json!({"notify": {"branches": {"only": ["master", "/hotfix-.*/"]}}}))
                .is_ok()
        );
        assert_eq!(
            invalid_path(experimental.check(&json!({"notify": {"branches": {"ignore": "dev"}}}))),
            "experimental.notify.branches.ignore"
        );
        assert_eq!(
            invalid_path(experimental.check(&json!({"notify": ["branches"]}))),
            "experimental.notify"
        );
        assert_eq!(
            unrecognized_keys(experimental.check(&json!({"notify": {"branches": {"all": []}}}))),
            names(&["all"])
        );
    }

    #[test]
    fn test_rule_listing() {
        let listing = rule("deployment").to_string();
        assert!(listing.starts_with("deployment: mapping of user-defined names"));
        assert!(listing.contains("<name>: mapping"));
        assert!(listing.contains("branch: string or list (required)"));
    }
}
