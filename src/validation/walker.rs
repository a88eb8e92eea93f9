//! Depth-first shape checking
//!
//! Every check is fail-fast: the first violation found is returned and the
//! walk stops there.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::path::DocPath;
use crate::error::ValidationError;
use crate::schema::{Presence, Record, Shape};

/// Check `value`, found at `path`, against `shape`.
pub fn check_shape(shape: &Shape, value: &Value, path: &DocPath) -> Result<(), ValidationError> {
    match shape {
        Shape::Any => Ok(()),
        Shape::List => require(value.is_array(), path, "must be a list"),
        Shape::Str => require(value.is_string(), path, "must be a string"),
        Shape::StrOrList => require(
            value.is_string() || value.is_array(),
            path,
            "must be a string or a list",
        ),
        Shape::Mapping => require(value.is_object(), path, "must be a mapping"),
        Shape::Versioned => {
            let versioned = value
                .as_object()
                .is_some_and(|map| map.len() == 1 && map.get("version").is_some_and(is_truthy));
            require(versioned, path, "only supports 'version'")
        }
        Shape::ListOfTruthy(key) => check_list_of_truthy(key, value, path),
        Shape::Record(record) => check_record(record, value, path),
    }
}

fn require(ok: bool, path: &DocPath, expectation: &str) -> Result<(), ValidationError> {
    if ok {
        Ok(())
    } else {
        Err(ValidationError::invalid_section(
            path,
            format!("'{path}' {} {expectation}", path.level()),
        ))
    }
}

fn check_list_of_truthy(key: &str, value: &Value, path: &DocPath) -> Result<(), ValidationError> {
    let expectation = format!("must be a list of '{key}: <{key}>' items");
    let Some(items) = value.as_array() else {
        return require(false, path, &expectation);
    };

    for (index, item) in items.iter().enumerate() {
        if !item.get(key).is_some_and(is_truthy) {
            return Err(ValidationError::invalid_section(
                &path.index(index),
                format!(
                    "'{path}' {} {expectation} (entry {index} has no '{key}')",
                    path.level()
                ),
            ));
        }
    }

    Ok(())
}

fn check_record(record: &Record, value: &Value, path: &DocPath) -> Result<(), ValidationError> {
    let map = as_mapping(value, path)?;

    let unknown = unrecognized_keys(map, |key| record.allows(key));
    if !unknown.is_empty() {
        return Err(ValidationError::UnrecognizedSection {
            path: path.clone(),
            keys: unknown,
        });
    }

    for field in record.fields {
        if field.presence == Presence::Required && !map.contains_key(field.name) {
            return Err(ValidationError::invalid_section(
                path,
                format!("'{}' missing from '{path}'", field.name),
            ));
        }
    }

    for (key, item) in map {
        let shape = match record.field(key) {
            Some(field) if field.presence == Presence::WhenTruthy && !is_truthy(item) => continue,
            Some(field) => &field.shape,
            None => match record.others {
                Some(others) => others,
                None => continue,
            },
        };
        check_shape(shape, item, &path.key(key))?;
    }

    Ok(())
}

/// Borrow `value` as a mapping, or report the container at `path` as malformed.
pub fn as_mapping<'a>(
    value: &'a Value,
    path: &DocPath,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| {
        let message = if path.is_root() {
            "Invalid subsection format in document root".to_string()
        } else {
            format!("Invalid {} format in '{path}'", path.child_level())
        };
        ValidationError::invalid_section(path, message)
    })
}

/// Keys of `map` rejected by `allowed`, sorted and de-duplicated.
pub fn unrecognized_keys(map: &Map<String, Value>, allowed: impl Fn(&str) -> bool) -> Vec<String> {
    map.keys()
        .filter(|key| !allowed(key))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Null, `false`, zero, and empty strings, lists and mappings are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
