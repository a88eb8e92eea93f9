//! Structured-document loading
//!
//! The validator never parses text itself; it asks a [`DocumentLoader`] to
//! turn the file contents into a [`Document`] tree. [`YamlLoader`] is the
//! default, and any `Fn(&str) -> Result<Document, LoadError>` closure can be
//! injected instead.

use serde_json::Value;

/// Parsed document tree: mappings, lists and scalars.
pub type Document = Value;

/// Native error of whichever loader produced it.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

pub trait DocumentLoader {
    fn load(&self, source: &str) -> Result<Document, LoadError>;
}

/// Parses YAML text with `serde_yaml`.
///
/// `<<` merge keys are expanded before conversion. Scalar mapping keys
/// (numbers, booleans) become their string form; null or collection keys are
/// rejected as a load error.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlLoader;

impl DocumentLoader for YamlLoader {
    fn load(&self, source: &str) -> Result<Document, LoadError> {
        let mut yaml: serde_yaml::Value = serde_yaml::from_str(source)?;
        yaml.apply_merge()?;
        Ok(serde_json::to_value(yaml)?)
    }
}

impl<F> DocumentLoader for F
where
    F: Fn(&str) -> Result<Document, LoadError>,
{
    fn load(&self, source: &str) -> Result<Document, LoadError> {
        self(source)
    }
}
