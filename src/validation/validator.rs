use std::path::Path;
use tracing::{debug, info};

use super::path::DocPath;
use super::walker::{as_mapping, unrecognized_keys};
use crate::error::ValidationError;
use crate::loader::{Document, DocumentLoader, YamlLoader};
use crate::schema::{REQUIRED_FILENAME, section_rule};

/// Validates circle.yml files against the fixed section table.
///
/// The validator holds no state besides its loader, so repeated calls on the
/// same input always produce the same result.
#[derive(Debug, Default, Clone)]
pub struct SchemaValidator<L = YamlLoader> {
    loader: L,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self { loader: YamlLoader }
    }
}

impl<L: DocumentLoader> SchemaValidator<L> {
    pub fn with_loader(loader: L) -> Self {
        Self { loader }
    }

    /// Validate the file at `path`.
    ///
    /// Returns `Ok(true)` only when every check passes. I/O failures and
    /// loader failures are returned as they were raised.
    pub fn validate(&self, path: &Path) -> Result<bool, ValidationError> {
        check_filename(path)?;

        let source = read_source(path)?;
        self.validate_loaded(path, &source)
    }

    /// Validate `source` as the contents of the file at `path`, without
    /// touching the filesystem.
    pub fn validate_source(&self, path: &Path, source: &str) -> Result<bool, ValidationError> {
        check_filename(path)?;
        self.validate_loaded(path, source)
    }

    fn validate_loaded(&self, path: &Path, source: &str) -> Result<bool, ValidationError> {
        let document = self.loader.load(source).map_err(ValidationError::Load)?;
        self.validate_document(&document)?;

        info!("✓ circle.yml validation passed: {path:?}");
        Ok(true)
    }

    /// Check an already-parsed document against the section table.
    pub fn validate_document(&self, document: &Document) -> Result<(), ValidationError> {
        let root = DocPath::root();
        let sections = as_mapping(document, &root)?;

        let unknown = unrecognized_keys(sections, |name| section_rule(name).is_some());
        if !unknown.is_empty() {
            return Err(ValidationError::UnrecognizedSection {
                path: root,
                keys: unknown,
            });
        }

        for (name, value) in sections {
            if let Some(rule) = section_rule(name) {
                debug!("  Checking section '{name}'...");
                rule.check(value)?;
            }
        }

        Ok(())
    }
}

/// The base filename must be exactly `circle.yml`; content is not consulted.
pub fn check_filename(path: &Path) -> Result<(), ValidationError> {
    let found = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    if found == REQUIRED_FILENAME {
        Ok(())
    } else {
        Err(ValidationError::InvalidName { found })
    }
}

/// Read the file at `path` as text.
///
/// Undecodable bytes are a load failure, not an I/O one: the file was read,
/// its contents just could not be parsed.
pub(crate) fn read_source(path: &Path) -> Result<String, ValidationError> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|err| ValidationError::Load(Box::new(err)))
}

/// Validate the file at `path` using `loader` to parse it.
pub fn validate_file<L: DocumentLoader>(
    path: impl AsRef<Path>,
    loader: L,
) -> Result<bool, ValidationError> {
    SchemaValidator::with_loader(loader).validate(path.as_ref())
}
