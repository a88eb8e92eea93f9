//! Per-file outcomes and source-located diagnostics

use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use serde::Serialize;
use std::path::Path;
use yaml_spanned::{Spanned, Value as YamlValue, from_str};

use super::span_finder::{SpanFinder, line_col};
use super::validator::{SchemaValidator, check_filename, read_source};
use crate::error::{ErrorKind, ValidationError};
use crate::loader::DocumentLoader;

/// Toggle this to add spaces for iTerm2 clickability
const ADD_SPACES_FOR_ITERM: bool = true;

#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("{message}")]
pub struct LocatedError {
    #[source_code]
    pub src: NamedSource<String>,

    #[label("{}", self.label)]
    pub span: SourceSpan,

    pub label: String,

    pub message: String,

    #[help]
    pub help: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorSummary {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

/// Result of validating one file, as printed by `--format json`
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

pub struct Inspection {
    pub report: FileReport,
    /// Rendered diagnostic for failed files
    pub diagnostic: Option<Report>,
}

impl<L: DocumentLoader> SchemaValidator<L> {
    /// Validate the file at `path` and keep enough context to explain a
    /// failure: the error kind, its line and column, and a miette report
    /// pointing at the offending node.
    pub fn inspect(&self, path: &Path) -> Inspection {
        let display_path = path.display().to_string();

        if let Err(err) = check_filename(path) {
            return Inspection::failed(display_path, err, None);
        }

        let source = match read_source(path) {
            Ok(source) => source,
            Err(err) => return Inspection::failed(display_path, err, None),
        };

        match self.validate_source(path, &source) {
            Ok(_) => Inspection {
                report: FileReport {
                    path: display_path,
                    valid: true,
                    error: None,
                },
                diagnostic: None,
            },
            Err(err) => Inspection::failed(display_path, err, Some(&source)),
        }
    }
}

impl Inspection {
    fn failed(path: String, error: ValidationError, source: Option<&str>) -> Self {
        let span = source.and_then(|source| locate(&error, source));
        let (line, column) = match (span, source) {
            (Some(span), Some(source)) => {
                let (line, column) = line_col(source, span.offset());
                (Some(line), Some(column))
            }
            _ => (None, None),
        };

        let report = FileReport {
            path: path.clone(),
            valid: false,
            error: Some(ErrorSummary {
                kind: error.kind(),
                message: error.to_string(),
                line,
                column,
            }),
        };

        let diagnostic = match (span, source) {
            (Some(span), Some(source)) => Report::new(LocatedError {
                src: create_named_source(Path::new(&path), source.to_string()),
                span,
                label: label_for(&error).to_string(),
                message: error.to_string(),
                help: help_for(&error),
            }),
            _ => Report::new(error),
        };

        Self {
            report,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Find the span of the node an error refers to.
fn locate(error: &ValidationError, source: &str) -> Option<SourceSpan> {
    match error {
        ValidationError::Load(inner) => inner
            .downcast_ref::<serde_yaml::Error>()
            .and_then(serde_yaml::Error::location)
            .map(|location| SourceSpan::from(location.index())),
        ValidationError::UnrecognizedSection { path, keys } => {
            let spanned: Spanned<YamlValue> = from_str(source).ok()?;
            let finder = SpanFinder::new(&spanned);
            keys.first()
                .and_then(|key| finder.find_key_span(path, key))
                .or_else(|| Some(finder.find_value_span(path)))
        }
        ValidationError::InvalidSection { path, .. } => {
            let spanned: Spanned<YamlValue> = from_str(source).ok()?;
            Some(SpanFinder::new(&spanned).find_value_span(path))
        }
        ValidationError::InvalidName { .. } | ValidationError::Io(_) => None,
    }
}

fn label_for(error: &ValidationError) -> &'static str {
    match error {
        ValidationError::UnrecognizedSection { .. } => "not allowed here",
        ValidationError::Load(_) => "parse error",
        _ => "here",
    }
}

fn help_for(error: &ValidationError) -> Option<String> {
    match error {
        ValidationError::UnrecognizedSection { path, .. } if path.is_root() => Some(format!(
            "Allowed sections: {}",
            crate::schema::allowed_sections()
                .into_iter()
                .collect::<Vec<_>>()
                .join(", ")
        )),
        _ => None,
    }
}

/// Create a NamedSource with proper formatting for error display
fn create_named_source(path: &Path, content: String) -> NamedSource<String> {
    let path_str = path.display().to_string();
    let formatted_path = if ADD_SPACES_FOR_ITERM {
        format!(" {path_str}")
    } else {
        path_str
    };
    NamedSource::new(formatted_path, content)
}
