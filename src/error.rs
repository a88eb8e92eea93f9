//! Error taxonomy for circle.yml validation

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::loader::LoadError;
use crate::validation::DocPath;

#[derive(Error, Debug, Diagnostic)]
pub enum ValidationError {
    #[error("Filename must be 'circle.yml' (found '{found}')")]
    #[diagnostic(
        code(circlecheck::invalid_name),
        help("CircleCI only reads its configuration from a file named 'circle.yml'")
    )]
    InvalidName { found: String },

    /// Every key at one level that is outside that level's allow-list.
    #[error("{}", unrecognized_message(.path, .keys))]
    #[diagnostic(code(circlecheck::unrecognized_section))]
    UnrecognizedSection { path: DocPath, keys: Vec<String> },

    #[error("{message}")]
    #[diagnostic(code(circlecheck::invalid_section))]
    InvalidSection { path: DocPath, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failure reported by the document loader, passed through untouched.
    #[error(transparent)]
    Load(LoadError),
}

fn unrecognized_message(path: &DocPath, keys: &[String]) -> String {
    let keys = keys.join(", ");
    match path.depth() {
        0 => format!("The following sections are unrecognized: {keys}"),
        1 => format!("Subsections not allowed in '{path}': {keys}"),
        _ => format!("Subitems not allowed in '{path}': {keys}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidName,
    UnrecognizedSection,
    InvalidSection,
    Io,
    Parse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidName => "invalid_name",
            ErrorKind::UnrecognizedSection => "unrecognized_section",
            ErrorKind::InvalidSection => "invalid_section",
            ErrorKind::Io => "io",
            ErrorKind::Parse => "parse",
        }
    }
}

impl ValidationError {
    pub(crate) fn invalid_section(path: &DocPath, message: impl Into<String>) -> Self {
        Self::InvalidSection {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::UnrecognizedSection { .. } => ErrorKind::UnrecognizedSection,
            Self::InvalidSection { .. } => ErrorKind::InvalidSection,
            Self::Io(_) => ErrorKind::Io,
            Self::Load(_) => ErrorKind::Parse,
        }
    }

    /// Document path of the offending node, for schema violations
    pub fn path(&self) -> Option<&DocPath> {
        match self {
            Self::UnrecognizedSection { path, .. } | Self::InvalidSection { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_message_per_level() {
        let keys = vec!["bar".to_string(), "foo".to_string()];

        let root = ValidationError::UnrecognizedSection {
            path: DocPath::root(),
            keys: keys.clone(),
        };
        assert_eq!(
            root.to_string(),
            "The following sections are unrecognized: bar, foo"
        );

        let section = ValidationError::UnrecognizedSection {
            path: DocPath::root().key("machine"),
            keys: keys.clone(),
        };
        assert_eq!(
            section.to_string(),
            "Subsections not allowed in 'machine': bar, foo"
        );

        let nested = ValidationError::UnrecognizedSection {
            path: DocPath::root().key("general").key("branches"),
            keys,
        };
        assert_eq!(
            nested.to_string(),
            "Subitems not allowed in 'general.branches': bar, foo"
        );
    }

    #[test]
    fn test_kind_and_path() {
        let err = ValidationError::invalid_section(&DocPath::root().key("test"), "broken");
        assert_eq!(err.kind(), ErrorKind::InvalidSection);
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("test"));

        let err = ValidationError::InvalidName {
            found: "config.yml".to_string(),
        };
        assert_eq!(err.kind().as_str(), "invalid_name");
        assert!(err.path().is_none());
    }

    #[test]
    fn test_io_errors_pass_through_unchanged() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ValidationError::from(io);
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "no such file");
    }
}
