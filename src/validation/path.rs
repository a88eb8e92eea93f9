//! Dotted paths into a parsed document, used for error messages and for
//! locating the offending node in the original source.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a node below the document root, e.g. `notify.webhooks[1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocPath(Vec<Segment>);

impl DocPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of a mapping entry below this one
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.to_string()));
        Self(segments)
    }

    /// Path of a list entry below this one
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Number of mapping keys between the root and this node
    pub fn depth(&self) -> usize {
        self.0
            .iter()
            .filter(|segment| matches!(segment, Segment::Key(_)))
            .count()
    }

    /// What a value at this path is called: a section sits directly under the
    /// root, a subsection one level below that, anything deeper is a subitem.
    pub fn level(&self) -> &'static str {
        match self.depth() {
            0 | 1 => "section",
            2 => "subsection",
            _ => "subitem",
        }
    }

    /// What the children of a mapping at this path are called.
    pub fn child_level(&self) -> &'static str {
        match self.depth() {
            0 => "section",
            1 => "subsection",
            _ => "subitem",
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
