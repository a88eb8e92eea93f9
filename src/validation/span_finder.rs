use miette::SourceSpan;
use yaml_spanned::{Spanned, Value as YamlValue};

use super::path::{DocPath, Segment};

/// Helper for finding spans in spanned YAML values
pub struct SpanFinder<'a> {
    root: &'a Spanned<YamlValue>,
}

impl<'a> SpanFinder<'a> {
    pub fn new(root: &'a Spanned<YamlValue>) -> Self {
        Self { root }
    }

    /// Span of the value at `path`, falling back to the closest ancestor
    /// that exists in the document.
    pub fn find_value_span(&self, path: &DocPath) -> SourceSpan {
        span_of(self.walk(path))
    }

    /// Span of the key `key` inside the mapping at `path`
    pub fn find_key_span(&self, path: &DocPath, key: &str) -> Option<SourceSpan> {
        let node = self.walk(path);
        match unwrap_tags(node).as_ref() {
            YamlValue::Mapping(map) => map
                .iter()
                .find(|(k, _)| key_matches(k, key))
                .map(|(k, _)| span_of(k)),
            _ => None,
        }
    }

    fn walk(&self, path: &DocPath) -> &'a Spanned<YamlValue> {
        let mut current = self.root;

        for segment in path.segments() {
            let next = match (segment, unwrap_tags(current).as_ref()) {
                (Segment::Key(key), YamlValue::Mapping(map)) => map
                    .iter()
                    .find(|(k, _)| key_matches(k, key))
                    .map(|(_, value)| value),
                (Segment::Index(index), YamlValue::Sequence(seq)) => seq.iter().nth(*index),
                _ => None,
            };

            match next {
                Some(node) => current = node,
                None => break,
            }
        }

        current
    }
}

fn unwrap_tags(mut node: &Spanned<YamlValue>) -> &Spanned<YamlValue> {
    while let YamlValue::Tagged(tagged) = node.as_ref() {
        node = &tagged.value;
    }
    node
}

fn key_matches(node: &Spanned<YamlValue>, key: &str) -> bool {
    match node.as_ref() {
        YamlValue::String(s) => s == key,
        _ => false,
    }
}

fn span_of(node: &Spanned<YamlValue>) -> SourceSpan {
    let span = node.span();
    let start = span.start.unwrap_or_default().byte_index;
    let end = span.end.unwrap_or_default().byte_index;
    SourceSpan::new(start.into(), end.saturating_sub(start))
}

/// 1-based line and column of a byte offset
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
