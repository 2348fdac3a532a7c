use thiserror::Error;

/// A syntax problem found while building the tree.
///
/// Errors are collected rather than returned: the parser records the error,
/// wraps the offending region in an `ERROR` node and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self {
            message: message.into(),
            line,
            column,
            offset,
        }
    }
}
