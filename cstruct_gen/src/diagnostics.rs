use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Top-level identifier did not resolve to a struct.
    UnresolvedIdentifier,
    /// Adapter requested for a struct with no name to bind it to.
    AnonymousStruct,
    /// Field whose type is an inline anonymous struct.
    AnonymousField,
    UnionField,
    FunctionField,
    /// Pointer-to-pointer, multi-dimensional arrays and similar.
    UnsupportedDeclarator,
    /// `struct Foo` used as a field type but never defined.
    MissingDefinition,
    /// Struct that contains itself by value through its fields.
    RecursiveType,
    ConstField,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedIdentifier => "unresolved-identifier",
            DiagnosticKind::AnonymousStruct => "anonymous-struct",
            DiagnosticKind::AnonymousField => "anonymous-field",
            DiagnosticKind::UnionField => "union-field",
            DiagnosticKind::FunctionField => "function-field",
            DiagnosticKind::UnsupportedDeclarator => "unsupported-declarator",
            DiagnosticKind::MissingDefinition => "missing-definition",
            DiagnosticKind::RecursiveType => "recursive-type",
            DiagnosticKind::ConstField => "const-field",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal problem found while resolving or generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Field or type the diagnostic is about.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Append-only diagnostics sink. Entries are also logged at `warn` level.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        tracing::warn!(kind = %diagnostic.kind, subject = %diagnostic.subject, "{}", diagnostic.message);
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut diags = Diagnostics::new();
        diags.push(DiagnosticKind::UnionField, "u", "Union is not supported: union U");
        diags.push(DiagnosticKind::FunctionField, "cb", "function field");
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.entries()[0].subject, "u");
        assert_eq!(diags.count(DiagnosticKind::FunctionField), 1);
    }

    #[test]
    fn test_display_includes_kind() {
        let mut diags = Diagnostics::new();
        diags.push(DiagnosticKind::ConstField, "f", "const field `f` is encoded only");
        assert_eq!(
            diags.entries()[0].to_string(),
            "[const-field] const field `f` is encoded only"
        );
    }
}
