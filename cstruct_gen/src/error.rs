use thiserror::Error;

/// Failures that stop a generation request outright.
///
/// Everything else (unions, anonymous structs, unknown names) is reported
/// through [`crate::diagnostics::Diagnostics`] and generation carries on.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("cannot parse identifier: {0}")]
    UnparseableIdentifier(String),

    #[error("unknown specifier `{specifier}` in identifier `{identifier}`")]
    UnknownSpecifier {
        identifier: String,
        specifier: String,
    },

    #[error("cyclic type definition: {}", .0.join(" -> "))]
    CyclicType(Vec<String>),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Failures of the reference evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{0}` is not present in the record")]
    MissingSlot(String),
}
