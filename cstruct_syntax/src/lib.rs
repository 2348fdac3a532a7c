/* C Declaration Syntax Tree
 *
 * Parses C source text into an immutable concrete syntax tree covering the
 * declaration subset of the language: typedefs, struct/union/enum specifiers,
 * field declarations and declarators. Function bodies, initializers and
 * parameter lists are kept as opaque spans. Parsing never fails outright;
 * regions that cannot be parsed become ERROR nodes and are reported through
 * `SyntaxTree::errors`.
 */

pub mod dump;
pub mod error;
pub mod lexer;
mod parser;
pub mod query;
pub mod tree;

pub use dump::TreeDump;
pub use error::ParseError;
pub use query::Query;
pub use tree::{Field, NodeId, NodeKind, NodeRef, Span, SyntaxTree};

/* Merge the contents of several source files into one translation unit */
pub fn merge_sources<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|part| part.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sources_joins_with_newline() {
        let merged = merge_sources(["struct A { int a; };", "struct B { int b; };"]);
        assert_eq!(merged, "struct A { int a; };\nstruct B { int b; };");
    }

    #[test]
    fn test_merge_sources_single_part_is_unchanged() {
        assert_eq!(merge_sources(["int x;"]), "int x;");
    }
}
