/* C Struct Schema and Adapter Generation
 *
 * Given a parsed translation unit and a type identifier, resolves the struct
 * the identifier names and produces either an ordered YAML schema of its
 * fields or yaml-cpp `convert<T>` adapters for it and every named struct it
 * contains. Problems that do not prevent generation are collected as
 * diagnostics and returned next to the output.
 */

pub mod codegen;
pub mod diagnostics;
pub mod error;
pub mod eval;
pub mod fields;
pub mod index;
pub mod render;
pub mod resolver;
pub mod schema;

use cstruct_syntax::SyntaxTree;

pub use codegen::{Adapter, CodeGenerator, Emission};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{EvalError, GenError};
pub use index::SymbolIndex;
pub use resolver::{ResolvedType, Resolver, TypeIdentifier, Unsupported};
pub use schema::{Schema, SchemaEntry, SchemaExtractor};

/// Output of one generation request plus everything worth warning about.
#[derive(Debug)]
pub struct Generated<T> {
    pub output: T,
    pub diagnostics: Diagnostics,
}

/// Symbol index over one parsed translation unit, and the entry points that
/// run on it.
pub struct Session<'t> {
    index: SymbolIndex<'t>,
}

impl<'t> Session<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            index: SymbolIndex::build(tree),
        }
    }

    pub fn index(&self) -> &SymbolIndex<'t> {
        &self.index
    }

    pub fn resolver(&self) -> Resolver<'_, 't> {
        Resolver::new(&self.index)
    }

    /// Resolve `identifier`; malformed or cyclic identifiers are errors.
    pub fn resolve(&self, identifier: &str) -> Result<ResolvedType<'t>, GenError> {
        match self.resolver().resolve(identifier) {
            ResolvedType::Unsupported(Unsupported::Unparseable(_)) => {
                Err(GenError::UnparseableIdentifier(identifier.to_string()))
            }
            ResolvedType::Unsupported(Unsupported::UnknownSpecifier(specifier)) => {
                Err(GenError::UnknownSpecifier {
                    identifier: identifier.to_string(),
                    specifier,
                })
            }
            ResolvedType::Unsupported(Unsupported::Cycle(chain)) => Err(GenError::CyclicType(chain)),
            resolved => Ok(resolved),
        }
    }

    /// Schema of the struct `identifier` names; empty when it names anything
    /// else.
    pub fn schema(&self, identifier: &str) -> Result<Generated<Schema>, GenError> {
        let resolved = self.resolve(identifier)?;
        let mut diagnostics = Diagnostics::new();
        report_non_struct(&resolved, &mut diagnostics);
        let output = SchemaExtractor::new(self.resolver(), &mut diagnostics).extract(&resolved);
        Ok(Generated {
            output,
            diagnostics,
        })
    }

    /// Adapters for the struct `identifier` names. The outermost adapter is
    /// bound to the identifier itself (the tag for `struct <tag>`).
    pub fn adapters(&self, identifier: &str) -> Result<Generated<Option<Emission>>, GenError> {
        let resolved = self.resolve(identifier)?;
        let declared = TypeIdentifier::parse(identifier)
            .map_err(|_| GenError::UnparseableIdentifier(identifier.to_string()))?
            .declared_name();
        let mut diagnostics = Diagnostics::new();
        report_non_struct(&resolved, &mut diagnostics);
        let output = CodeGenerator::new(self.resolver(), &mut diagnostics)
            .generate(&resolved, Some(declared));
        Ok(Generated {
            output,
            diagnostics,
        })
    }
}

fn report_non_struct(resolved: &ResolvedType<'_>, diagnostics: &mut Diagnostics) {
    if !resolved.is_struct() {
        let description = resolved.describe();
        diagnostics.push(
            DiagnosticKind::UnresolvedIdentifier,
            description.clone(),
            format!("identifier is {}", description),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_identifier_is_an_error() {
        let tree = SyntaxTree::parse("struct Foo { int a; };");
        let session = Session::new(&tree);
        assert!(matches!(
            session.schema("struct Foo Bar"),
            Err(GenError::UnparseableIdentifier(_))
        ));
        assert!(matches!(
            session.adapters("enum Foo"),
            Err(GenError::UnknownSpecifier { .. })
        ));
    }

    #[test]
    fn test_non_struct_identifier_reports_what_it_is() {
        let tree = SyntaxTree::parse("typedef enum { A } Mode;");
        let session = Session::new(&tree);
        let generated = session.schema("Mode").expect("schema");
        assert!(generated.output.is_empty());
        assert_eq!(generated.diagnostics.entries()[0].message, "identifier is enum");
    }
}
