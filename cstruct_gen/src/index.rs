use cstruct_syntax::{Field, NodeKind, NodeRef, Query, SyntaxTree};
use indexmap::IndexMap;

/// One alias introduced by a `typedef`.
#[derive(Debug, Clone, Copy)]
pub struct TypedefEntry<'t> {
    pub definition: NodeRef<'t>,
    /// The type the alias stands for (the typedef's type specifier).
    pub aliased: NodeRef<'t>,
    pub declarator: NodeRef<'t>,
    /// `false` when the alias is introduced through a pointer, array or
    /// function declarator, i.e. it names a derived type.
    pub direct: bool,
}

/// Typedef aliases and struct definitions of one translation unit.
///
/// Built once, read-only afterwards. When a name is declared more than once
/// the first declaration in source order wins.
#[derive(Debug)]
pub struct SymbolIndex<'t> {
    tree: &'t SyntaxTree,
    typedefs: IndexMap<&'t str, TypedefEntry<'t>>,
    structs: IndexMap<&'t str, NodeRef<'t>>,
}

impl<'t> SymbolIndex<'t> {
    pub fn build(tree: &'t SyntaxTree) -> Self {
        let mut typedefs = IndexMap::new();
        for definition in tree.query(&Query::new(NodeKind::TypeDefinition)) {
            let Some(aliased) = definition.child_by_field(Field::Type) else {
                continue;
            };
            for declarator in definition.children_by_field(Field::Declarator) {
                let Some(name) = declarator.declared_identifier() else {
                    continue;
                };
                typedefs.entry(name.text()).or_insert(TypedefEntry {
                    definition,
                    aliased,
                    declarator,
                    direct: unwrap_declarator(declarator).kind().is_name(),
                });
            }
        }

        let mut structs = IndexMap::new();
        let defined = Query::new(NodeKind::StructSpecifier)
            .has_field(Field::Name)
            .has_field(Field::Body);
        for spec in tree.query(&defined) {
            if let Some(name) = spec.child_by_field(Field::Name) {
                structs.entry(name.text()).or_insert(spec);
            }
        }

        tracing::debug!(
            typedefs = typedefs.len(),
            structs = structs.len(),
            "symbol index built"
        );
        Self {
            tree,
            typedefs,
            structs,
        }
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn typedef(&self, alias: &str) -> Option<&TypedefEntry<'t>> {
        self.typedefs.get(alias)
    }

    /// Struct specifier with tag `tag` that carries a field list.
    pub fn struct_definition(&self, tag: &str) -> Option<NodeRef<'t>> {
        self.structs.get(tag).copied()
    }

    pub fn typedef_names(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.typedefs.keys().copied()
    }

    pub fn struct_tags(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.structs.keys().copied()
    }
}

/* Strip parenthesized and attributed wrappers around a declarator */
pub(crate) fn unwrap_declarator(node: NodeRef<'_>) -> NodeRef<'_> {
    let mut node = node;
    while matches!(
        node.kind(),
        NodeKind::ParenthesizedDeclarator | NodeKind::AttributedDeclarator
    ) {
        match node.children().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
struct Foo;
typedef struct Foo Foo_t;
typedef struct Foo *FooPtr;
struct Foo { int a; };
struct Foo { long shadowed; };
typedef int Ints[4], Int;
"#;

    #[test]
    fn test_first_definition_wins() {
        let tree = SyntaxTree::parse(SOURCE);
        let index = SymbolIndex::build(&tree);
        let foo = index.struct_definition("Foo").expect("Foo");
        assert!(foo.text().contains("int a"));
        assert_eq!(index.struct_tags().count(), 1);
    }

    #[test]
    fn test_direct_and_derived_aliases() {
        let tree = SyntaxTree::parse(SOURCE);
        let index = SymbolIndex::build(&tree);
        assert!(index.typedef("Foo_t").expect("Foo_t").direct);
        assert!(!index.typedef("FooPtr").expect("FooPtr").direct);
        assert!(!index.typedef("Ints").expect("Ints").direct);
        let int = index.typedef("Int").expect("Int");
        assert!(int.direct);
        assert_eq!(int.aliased.text(), "int");
    }

    #[test]
    fn test_forward_declaration_is_not_a_definition() {
        let tree = SyntaxTree::parse("struct Only;");
        let index = SymbolIndex::build(&tree);
        assert!(index.struct_definition("Only").is_none());
    }
}
