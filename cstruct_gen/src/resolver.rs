//! Identifier to struct definition resolution
//!
//! A type identifier is either a bare name (typedef alias or struct tag) or
//! `struct <tag>`. Resolution follows typedef aliases, including chains of
//! the form `typedef A B;`, until it reaches a struct definition with a field
//! list or something that is not a struct.

use crate::index::{SymbolIndex, TypedefEntry};
use cstruct_syntax::{Field, NodeId, NodeKind, NodeRef};
use std::fmt;

/// A parsed type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeIdentifier<'a> {
    Name(&'a str),
    Struct(&'a str),
}

impl<'a> TypeIdentifier<'a> {
    pub fn parse(identifier: &'a str) -> Result<Self, Unsupported> {
        let tokens: Vec<&'a str> = identifier.split_whitespace().collect();
        match tokens.as_slice() {
            [name] => Ok(TypeIdentifier::Name(*name)),
            ["struct", tag] => Ok(TypeIdentifier::Struct(*tag)),
            [specifier, _] => Err(Unsupported::UnknownSpecifier(specifier.to_string())),
            _ => Err(Unsupported::Unparseable(identifier.to_string())),
        }
    }

    /// Name an adapter for this identifier is bound to.
    pub fn declared_name(&self) -> &'a str {
        match *self {
            TypeIdentifier::Name(name) => name,
            TypeIdentifier::Struct(tag) => tag,
        }
    }
}

impl fmt::Display for TypeIdentifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeIdentifier::Name(name) => f.write_str(name),
            TypeIdentifier::Struct(tag) => write!(f, "struct {}", tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsupported {
    Union,
    Unparseable(String),
    UnknownSpecifier(String),
    /// Names visited on the way around the cycle, ending with the repeat.
    Cycle(Vec<String>),
}

/// A struct specifier that carries a field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructDef<'t> {
    node: NodeRef<'t>,
}

impl<'t> StructDef<'t> {
    pub fn new(node: NodeRef<'t>) -> Self {
        Self { node }
    }

    pub fn node(&self) -> NodeRef<'t> {
        self.node
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn tag(&self) -> Option<&'t str> {
        self.node.child_by_field(Field::Name).map(|n| n.text())
    }

    pub fn body(&self) -> Option<NodeRef<'t>> {
        self.node.child_by_field(Field::Body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType<'t> {
    Struct(StructDef<'t>),
    Enum,
    Opaque(String),
    Unsupported(Unsupported),
}

impl ResolvedType<'_> {
    /// Short description used in "identifier is ..." diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ResolvedType::Struct(_) => "struct".to_string(),
            ResolvedType::Enum => "enum".to_string(),
            ResolvedType::Opaque(name) => name.clone(),
            ResolvedType::Unsupported(Unsupported::Union) => "union".to_string(),
            ResolvedType::Unsupported(Unsupported::Unparseable(_)) => "unparseable".to_string(),
            ResolvedType::Unsupported(Unsupported::UnknownSpecifier(spec)) => {
                format!("unknown specifier {}", spec)
            }
            ResolvedType::Unsupported(Unsupported::Cycle(chain)) => {
                format!("cyclic ({})", chain.join(" -> "))
            }
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, ResolvedType::Struct(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a, 't> {
    index: &'a SymbolIndex<'t>,
}

impl<'a, 't> Resolver<'a, 't> {
    pub fn new(index: &'a SymbolIndex<'t>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a SymbolIndex<'t> {
        self.index
    }

    pub fn resolve(&self, identifier: &str) -> ResolvedType<'t> {
        let mut visited = Vec::new();
        self.resolve_with(identifier, &mut visited)
    }

    /// Resolve the type named by a field's type specifier node.
    pub fn resolve_specifier(&self, node: NodeRef<'t>) -> ResolvedType<'t> {
        match node.kind() {
            NodeKind::StructSpecifier => match node.child_by_field(Field::Body) {
                Some(_) => ResolvedType::Struct(StructDef::new(node)),
                None => match node.child_by_field(Field::Name) {
                    Some(name) => self.resolve(&format!("struct {}", name.text())),
                    None => ResolvedType::Opaque(node.text().to_string()),
                },
            },
            NodeKind::UnionSpecifier => ResolvedType::Unsupported(Unsupported::Union),
            NodeKind::EnumSpecifier => ResolvedType::Enum,
            NodeKind::TypeIdentifier => self.resolve(node.text()),
            _ => ResolvedType::Opaque(node.text().to_string()),
        }
    }

    fn resolve_with(&self, identifier: &str, visited: &mut Vec<String>) -> ResolvedType<'t> {
        let parsed = match TypeIdentifier::parse(identifier) {
            Ok(parsed) => parsed,
            Err(reason) => return ResolvedType::Unsupported(reason),
        };

        let key = parsed.to_string();
        if visited.contains(&key) {
            visited.push(key);
            return ResolvedType::Unsupported(Unsupported::Cycle(visited.clone()));
        }
        visited.push(key);
        tracing::debug!(identifier = %parsed, depth = visited.len(), "resolving type");

        if let TypeIdentifier::Name(name) = parsed {
            if let Some(entry) = self.index.typedef(name) {
                return self.resolve_typedef(name, entry, visited);
            }
        }

        match self.index.struct_definition(parsed.declared_name()) {
            Some(def) => ResolvedType::Struct(StructDef::new(def)),
            None => ResolvedType::Opaque(parsed.to_string()),
        }
    }

    fn resolve_typedef(
        &self,
        alias: &str,
        entry: &TypedefEntry<'t>,
        visited: &mut Vec<String>,
    ) -> ResolvedType<'t> {
        if !entry.direct {
            return ResolvedType::Opaque(alias.to_string());
        }
        let aliased = entry.aliased;
        match aliased.kind() {
            NodeKind::StructSpecifier => {
                if aliased.child_by_field(Field::Body).is_some() {
                    return ResolvedType::Struct(StructDef::new(aliased));
                }
                match aliased.child_by_field(Field::Name) {
                    Some(tag) => self.resolve_with(&format!("struct {}", tag.text()), visited),
                    None => ResolvedType::Opaque(aliased.text().to_string()),
                }
            }
            NodeKind::EnumSpecifier => ResolvedType::Enum,
            NodeKind::UnionSpecifier => ResolvedType::Unsupported(Unsupported::Union),
            NodeKind::TypeIdentifier => self.resolve_with(aliased.text(), visited),
            _ => ResolvedType::Opaque(aliased.text().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstruct_syntax::SyntaxTree;

    #[test]
    fn test_identifier_forms() {
        assert_eq!(TypeIdentifier::parse("Foo"), Ok(TypeIdentifier::Name("Foo")));
        assert_eq!(
            TypeIdentifier::parse("  struct   Foo "),
            Ok(TypeIdentifier::Struct("Foo"))
        );
        assert_eq!(
            TypeIdentifier::parse("union Foo"),
            Err(Unsupported::UnknownSpecifier("union".into()))
        );
        assert_eq!(
            TypeIdentifier::parse("struct Foo Bar"),
            Err(Unsupported::Unparseable("struct Foo Bar".into()))
        );
        assert_eq!(
            TypeIdentifier::parse(""),
            Err(Unsupported::Unparseable(String::new()))
        );
    }

    #[test]
    fn test_cycle_is_reported() {
        let tree = SyntaxTree::parse("typedef B A; typedef A B;");
        let index = SymbolIndex::build(&tree);
        let resolved = Resolver::new(&index).resolve("A");
        assert_eq!(
            resolved,
            ResolvedType::Unsupported(Unsupported::Cycle(vec![
                "A".into(),
                "B".into(),
                "A".into()
            ]))
        );
    }

    #[test]
    fn test_primitive_alias_is_opaque() {
        let tree = SyntaxTree::parse("typedef unsigned int u32_t;");
        let index = SymbolIndex::build(&tree);
        assert_eq!(
            Resolver::new(&index).resolve("u32_t"),
            ResolvedType::Opaque("unsigned int".into())
        );
    }
}
