use crate::index::unwrap_declarator;
use crate::resolver::{ResolvedType, Resolver};
use cstruct_syntax::{Field, NodeKind, NodeRef};

/// Shape of one declared member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaratorKind {
    Scalar,
    Pointer,
    /// Fixed-size array; the size expression is kept as source text.
    Array(String),
    Function,
    /// Declarator that derives more than once; the payload names the shape.
    Nested(&'static str),
}

impl DeclaratorKind {
    /// Classify a field declarator. `None` for node kinds that are not
    /// declarators at all.
    pub fn classify(declarator: NodeRef<'_>) -> Option<Self> {
        let node = unwrap_declarator(declarator);
        let kind = match node.kind() {
            kind if kind.is_name() => DeclaratorKind::Scalar,
            NodeKind::FunctionDeclarator => DeclaratorKind::Function,
            NodeKind::PointerDeclarator => {
                let inner = unwrap_declarator(node.child_by_field(Field::Declarator)?);
                match inner.kind() {
                    kind if kind.is_name() => DeclaratorKind::Pointer,
                    NodeKind::PointerDeclarator => DeclaratorKind::Nested("pointer to pointer"),
                    NodeKind::ArrayDeclarator => DeclaratorKind::Nested("array of pointers"),
                    NodeKind::FunctionDeclarator => DeclaratorKind::Function,
                    _ => return None,
                }
            }
            NodeKind::ArrayDeclarator => {
                let inner = unwrap_declarator(node.child_by_field(Field::Declarator)?);
                let size = node.child_by_field(Field::Size);
                match (inner.kind(), size) {
                    (kind, Some(size)) if kind.is_name() => {
                        DeclaratorKind::Array(size.text().to_string())
                    }
                    (kind, None) if kind.is_name() => {
                        DeclaratorKind::Nested("flexible array member")
                    }
                    (NodeKind::ArrayDeclarator, _) => {
                        DeclaratorKind::Nested("multi-dimensional array")
                    }
                    (NodeKind::PointerDeclarator, _) => DeclaratorKind::Nested("pointer to array"),
                    (NodeKind::FunctionDeclarator, _) => {
                        DeclaratorKind::Nested("array of functions")
                    }
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor<'t> {
    pub name: &'t str,
    pub declarator: DeclaratorKind,
    /// The member itself cannot be assigned (`const int x`, `int *const p`).
    pub is_const: bool,
    pub node: NodeRef<'t>,
}

/// One field declaration: a shared type and the members it declares.
#[derive(Debug, Clone)]
pub struct FieldGroup<'t> {
    pub decl: NodeRef<'t>,
    pub type_node: NodeRef<'t>,
    pub fields: Vec<FieldDescriptor<'t>>,
}

impl<'t> FieldGroup<'t> {
    /// Source text of the member type, e.g. `int` or `struct Foo`.
    pub fn type_text(&self) -> &'t str {
        self.type_node.text()
    }

    pub fn element_type(&self, resolver: &Resolver<'_, 't>) -> ResolvedType<'t> {
        resolver.resolve_specifier(self.type_node)
    }
}

/// Field declarations of a struct body, in declaration order.
pub fn collect<'t>(body: NodeRef<'t>) -> Vec<FieldGroup<'t>> {
    let mut groups = Vec::new();
    for decl in body.children() {
        if decl.kind() != NodeKind::FieldDeclaration {
            continue;
        }
        let Some(type_node) = decl.child_by_field(Field::Type) else {
            continue;
        };
        let group_const = has_const(decl);
        let fields = decl
            .children_by_field(Field::Declarator)
            .filter_map(|declarator| {
                let name = declarator.declared_identifier()?;
                let kind = DeclaratorKind::classify(declarator)?;
                let pointer_const = unwrap_declarator(declarator).kind()
                    == NodeKind::PointerDeclarator
                    && has_const(unwrap_declarator(declarator));
                Some(FieldDescriptor {
                    name: name.text(),
                    declarator: kind,
                    is_const: group_const || pointer_const,
                    node: declarator,
                })
            })
            .collect();
        groups.push(FieldGroup {
            decl,
            type_node,
            fields,
        });
    }
    groups
}

fn has_const(node: NodeRef<'_>) -> bool {
    node.children()
        .any(|c| c.kind() == NodeKind::TypeQualifier && c.text() == "const")
}
