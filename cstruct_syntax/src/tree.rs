use crate::error::ParseError;
use std::fmt;

/// Byte range into the merged source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Every node kind the parser produces. Names follow the usual C grammar
/// production names so tree dumps read like any other C syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    TranslationUnit,
    PreprocDirective,
    TypeDefinition,
    Declaration,
    FunctionDefinition,
    StructSpecifier,
    UnionSpecifier,
    EnumSpecifier,
    FieldDeclarationList,
    FieldDeclaration,
    EnumeratorList,
    Enumerator,
    PrimitiveType,
    SizedTypeSpecifier,
    TypeIdentifier,
    FieldIdentifier,
    Identifier,
    NumberLiteral,
    Expression,
    TypeQualifier,
    StorageClassSpecifier,
    AttributeSpecifier,
    AttributeDeclaration,
    PointerDeclarator,
    ArrayDeclarator,
    FunctionDeclarator,
    ParenthesizedDeclarator,
    AttributedDeclarator,
    ParameterList,
    BitfieldClause,
    InitDeclarator,
    Initializer,
    CompoundStatement,
    Error,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translation_unit",
            NodeKind::PreprocDirective => "preproc_directive",
            NodeKind::TypeDefinition => "type_definition",
            NodeKind::Declaration => "declaration",
            NodeKind::FunctionDefinition => "function_definition",
            NodeKind::StructSpecifier => "struct_specifier",
            NodeKind::UnionSpecifier => "union_specifier",
            NodeKind::EnumSpecifier => "enum_specifier",
            NodeKind::FieldDeclarationList => "field_declaration_list",
            NodeKind::FieldDeclaration => "field_declaration",
            NodeKind::EnumeratorList => "enumerator_list",
            NodeKind::Enumerator => "enumerator",
            NodeKind::PrimitiveType => "primitive_type",
            NodeKind::SizedTypeSpecifier => "sized_type_specifier",
            NodeKind::TypeIdentifier => "type_identifier",
            NodeKind::FieldIdentifier => "field_identifier",
            NodeKind::Identifier => "identifier",
            NodeKind::NumberLiteral => "number_literal",
            NodeKind::Expression => "expression",
            NodeKind::TypeQualifier => "type_qualifier",
            NodeKind::StorageClassSpecifier => "storage_class_specifier",
            NodeKind::AttributeSpecifier => "attribute_specifier",
            NodeKind::AttributeDeclaration => "attribute_declaration",
            NodeKind::PointerDeclarator => "pointer_declarator",
            NodeKind::ArrayDeclarator => "array_declarator",
            NodeKind::FunctionDeclarator => "function_declarator",
            NodeKind::ParenthesizedDeclarator => "parenthesized_declarator",
            NodeKind::AttributedDeclarator => "attributed_declarator",
            NodeKind::ParameterList => "parameter_list",
            NodeKind::BitfieldClause => "bitfield_clause",
            NodeKind::InitDeclarator => "init_declarator",
            NodeKind::Initializer => "initializer",
            NodeKind::CompoundStatement => "compound_statement",
            NodeKind::Error => "ERROR",
        }
    }

    /// Identifier-like leaves that name a declared entity.
    pub fn is_name(self) -> bool {
        matches!(
            self,
            NodeKind::Identifier | NodeKind::FieldIdentifier | NodeKind::TypeIdentifier
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field names attached to child edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Type,
    Declarator,
    Name,
    Body,
    Size,
    Parameters,
    Value,
    Underlying,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Type => "type",
            Field::Declarator => "declarator",
            Field::Name => "name",
            Field::Body => "body",
            Field::Size => "size",
            Field::Parameters => "parameters",
            Field::Value => "value",
            Field::Underlying => "underlying_type",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

pub(crate) type Children = Vec<(Option<Field>, NodeId)>;

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    kind: NodeKind,
    span: Span,
    children: Children,
}

/// Arena the parser appends to. Children always precede their parent.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub(crate) fn push(&mut self, kind: NodeKind, span: Span, children: Children) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            span,
            children,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    pub(crate) fn finish(
        self,
        source: String,
        root: NodeId,
        errors: Vec<ParseError>,
    ) -> SyntaxTree {
        SyntaxTree {
            source,
            nodes: self.nodes,
            root,
            errors,
        }
    }
}

/// Immutable syntax tree over the merged input.
#[derive(Debug)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
    errors: Vec<ParseError>,
}

impl SyntaxTree {
    /// Parse `source` into a tree. Never fails; see [`SyntaxTree::errors`].
    pub fn parse(source: impl Into<String>) -> Self {
        crate::parser::parse(source.into())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Cheap handle to a node inside a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn text(&self) -> &'t str {
        let span = self.data().span;
        &self.tree.source[span.start..span.end]
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.data().children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |(_, id)| NodeRef { tree, id: *id })
    }

    pub fn children_with_fields(&self) -> impl Iterator<Item = (Option<Field>, NodeRef<'t>)> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |(field, id)| (*field, NodeRef { tree, id: *id }))
    }

    pub fn children_by_field(&self, field: Field) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.children_with_fields()
            .filter(move |(f, _)| *f == Some(field))
            .map(|(_, node)| node)
    }

    pub fn child_by_field(&self, field: Field) -> Option<NodeRef<'t>> {
        self.children_by_field(field).next()
    }

    pub fn field_name_for_child(&self, index: usize) -> Option<Field> {
        self.data().children.get(index).and_then(|(field, _)| *field)
    }

    /// Pre-order walk starting at (and including) this node.
    pub fn descendants(&self) -> Vec<NodeRef<'t>> {
        let mut out = Vec::new();
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children: Vec<NodeRef<'t>> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Identifier introduced by a declarator, looking through pointer, array,
    /// function, parenthesized and attributed wrappers.
    pub fn declared_identifier(&self) -> Option<NodeRef<'t>> {
        let mut node = *self;
        loop {
            match node.kind() {
                kind if kind.is_name() => return Some(node),
                NodeKind::PointerDeclarator
                | NodeKind::ArrayDeclarator
                | NodeKind::FunctionDeclarator
                | NodeKind::InitDeclarator => node = node.child_by_field(Field::Declarator)?,
                NodeKind::ParenthesizedDeclarator | NodeKind::AttributedDeclarator => {
                    node = node.children().next()?
                }
                _ => return None,
            }
        }
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        write!(f, "{}@{}..{}", self.kind(), span.start, span.end)
    }
}
