use crate::tree::{Field, NodeKind, NodeRef, SyntaxTree};

#[derive(Debug, Clone)]
enum Predicate {
    FieldTextEq(Field, String),
    HasField(Field),
    LacksField(Field),
}

/// Structural pattern over nodes of one kind.
///
/// ```
/// use cstruct_syntax::{Field, NodeKind, Query, SyntaxTree};
///
/// let tree = SyntaxTree::parse("typedef struct { int a; } A; struct B { int b; };");
/// let named = Query::new(NodeKind::StructSpecifier).has_field(Field::Name);
/// let hits = tree.query(&named);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].child_by_field(Field::Name).map(|n| n.text()), Some("B"));
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    kind: NodeKind,
    predicates: Vec<Predicate>,
}

impl Query {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            predicates: Vec::new(),
        }
    }

    /// Require the child under `field` to have exactly `text`.
    pub fn field_text_eq(mut self, field: Field, text: impl Into<String>) -> Self {
        self.predicates.push(Predicate::FieldTextEq(field, text.into()));
        self
    }

    pub fn has_field(mut self, field: Field) -> Self {
        self.predicates.push(Predicate::HasField(field));
        self
    }

    pub fn lacks_field(mut self, field: Field) -> Self {
        self.predicates.push(Predicate::LacksField(field));
        self
    }

    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        node.kind() == self.kind
            && self.predicates.iter().all(|p| match p {
                Predicate::FieldTextEq(field, text) => node
                    .children_by_field(*field)
                    .any(|child| child.text() == text.as_str()),
                Predicate::HasField(field) => node.child_by_field(*field).is_some(),
                Predicate::LacksField(field) => node.child_by_field(*field).is_none(),
            })
    }
}

impl SyntaxTree {
    /// All nodes matching `query`, in document order.
    pub fn query(&self, query: &Query) -> Vec<NodeRef<'_>> {
        self.root()
            .descendants()
            .into_iter()
            .filter(|node| query.matches(*node))
            .collect()
    }
}
