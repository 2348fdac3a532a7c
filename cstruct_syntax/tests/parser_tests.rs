/* Parser Tests
 *
 * Parse realistic C translation units and check the declaration shapes the
 * generators depend on: struct bodies, typedef aliases, nested anonymous
 * structs, enums, initialized declarations and opaque function bodies.
 */

use cstruct_syntax::{merge_sources, Field, NodeKind, NodeRef, Query, SyntaxTree, TreeDump};

const FIRST_UNIT: &str = r#"#include <stdio.h>

struct SingleMember {
    int value;
};

struct MultiMember {
    int a;
    float b;
    char c, d;
};

struct {
    int x;
    float y;
} anonymous_struct;

struct NestedAnonymousStruct {
    int outer;
    struct {
        int inner;
    } nested;
};

typedef struct {
    int id;
    char name[20];
} TypedefStruct;

struct IncompleteInitialization {
    int p;
    float q;
    char r;
} incompleteInit = {10};

int main()
{
    return 0;
}
"#;

const SECOND_UNIT: &str = r#"struct NestedStructWithInit {
    int a;
    struct {
        int inner;
    } d;
} nested_struct_with_init = {
    .a = 1,
    .d.innner = 1
};

enum enum_example {
    ENUM_1 = 0,
    ENUM_2,
};
typedef enum enum_example enum_example_e;

struct EveryingStruct {
    int a;
    int b, c, d;
    int *e;
    const int f;
    int g[20];
    enum enum_example e1;
    enum_example_e e2;
    struct {
        int na;
        struct {
            int nna;
        } nn1;
    } n2;
} everying_struct = {

};"#;

/* Helper to find the struct specifier with a body for `tag` */
fn struct_named<'t>(tree: &'t SyntaxTree, tag: &str) -> NodeRef<'t> {
    let q = Query::new(NodeKind::StructSpecifier)
        .field_text_eq(Field::Name, tag)
        .has_field(Field::Body);
    let hits = tree.query(&q);
    assert_eq!(hits.len(), 1, "expected one definition of {}", tag);
    hits[0]
}

/* Helper listing the declared names of every field in a struct body */
fn field_names<'t>(spec: NodeRef<'t>) -> Vec<&'t str> {
    let body = spec.child_by_field(Field::Body).expect("struct body");
    body.children()
        .filter(|c| c.kind() == NodeKind::FieldDeclaration)
        .flat_map(|f| f.children_by_field(Field::Declarator).collect::<Vec<_>>())
        .filter_map(|d| d.declared_identifier())
        .map(|n| n.text())
        .collect()
}

#[test]
fn test_first_unit_parses_cleanly() {
    let tree = SyntaxTree::parse(FIRST_UNIT);
    assert!(!tree.has_errors(), "{:?}", tree.errors());

    let kinds: Vec<NodeKind> = tree.root().children().map(|c| c.kind()).collect();
    assert_eq!(kinds.first(), Some(&NodeKind::PreprocDirective));
    assert_eq!(kinds.last(), Some(&NodeKind::FunctionDefinition));
    assert_eq!(
        kinds.iter().filter(|k| **k == NodeKind::TypeDefinition).count(),
        1
    );
}

#[test]
fn test_multi_declarator_fields() {
    let tree = SyntaxTree::parse(FIRST_UNIT);
    let spec = struct_named(&tree, "MultiMember");
    assert_eq!(field_names(spec), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_nested_anonymous_struct_field() {
    let tree = SyntaxTree::parse(FIRST_UNIT);
    let spec = struct_named(&tree, "NestedAnonymousStruct");
    let body = spec.child_by_field(Field::Body).expect("body");
    let nested = body.children().nth(1).expect("second field");
    let ty = nested.child_by_field(Field::Type).expect("type");
    assert_eq!(ty.kind(), NodeKind::StructSpecifier);
    assert!(ty.child_by_field(Field::Name).is_none());
    assert_eq!(field_names(ty), vec!["inner"]);
    assert_eq!(field_names(spec), vec!["outer", "nested"]);
}

#[test]
fn test_typedef_alias_of_anonymous_struct() {
    let tree = SyntaxTree::parse(FIRST_UNIT);
    let q = Query::new(NodeKind::TypeDefinition).field_text_eq(Field::Declarator, "TypedefStruct");
    let hits = tree.query(&q);
    assert_eq!(hits.len(), 1);
    let spec = hits[0].child_by_field(Field::Type).expect("type");
    assert_eq!(field_names(spec), vec!["id", "name"]);
}

#[test]
fn test_initialized_struct_declarations() {
    let tree = SyntaxTree::parse(SECOND_UNIT);
    assert!(!tree.has_errors(), "{:?}", tree.errors());

    let spec = struct_named(&tree, "NestedStructWithInit");
    let decl = tree
        .root()
        .children()
        .find(|c| c.child_by_field(Field::Type) == Some(spec))
        .expect("declaration");
    let init = decl.child_by_field(Field::Declarator).expect("declarator");
    assert_eq!(init.kind(), NodeKind::InitDeclarator);
    assert_eq!(init.declared_identifier().map(|n| n.text()), Some("nested_struct_with_init"));
}

#[test]
fn test_everything_struct_field_shapes() {
    let tree = SyntaxTree::parse(SECOND_UNIT);
    let spec = struct_named(&tree, "EveryingStruct");
    assert_eq!(
        field_names(spec),
        vec!["a", "b", "c", "d", "e", "f", "g", "e1", "e2", "n2"]
    );

    let body = spec.child_by_field(Field::Body).expect("body");
    let types: Vec<NodeKind> = body
        .children()
        .filter_map(|f| f.child_by_field(Field::Type))
        .map(|t| t.kind())
        .collect();
    assert_eq!(
        types,
        vec![
            NodeKind::PrimitiveType,
            NodeKind::PrimitiveType,
            NodeKind::PrimitiveType,
            NodeKind::PrimitiveType,
            NodeKind::PrimitiveType,
            NodeKind::EnumSpecifier,
            NodeKind::TypeIdentifier,
            NodeKind::StructSpecifier,
        ]
    );
}

#[test]
fn test_enum_typedef() {
    let tree = SyntaxTree::parse(SECOND_UNIT);
    let q = Query::new(NodeKind::TypeDefinition).field_text_eq(Field::Declarator, "enum_example_e");
    let hits = tree.query(&q);
    assert_eq!(hits.len(), 1);
    let ty = hits[0].child_by_field(Field::Type).expect("type");
    assert_eq!(ty.kind(), NodeKind::EnumSpecifier);
    assert!(ty.child_by_field(Field::Body).is_none());
    assert_eq!(ty.child_by_field(Field::Name).map(|n| n.text()), Some("enum_example"));
}

#[test]
fn test_merged_units_share_one_tree() {
    let merged = merge_sources([FIRST_UNIT, SECOND_UNIT]);
    let tree = SyntaxTree::parse(merged);
    assert!(!tree.has_errors(), "{:?}", tree.errors());
    struct_named(&tree, "SingleMember");
    struct_named(&tree, "EveryingStruct");
}

#[test]
fn test_dump_mentions_every_field_name() {
    let tree = SyntaxTree::parse(SECOND_UNIT);
    let dump = TreeDump::new(&tree).to_string();
    assert!(dump.starts_with("<translation_unit>\n"));
    for name in ["nn1", "e2", "g"] {
        assert!(
            dump.contains(&format!("<field_identifier text=\"{}\">", name)),
            "missing {}",
            name
        );
    }
}

#[test]
fn test_broken_declaration_does_not_hide_later_structs() {
    let src = "struct Broken { int a; float };\nstruct Fine { int ok; };";
    let tree = SyntaxTree::parse(src);
    assert!(tree.has_errors());
    let spec = struct_named(&tree, "Fine");
    assert_eq!(field_names(spec), vec!["ok"]);
}
