/* Adapter Generation Tests
 *
 * Statement lists are checked structurally and, for arrays and pointers, by
 * running them through the reference evaluator against YAML documents.
 */

use cstruct_gen::codegen::{Conversion, FieldType};
use cstruct_gen::eval::{self, Record, Slot};
use cstruct_gen::{Adapter, DiagnosticKind, Emission, Session};
use cstruct_syntax::SyntaxTree;
use serde_yml::Value;

/* Helper generating adapters and diagnostic kinds for `identifier` */
fn adapters_of(src: &str, identifier: &str) -> (Option<Emission>, Vec<DiagnosticKind>) {
    let tree = SyntaxTree::parse(src);
    let session = Session::new(&tree);
    let generated = session.adapters(identifier).expect("adapters");
    let kinds = generated.diagnostics.iter().map(|d| d.kind).collect();
    (generated.output, kinds)
}

fn single_adapter(src: &str, identifier: &str) -> Adapter {
    let (emission, _) = adapters_of(src, identifier);
    let emission = emission.expect("emission");
    emission.adapters.last().cloned().expect("adapter")
}

fn yaml(text: &str) -> Value {
    serde_yml::from_str(text).expect("valid yaml")
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Number((*v).into())).collect()
}

#[test]
fn test_array_decode_copies_at_most_declared_size() {
    let adapter = single_adapter("struct A { int arr[4]; };", "A");

    let mut record = Record::new();
    record.insert("arr".into(), Slot::Array(ints(&[9, 9, 9, 9])));
    eval::decode(&adapter, &yaml("arr: [1, 2]"), &mut record).expect("decode");
    assert_eq!(record["arr"], Slot::Array(ints(&[1, 2, 9, 9])));

    let mut record = Record::new();
    record.insert("arr".into(), Slot::Array(ints(&[0, 0, 0, 0])));
    eval::decode(&adapter, &yaml("arr: [1, 2, 3, 4, 5, 6]"), &mut record).expect("decode");
    assert_eq!(record["arr"], Slot::Array(ints(&[1, 2, 3, 4])));
}

#[test]
fn test_array_bounded_copy_in_rendered_text() {
    let adapter = single_adapter("struct A { int arr[4]; };", "A");
    let text = adapter.to_string();
    assert!(text.contains("std::size_t asize = (std::size_t)(4);"));
    assert!(text.contains("std::size_t csize = std::min(asize, vec.size());"));
    assert!(text.contains("for (std::size_t i = 0; i < csize; i++) rhs.arr[i] = vec[i];"));
    assert!(text.contains(
        "for (std::size_t i = 0; i < (std::size_t)(4); i++) node[\"arr\"].push_back(rhs.arr[i]);"
    ));

    let mut record = Record::new();
    record.insert("arr".into(), Slot::Array(ints(&[0, 0, 0, 0])));
    eval::decode(&adapter, &yaml("arr: [1, 2, 3, 4, 5, 6]"), &mut record).expect("decode");
    assert_eq!(record["arr"], Slot::Array(ints(&[1, 2, 3, 4])));
}

#[test]
fn test_pointer_guards_in_rendered_text() {
    let adapter = single_adapter("struct P { int *p; };", "P");
    let text = adapter.to_string();
    assert!(text.contains("if (rhs.p) node[\"p\"] = *(rhs.p);"));
    assert!(text.contains("if (node[\"p\"])\n    {\n        rhs.p = (int*)malloc(sizeof(int));"));

    let mut record = Record::new();
    record.insert("p".into(), Slot::Pointer(None));
    assert_eq!(eval::encode(&adapter, &record).expect("encode"), yaml("{}"));
}

#[test]
fn test_array_encode_writes_declared_size() {
    let adapter = single_adapter("struct A { int arr[4]; };", "A");
    let mut record = Record::new();
    record.insert("arr".into(), Slot::Array(ints(&[5, 6, 7, 8])));
    let node = eval::encode(&adapter, &record).expect("encode");
    assert_eq!(node, yaml("arr: [5, 6, 7, 8]"));
}

#[test]
fn test_pointer_encode_and_decode() {
    let adapter = single_adapter("struct P { int *p; };", "P");

    let mut record = Record::new();
    record.insert("p".into(), Slot::Pointer(None));
    let node = eval::encode(&adapter, &record).expect("encode");
    assert_eq!(node, yaml("{}"));

    record.insert("p".into(), Slot::Pointer(Some(Value::Number(7.into()))));
    let node = eval::encode(&adapter, &record).expect("encode");
    assert_eq!(node, yaml("p: 7"));

    let before = record.clone();
    eval::decode(&adapter, &yaml("other: 1"), &mut record).expect("decode");
    assert_eq!(record, before);

    let mut record = Record::new();
    record.insert("p".into(), Slot::Pointer(None));
    eval::decode(&adapter, &yaml("p: 3"), &mut record).expect("decode");
    assert_eq!(record["p"], Slot::Pointer(Some(Value::Number(3.into()))));
}

#[test]
fn test_scalar_round_trip_through_document() {
    let adapter = single_adapter("struct S { int x; float y; };", "S");
    let mut record = Record::new();
    record.insert("x".into(), Slot::Value(Value::Number(1.into())));
    record.insert("y".into(), Slot::Value(yaml("2.5")));
    let node = eval::encode(&adapter, &record).expect("encode");

    let mut decoded = Record::new();
    eval::decode(&adapter, &node, &mut decoded).expect("decode");
    assert_eq!(decoded, record);
}

#[test]
fn test_empty_struct_has_empty_bodies() {
    let adapter = single_adapter("struct Empty {};", "Empty");
    assert!(adapter.encode.is_empty());
    assert!(adapter.decode.is_empty());
    let text = adapter.to_string();
    assert!(text.starts_with("template<>\nstruct convert<Empty>\n{"));
    assert!(text.ends_with("return true;\n  }\n};"));
}

#[test]
fn test_union_field_has_one_diagnostic_and_no_statements() {
    let src = "struct U { int a; union { int i; float f; } u; int b; };";
    let (emission, diags) = adapters_of(src, "U");
    let adapter = emission.expect("emission").adapters.pop().expect("adapter");
    assert!(!adapter.mentions("u"));
    assert_eq!(diags, vec![DiagnosticKind::UnionField]);
    assert_eq!(adapter.encode.len(), 2);
}

#[test]
fn test_point_end_to_end() {
    let src = "typedef struct { int x; char name[8]; struct { int y; } *inner; } Point;";
    let (emission, diags) = adapters_of(src, "Point");
    let emission = emission.expect("emission");
    assert_eq!(emission.names(), vec!["Point"]);
    assert_eq!(diags, vec![DiagnosticKind::AnonymousField]);

    let adapter = &emission.adapters[0];
    let conversions: Vec<(&str, &Conversion)> = adapter
        .encode
        .iter()
        .map(|s| (s.field.as_str(), &s.conversion))
        .collect();
    assert_eq!(
        conversions,
        vec![
            ("x", &Conversion::Scalar),
            ("name", &Conversion::Array { size: "8".into() }),
        ]
    );
    assert!(!adapter.mentions("inner"));
}

#[test]
fn test_nested_adapters_come_first() {
    let src = r#"
struct SingleMember {
    int value;
};

struct NestedStruct {
    int outer;
    struct SingleMember nested;
};

struct Top {
    struct NestedStruct n;
    struct SingleMember s;
};
"#;
    let (emission, diags) = adapters_of(src, "Top");
    assert!(diags.is_empty());
    let emission = emission.expect("emission");
    assert_eq!(emission.names(), vec!["SingleMember", "NestedStruct", "Top"]);

    let text = emission.to_string();
    let single = text.find("struct convert<SingleMember>").expect("SingleMember");
    let nested = text.find("struct convert<NestedStruct>").expect("NestedStruct");
    assert!(single < nested);
    assert_eq!(text.matches("struct convert<SingleMember>").count(), 1);
}

#[test]
fn test_enum_fields_use_int_with_casts() {
    let src = r#"
enum enum_example { ENUM_1 = 0, ENUM_2 };
typedef enum enum_example enum_example_e;
struct StructEnum {
    enum enum_example e1;
    enum_example_e e2;
};
"#;
    let adapter = single_adapter(src, "StructEnum");
    assert_eq!(adapter.decode[0].ty, FieldType::enumeration("enum enum_example"));
    let text = adapter.to_string();
    assert!(text.contains("node[\"e1\"] = static_cast<int>(rhs.e1);"));
    assert!(text.contains(
        "if (node[\"e2\"]) rhs.e2 = static_cast<enum_example_e>(node[\"e2\"].as<int>());"
    ));
}

#[test]
fn test_unsupported_declarators_are_skipped() {
    let src = "struct F { int (*cb)(int); int **pp; int grid[2][2]; int ok; };";
    let (emission, diags) = adapters_of(src, "F");
    let adapter = emission.expect("emission").adapters.pop().expect("adapter");
    assert_eq!(
        adapter.encode.iter().map(|s| s.field.as_str()).collect::<Vec<_>>(),
        vec!["ok"]
    );
    assert_eq!(
        diags,
        vec![
            DiagnosticKind::FunctionField,
            DiagnosticKind::UnsupportedDeclarator,
            DiagnosticKind::UnsupportedDeclarator,
        ]
    );
}

#[test]
fn test_const_field_is_encode_only() {
    let adapter = single_adapter("struct C { const int f; int g; };", "C");
    assert!(adapter.encode.iter().any(|s| s.field == "f"));
    assert!(adapter.decode.iter().all(|s| s.field != "f"));
}

#[test]
fn test_anonymous_struct_member_is_skipped() {
    let src = "struct Outer { int outerValue; struct { int innerValue; } anonymousInner; };";
    let (emission, diags) = adapters_of(src, "Outer");
    let adapter = emission.expect("emission").adapters.pop().expect("adapter");
    assert!(!adapter.mentions("anonymousInner"));
    assert_eq!(diags, vec![DiagnosticKind::AnonymousField]);
}

#[test]
fn test_typedef_name_binds_outer_adapter() {
    let src = "typedef struct Inner { int v; } Inner_t;";
    let (emission, _) = adapters_of(src, "Inner_t");
    assert_eq!(emission.expect("emission").names(), vec!["Inner_t"]);

    let (emission, _) = adapters_of(src, "struct Inner");
    assert_eq!(emission.expect("emission").names(), vec!["Inner"]);
}

#[test]
fn test_non_struct_identifier_generates_nothing() {
    let (emission, diags) = adapters_of("typedef int Handle;", "Handle");
    assert!(emission.is_none());
    assert_eq!(diags, vec![DiagnosticKind::UnresolvedIdentifier]);
}
