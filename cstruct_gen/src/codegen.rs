//! yaml-cpp adapter generation
//!
//! Turns a resolved struct into [`Adapter`]s: one `YAML::convert<T>`
//! specialization per struct, each an ordered list of encode statements and
//! an ordered list of decode statements. Named struct members get their own
//! adapter, emitted before the struct that uses them. Text rendering lives in
//! [`crate::render`].

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::fields::{self, DeclaratorKind, FieldGroup};
use crate::resolver::{ResolvedType, Resolver, StructDef, Unsupported};
use cstruct_syntax::{Field, NodeId, NodeKind};
use std::collections::HashSet;

/// C++ types a member is converted through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    /// Type handed to `as<...>()`.
    pub value_type: String,
    /// Declared enum type when the member is an enum; the value travels as
    /// `int` and is cast back on decode.
    pub enum_type: Option<String>,
}

impl FieldType {
    pub fn plain(value_type: impl Into<String>) -> Self {
        Self {
            value_type: value_type.into(),
            enum_type: None,
        }
    }

    pub fn enumeration(enum_type: impl Into<String>) -> Self {
        Self {
            value_type: "int".to_string(),
            enum_type: Some(enum_type.into()),
        }
    }

    /// Type of the member's storage (pointee / element type).
    pub fn storage_type(&self) -> &str {
        self.enum_type.as_deref().unwrap_or(&self.value_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Scalar,
    Pointer,
    Array { size: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub field: String,
    pub ty: FieldType,
    pub conversion: Conversion,
}

/// `YAML::convert<name>` specialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
    pub name: String,
    pub encode: Vec<Statement>,
    pub decode: Vec<Statement>,
}

impl Adapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encode: Vec::new(),
            decode: Vec::new(),
        }
    }

    /// Whether any encode or decode statement touches `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.encode.iter().chain(&self.decode).any(|s| s.field == field)
    }
}

/// Adapters in dependency order: every adapter follows the adapters of the
/// structs it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    pub adapters: Vec<Adapter>,
}

impl Emission {
    pub fn adapter(&self, name: &str) -> Option<&Adapter> {
        self.adapters.iter().find(|a| a.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name.as_str()).collect()
    }
}

/* Element type of a field group, as far as code generation cares */
enum Element {
    Value(FieldType),
    Skip,
}

pub struct CodeGenerator<'r, 'a, 't> {
    resolver: Resolver<'a, 't>,
    diagnostics: &'r mut Diagnostics,
    emitted_defs: HashSet<NodeId>,
    emitted_names: HashSet<String>,
    adapters: Vec<Adapter>,
}

impl<'r, 'a, 't> CodeGenerator<'r, 'a, 't> {
    pub fn new(resolver: Resolver<'a, 't>, diagnostics: &'r mut Diagnostics) -> Self {
        Self {
            resolver,
            diagnostics,
            emitted_defs: HashSet::new(),
            emitted_names: HashSet::new(),
            adapters: Vec::new(),
        }
    }

    /// Generate adapters for `resolved`, binding the outermost one to
    /// `declared_name` (or the struct tag when absent). `None` when there is
    /// nothing to generate.
    pub fn generate(
        &mut self,
        resolved: &ResolvedType<'t>,
        declared_name: Option<&str>,
    ) -> Option<Emission> {
        let ResolvedType::Struct(def) = resolved else {
            return None;
        };
        let Some(name) = declared_name.or(def.tag()) else {
            self.diagnostics.push(
                DiagnosticKind::AnonymousStruct,
                def.node().text(),
                "Anonymous struct is not allowed",
            );
            return None;
        };
        let name = name.to_string();
        self.emit(*def, &name);
        Some(Emission {
            adapters: std::mem::take(&mut self.adapters),
        })
    }

    fn emit(&mut self, def: StructDef<'t>, name: &str) {
        if self.emitted_defs.contains(&def.id()) || self.emitted_names.contains(name) {
            return;
        }
        self.emitted_defs.insert(def.id());
        self.emitted_names.insert(name.to_string());
        tracing::debug!(adapter = name, "generating adapter");

        let mut adapter = Adapter::new(name);
        if let Some(body) = def.body() {
            for group in fields::collect(body) {
                self.field_group(&group, &mut adapter);
            }
        }
        self.adapters.push(adapter);
    }

    fn field_group(&mut self, group: &FieldGroup<'t>, adapter: &mut Adapter) {
        let ty = match self.element(group) {
            Element::Value(ty) => ty,
            Element::Skip => return,
        };

        for field in &group.fields {
            let conversion = match &field.declarator {
                DeclaratorKind::Scalar => Conversion::Scalar,
                DeclaratorKind::Pointer => Conversion::Pointer,
                DeclaratorKind::Array(size) => Conversion::Array { size: size.clone() },
                DeclaratorKind::Function => {
                    self.diagnostics.push(
                        DiagnosticKind::FunctionField,
                        field.name,
                        format!(
                            "field `{}` is a function declarator, which is not supported",
                            field.name
                        ),
                    );
                    continue;
                }
                DeclaratorKind::Nested(shape) => {
                    self.diagnostics.push(
                        DiagnosticKind::UnsupportedDeclarator,
                        field.name,
                        format!("field `{}` is a {}, which is not supported", field.name, shape),
                    );
                    continue;
                }
            };

            let statement = Statement {
                field: field.name.to_string(),
                ty: ty.clone(),
                conversion,
            };
            if field.is_const {
                self.diagnostics.push(
                    DiagnosticKind::ConstField,
                    field.name,
                    format!("const field `{}` is encoded but not decoded", field.name),
                );
            } else {
                adapter.decode.push(statement.clone());
            }
            adapter.encode.push(statement);
        }
    }

    fn element(&mut self, group: &FieldGroup<'t>) -> Element {
        let type_node = group.type_node;
        let text = group.type_text();
        match type_node.kind() {
            NodeKind::StructSpecifier => {
                let Some(tag) = type_node.child_by_field(Field::Name) else {
                    self.diagnostics.push(
                        DiagnosticKind::AnonymousField,
                        text,
                        format!("Anonymous struct is not supported: {}", text),
                    );
                    return Element::Skip;
                };
                match group.element_type(&self.resolver) {
                    ResolvedType::Struct(def) => self.emit(def, tag.text()),
                    _ => self.diagnostics.push(
                        DiagnosticKind::MissingDefinition,
                        text,
                        format!("No definition found for {}, no adapter is generated for it", text),
                    ),
                }
                Element::Value(FieldType::plain(text))
            }
            NodeKind::UnionSpecifier => {
                self.union_field(text);
                Element::Skip
            }
            NodeKind::EnumSpecifier => Element::Value(FieldType::enumeration(text)),
            NodeKind::TypeIdentifier => match group.element_type(&self.resolver) {
                ResolvedType::Struct(def) => {
                    self.emit(def, text);
                    Element::Value(FieldType::plain(text))
                }
                ResolvedType::Enum => Element::Value(FieldType::enumeration(text)),
                ResolvedType::Unsupported(Unsupported::Union) => {
                    self.union_field(text);
                    Element::Skip
                }
                ResolvedType::Unsupported(Unsupported::Cycle(chain)) => {
                    self.diagnostics.push(
                        DiagnosticKind::RecursiveType,
                        text,
                        format!("Cyclic type definition: {}", chain.join(" -> ")),
                    );
                    Element::Skip
                }
                ResolvedType::Opaque(_) | ResolvedType::Unsupported(_) => {
                    Element::Value(FieldType::plain(text))
                }
            },
            _ => Element::Value(FieldType::plain(text)),
        }
    }

    fn union_field(&mut self, text: &str) {
        self.diagnostics.push(
            DiagnosticKind::UnionField,
            text,
            format!("Union is not supported: {}", text),
        );
    }
}
