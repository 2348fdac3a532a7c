use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::GenError;
use crate::fields;
use crate::resolver::{ResolvedType, Resolver, StructDef, Unsupported};
use cstruct_syntax::{NodeId, NodeKind};
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

/// Ordered field name to type mapping of one struct.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Schema {
    entries: IndexMap<String, SchemaEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SchemaEntry {
    /// Literal source text of the field type.
    Type(String),
    /// Fields of an inline or referenced struct.
    Nested(Schema),
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: SchemaEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Block-style YAML mapping.
    pub fn to_yaml(&self) -> Result<String, GenError> {
        Ok(serde_yml::to_string(self)?)
    }
}

impl SchemaEntry {
    pub fn as_type(&self) -> Option<&str> {
        match self {
            SchemaEntry::Type(ty) => Some(ty),
            SchemaEntry::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Schema> {
        match self {
            SchemaEntry::Type(_) => None,
            SchemaEntry::Nested(schema) => Some(schema),
        }
    }
}

/// Walks a resolved struct and builds its [`Schema`].
pub struct SchemaExtractor<'r, 'a, 't> {
    resolver: Resolver<'a, 't>,
    diagnostics: &'r mut Diagnostics,
    /* Structs currently being expanded; guards self-referencing members */
    active: Vec<NodeId>,
}

impl<'r, 'a, 't> SchemaExtractor<'r, 'a, 't> {
    pub fn new(resolver: Resolver<'a, 't>, diagnostics: &'r mut Diagnostics) -> Self {
        Self {
            resolver,
            diagnostics,
            active: Vec::new(),
        }
    }

    /// Only `Struct` produces a non-empty schema.
    pub fn extract(&mut self, resolved: &ResolvedType<'t>) -> Schema {
        match resolved {
            ResolvedType::Struct(def) => self.struct_schema(*def).unwrap_or_default(),
            _ => Schema::new(),
        }
    }

    /* `None` when `def` is already being expanded further up */
    fn struct_schema(&mut self, def: StructDef<'t>) -> Option<Schema> {
        if self.active.contains(&def.id()) {
            return None;
        }
        let mut schema = Schema::new();
        let Some(body) = def.body() else {
            return Some(schema);
        };
        self.active.push(def.id());

        for group in fields::collect(body) {
            let type_text = group.type_text();
            let placeholder = match group.type_node.kind() {
                NodeKind::StructSpecifier => match group.element_type(&self.resolver) {
                    ResolvedType::Struct(inner) => match self.struct_schema(inner) {
                        Some(nested) => SchemaEntry::Nested(nested),
                        None => {
                            self.diagnostics.push(
                                DiagnosticKind::RecursiveType,
                                type_text,
                                format!("Recursive struct is not expanded: {}", type_text),
                            );
                            SchemaEntry::Type(type_text.to_string())
                        }
                    },
                    _ => {
                        self.diagnostics.push(
                            DiagnosticKind::MissingDefinition,
                            type_text,
                            format!("No definition found for {}", type_text),
                        );
                        SchemaEntry::Nested(Schema::new())
                    }
                },
                NodeKind::UnionSpecifier => {
                    self.union_field(type_text);
                    continue;
                }
                NodeKind::TypeIdentifier => {
                    let resolved = group.element_type(&self.resolver);
                    if resolved == ResolvedType::Unsupported(Unsupported::Union) {
                        self.union_field(type_text);
                        continue;
                    }
                    SchemaEntry::Type(type_text.to_string())
                }
                _ => SchemaEntry::Type(type_text.to_string()),
            };

            for field in &group.fields {
                schema.insert(field.name, placeholder.clone());
            }
        }

        self.active.pop();
        Some(schema)
    }

    fn union_field(&mut self, type_text: &str) {
        self.diagnostics.push(
            DiagnosticKind::UnionField,
            type_text,
            format!("Union is not supported: {}", type_text),
        );
    }
}
