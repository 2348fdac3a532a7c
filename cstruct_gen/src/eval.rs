//! Reference interpreter for generated adapters
//!
//! Executes an [`Adapter`]'s statement lists against an in-memory [`Record`]
//! standing in for a C struct instance, and a `serde_yml::Value` standing in
//! for a yaml-cpp `Node`. The semantics follow the rendered C++, with one
//! exception: array bounds are only evaluated when they are integer literals
//! (decimal or hex, optionally parenthesized or with a `u`/`l` suffix). Any
//! other bound, such as `N + 1` or a macro name, falls back to the length of
//! the record's slot.

use crate::codegen::{Adapter, Conversion, Statement};
use crate::error::EvalError;
use indexmap::IndexMap;
use serde_yml::{Mapping, Value};

/// One struct member.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Value(Value),
    /// `None` is a null pointer.
    Pointer(Option<Value>),
    /// Fixed-size array; its length is the declared size.
    Array(Vec<Value>),
}

impl Slot {
    fn kind_name(&self) -> &'static str {
        match self {
            Slot::Value(_) => "value",
            Slot::Pointer(_) => "pointer",
            Slot::Array(_) => "array",
        }
    }
}

/// Member name to slot, standing in for a struct instance.
pub type Record = IndexMap<String, Slot>;

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/* Evaluate an array bound; falls back to `len` when it is not an integer literal */
fn array_bound(size: &str, len: usize) -> usize {
    let text = size
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .trim_end_matches(['u', 'U', 'l', 'L']);
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => text.parse::<usize>().ok(),
    };
    parsed.unwrap_or(len)
}

fn mismatch(stmt: &Statement, expected: &'static str, found: &'static str) -> EvalError {
    EvalError::TypeMismatch {
        field: stmt.field.clone(),
        expected,
        found,
    }
}

/// Run the encode statements: build the document for `record`.
///
/// Array statements write `min(bound, slot length)` elements, where a bound
/// that is not an integer literal counts as the slot length.
pub fn encode(adapter: &Adapter, record: &Record) -> Result<Value, EvalError> {
    let mut node = Mapping::new();
    for stmt in &adapter.encode {
        let slot = record
            .get(&stmt.field)
            .ok_or_else(|| EvalError::MissingSlot(stmt.field.clone()))?;
        let key = Value::String(stmt.field.clone());
        match (&stmt.conversion, slot) {
            (Conversion::Scalar, Slot::Value(value)) => {
                node.insert(key, value.clone());
            }
            (Conversion::Pointer, Slot::Pointer(target)) => {
                if let Some(value) = target {
                    node.insert(key, value.clone());
                }
            }
            (Conversion::Array { size }, Slot::Array(items)) => {
                let count = array_bound(size, items.len()).min(items.len());
                let seq = items.iter().take(count).cloned().collect();
                node.insert(key, Value::Sequence(seq));
            }
            (Conversion::Scalar, other) => return Err(mismatch(stmt, "value", other.kind_name())),
            (Conversion::Pointer, other) => {
                return Err(mismatch(stmt, "pointer", other.kind_name()))
            }
            (Conversion::Array { .. }, other) => {
                return Err(mismatch(stmt, "array", other.kind_name()))
            }
        }
    }
    Ok(Value::Mapping(node))
}

/// Run the decode statements: update `record` from `node`. Members whose key
/// is absent are left untouched.
///
/// Array statements copy `min(bound, slot length, sequence length)`
/// elements; a bound that is not an integer literal counts as the slot
/// length.
pub fn decode(adapter: &Adapter, node: &Value, record: &mut Record) -> Result<(), EvalError> {
    for stmt in &adapter.decode {
        let Some(value) = node.get(stmt.field.as_str()) else {
            continue;
        };
        match &stmt.conversion {
            Conversion::Scalar => {
                record.insert(stmt.field.clone(), Slot::Value(value.clone()));
            }
            Conversion::Pointer => {
                record.insert(stmt.field.clone(), Slot::Pointer(Some(value.clone())));
            }
            Conversion::Array { size } => {
                let Value::Sequence(seq) = value else {
                    return Err(mismatch(stmt, "sequence", value_kind(value)));
                };
                let slots = match record.get_mut(&stmt.field) {
                    Some(Slot::Array(slots)) => slots,
                    Some(other) => return Err(mismatch(stmt, "array", other.kind_name())),
                    None => return Err(EvalError::MissingSlot(stmt.field.clone())),
                };
                let asize = array_bound(size, slots.len()).min(slots.len());
                let csize = asize.min(seq.len());
                for (slot, item) in slots.iter_mut().zip(seq.iter()).take(csize) {
                    *slot = item.clone();
                }
            }
        }
    }
    Ok(())
}
