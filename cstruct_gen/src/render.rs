/* yaml-cpp text rendering of generated adapters */

use crate::codegen::{Adapter, Conversion, Emission, Statement};
use std::fmt;

const BODY_INDENT: &str = "    ";

impl Statement {
    fn node_var(&self) -> String {
        format!("node[\"{}\"]", self.field)
    }

    /* Expression converting a stored member value into something a Node accepts */
    fn encoded(&self, value: &str) -> String {
        match &self.ty.enum_type {
            Some(_) => format!("static_cast<{}>({})", self.ty.value_type, value),
            None => value.to_string(),
        }
    }

    /* Expression converting a value read as `value_type` back to the storage type */
    fn decoded(&self, value: &str) -> String {
        match &self.ty.enum_type {
            Some(enum_type) => format!("static_cast<{}>({})", enum_type, value),
            None => value.to_string(),
        }
    }

    pub fn encode_lines(&self) -> Vec<String> {
        let node_var = self.node_var();
        let field = &self.field;
        match &self.conversion {
            Conversion::Scalar => {
                vec![format!("{} = {};", node_var, self.encoded(&format!("rhs.{}", field)))]
            }
            Conversion::Pointer => vec![format!(
                "if (rhs.{}) {} = {};",
                field,
                node_var,
                self.encoded(&format!("*(rhs.{})", field))
            )],
            Conversion::Array { size } => vec![format!(
                "for (std::size_t i = 0; i < (std::size_t)({}); i++) {}.push_back({});",
                size,
                node_var,
                self.encoded(&format!("rhs.{}[i]", field))
            )],
        }
    }

    pub fn decode_lines(&self) -> Vec<String> {
        let node_var = self.node_var();
        let field = &self.field;
        let value_type = &self.ty.value_type;
        let read = self.decoded(&format!("{}.as<{}>()", node_var, value_type));
        match &self.conversion {
            Conversion::Scalar => vec![format!("if ({}) rhs.{} = {};", node_var, field, read)],
            Conversion::Pointer => {
                let storage = self.ty.storage_type();
                vec![
                    format!("if ({})", node_var),
                    "{".to_string(),
                    format!(
                        "{}rhs.{} = ({}*)malloc(sizeof({}));",
                        BODY_INDENT, field, storage, storage
                    ),
                    format!("{}*(rhs.{}) = {};", BODY_INDENT, field, read),
                    "}".to_string(),
                ]
            }
            Conversion::Array { size } => vec![
                format!("if ({})", node_var),
                "{".to_string(),
                format!(
                    "{}auto vec = {}.as<std::vector<{}>>();",
                    BODY_INDENT, node_var, value_type
                ),
                format!("{}std::size_t asize = (std::size_t)({});", BODY_INDENT, size),
                format!("{}std::size_t csize = std::min(asize, vec.size());", BODY_INDENT),
                format!(
                    "{}for (std::size_t i = 0; i < csize; i++) rhs.{}[i] = {};",
                    BODY_INDENT,
                    field,
                    self.decoded("vec[i]")
                ),
                "}".to_string(),
            ],
        }
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;
        writeln!(f, "template<>")?;
        writeln!(f, "struct convert<{}>", name)?;
        writeln!(f, "{{")?;
        writeln!(f, "  static Node encode(const {}& rhs)", name)?;
        writeln!(f, "  {{")?;
        writeln!(f, "{}Node node;", BODY_INDENT)?;
        for line in self.encode.iter().flat_map(Statement::encode_lines) {
            writeln!(f, "{}{}", BODY_INDENT, line)?;
        }
        writeln!(f, "{}return node;", BODY_INDENT)?;
        writeln!(f, "  }}")?;
        writeln!(f, "  static bool decode(const Node& node, {}& rhs)", name)?;
        writeln!(f, "  {{")?;
        for line in self.decode.iter().flat_map(Statement::decode_lines) {
            writeln!(f, "{}{}", BODY_INDENT, line)?;
        }
        writeln!(f, "{}return true;", BODY_INDENT)?;
        writeln!(f, "  }}")?;
        write!(f, "}};")
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for adapter in &self.adapters {
            writeln!(f, "{}", adapter)?;
        }
        Ok(())
    }
}
