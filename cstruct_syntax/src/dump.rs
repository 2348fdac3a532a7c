use crate::tree::{NodeRef, SyntaxTree};
use std::fmt;

const INDENT: &str = "    ";

/// Indented, human readable rendering of a tree.
///
/// Each node prints as `<kind>` on its own line, leaves add ` text="..."`,
/// and a child reached through a named field is preceded by a `field:` line.
pub struct TreeDump<'t> {
    root: NodeRef<'t>,
}

impl<'t> TreeDump<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self { root: tree.root() }
    }

    pub fn from_node(root: NodeRef<'t>) -> Self {
        Self { root }
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: NodeRef<'_>, depth: usize) -> fmt::Result {
    let indent = INDENT.repeat(depth);
    if node.is_leaf() {
        writeln!(f, "{}<{} text={:?}>", indent, node.kind(), node.text())?;
        return Ok(());
    }
    writeln!(f, "{}<{}>", indent, node.kind())?;
    for (field, child) in node.children_with_fields() {
        if let Some(field) = field {
            writeln!(f, "{}  {}:", indent, field)?;
        }
        write_node(f, child, depth + 1)?;
    }
    Ok(())
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self.root, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_layout() {
        let tree = SyntaxTree::parse("int a;");
        let dump = TreeDump::new(&tree).to_string();
        let expected = "\
<translation_unit>
    <declaration>
      type:
        <primitive_type text=\"int\">
      declarator:
        <identifier text=\"a\">
";
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_dump_from_subtree() {
        let tree = SyntaxTree::parse("struct S { char c; };");
        let decl = tree.root().children().next().expect("declaration");
        let dump = TreeDump::from_node(decl).to_string();
        assert!(dump.starts_with("<declaration>\n"));
        assert!(dump.contains("<field_identifier text=\"c\">"));
        assert!(dump.contains("name:"));
    }
}
