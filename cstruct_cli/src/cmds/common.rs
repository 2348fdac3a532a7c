/* Input loading and error reporting shared by the output modes */

use anyhow::Context;
use cstruct_gen::{Diagnostics, GenError};
use cstruct_syntax::{merge_sources, SyntaxTree};
use std::path::PathBuf;

/* Read every input as bytes (lossy UTF-8) and join them with newlines */
pub fn load_sources(paths: &[PathBuf]) -> anyhow::Result<String> {
  let mut parts = Vec::with_capacity(paths.len());
  for path in paths {
    let bytes = std::fs::read(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded input");
    parts.push(String::from_utf8_lossy(&bytes).into_owned());
  }
  Ok(merge_sources(parts))
}

/* Load and parse; syntax errors are logged, never fatal */
pub fn parse_inputs(paths: &[PathBuf]) -> anyhow::Result<SyntaxTree> {
  let source = load_sources(paths)?;
  let tree = SyntaxTree::parse(source);
  for err in tree.errors() {
    tracing::warn!("syntax error at {}", err);
  }
  tracing::info!(inputs = paths.len(), errors = tree.errors().len(), "parsed translation unit");
  Ok(tree)
}

pub fn require_identifier(identifier: Option<&str>) -> Option<&str> {
  if identifier.is_none() {
    eprintln!("[✗] identifier cannot be None");
  }
  identifier
}

/* Identifier errors become an exit status; anything else propagates */
pub fn identifier_failure(err: GenError) -> anyhow::Result<i32> {
  match err {
    GenError::UnparseableIdentifier(_)
    | GenError::UnknownSpecifier { .. }
    | GenError::CyclicType(_) => {
      eprintln!("[✗] {}", err);
      Ok(super::EXIT_BAD_IDENTIFIER)
    }
    other => Err(other.into()),
  }
}

pub fn summarize(diagnostics: &Diagnostics) {
  if !diagnostics.is_empty() {
    tracing::info!(count = diagnostics.len(), "finished with diagnostics");
  }
}
