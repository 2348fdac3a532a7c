use super::{common, EXIT_BAD_IDENTIFIER};
use cstruct_gen::Session;
use std::path::PathBuf;

pub fn run(inputs: &[PathBuf], identifier: Option<&str>) -> anyhow::Result<i32> {
  let Some(identifier) = common::require_identifier(identifier) else {
    return Ok(EXIT_BAD_IDENTIFIER);
  };
  let tree = common::parse_inputs(inputs)?;
  let session = Session::new(&tree);

  let generated = match session.schema(identifier) {
    Ok(generated) => generated,
    Err(err) => return common::identifier_failure(err),
  };
  common::summarize(&generated.diagnostics);

  print!("{}", generated.output.to_yaml()?);
  Ok(0)
}
