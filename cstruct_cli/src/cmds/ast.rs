use super::common;
use cstruct_syntax::TreeDump;
use std::path::PathBuf;

pub fn run(inputs: &[PathBuf]) -> anyhow::Result<i32> {
  let tree = common::parse_inputs(inputs)?;
  print!("{}", TreeDump::new(&tree));
  Ok(0)
}
