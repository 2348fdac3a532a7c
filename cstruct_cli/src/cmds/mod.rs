pub mod ast;
pub mod common;
pub mod yaml;
pub mod yaml_cpp;

/* Exit status for a missing or malformed identifier */
pub const EXIT_BAD_IDENTIFIER: i32 = -1;
