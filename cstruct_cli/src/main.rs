//! struct2yaml - inspect C structs and generate YAML schemas or yaml-cpp
//! converters for them.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmds;

#[derive(Parser)]
#[command(name = "struct2yaml")]
#[command(about = "Convert C structs to a YAML schema or yaml-cpp converters", long_about = None)]
#[command(version)]
struct Cli {
    /// Input C source files, merged in the order given
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        required = true,
        num_args = 1..
    )]
    input: Vec<PathBuf>,

    /// What to print
    #[arg(long = "output-type", visible_alias = "output_type", value_enum)]
    output_type: OutputType,

    /// Type to convert: typedef name, struct tag, or `struct <tag>`
    #[arg(long = "identifier", value_name = "NAME")]
    identifier: Option<String>,

    /// Log resolution steps (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum OutputType {
    /// Syntax tree dump
    Ast,
    /// Field schema as a YAML mapping
    Yaml,
    /// `YAML::convert<T>` specializations
    #[value(name = "yaml-cpp")]
    YamlCpp,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let identifier = cli.identifier.as_deref();
    let code = match cli.output_type {
        OutputType::Ast => cmds::ast::run(&cli.input)?,
        OutputType::Yaml => cmds::yaml::run(&cli.input, identifier)?,
        OutputType::YamlCpp => cmds::yaml_cpp::run(&cli.input, identifier)?,
    };

    if code != 0 {
        process::exit(code);
    }
    Ok(())
}
