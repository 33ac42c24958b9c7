use clap::{Args, Subcommand};
use std::path::PathBuf;

use schemagate_engine::{EngineConfig, Mode};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod check;
pub mod envinfo;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a schema and report whether it is usable.
    Check(CheckArgs),
    /// Validate an instance document against a schema.
    Validate(ValidateArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Check(args) => check::run(args, format),
        Command::Validate(args) => validate::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

/// Where the schema comes from and how its references resolve.
#[derive(Args, Debug)]
pub struct ResolverArgs {
    /// Schema file to compile.
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Directory of schemas registered by `$id` before compiling.
    #[arg(long, value_name = "DIR", env = "SCHEMAGATE_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,
    /// Serve a referenced URI from a file (repeatable).
    #[arg(long = "ref", value_name = "URI=FILE")]
    pub refs: Vec<String>,
    /// Metaschema URI for schemas without `$schema`.
    #[arg(long, value_name = "URI")]
    pub default_dialect: Option<String>,
}

impl ResolverArgs {
    pub fn engine_config(&self, mode: Mode) -> EngineConfig {
        EngineConfig::default()
            .with_mode(mode)
            .with_default_dialect(self.default_dialect.clone())
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub resolver: ResolverArgs,
}

#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("input")
        .required(true)
        .args(["instance", "data"])
))]
pub struct ValidateArgs {
    #[command(flatten)]
    pub resolver: ResolverArgs,
    /// Instance file to validate.
    #[arg(long, value_name = "FILE", conflicts_with = "data")]
    pub instance: Option<PathBuf>,
    /// Inline instance JSON.
    #[arg(long, value_name = "JSON", conflicts_with = "instance")]
    pub data: Option<String>,
    /// Stop at the first error.
    #[arg(long)]
    pub fast: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}
