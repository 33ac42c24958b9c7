use schemagate_engine::{compile_text, Mode};

use crate::cmd::CheckArgs;
use crate::exit::{engine_error, io_error, CliResult, SUCCESS};
use crate::output::{print_compiled, OutputFormat};
use crate::sources::Sources;

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let resolver_args = &args.resolver;
    let config = resolver_args.engine_config(Mode::default());
    let sources = Sources::from_args(resolver_args, &config)?;

    let schema_path = resolver_args.schema.display().to_string();
    let schema_json = std::fs::read_to_string(&resolver_args.schema)
        .map_err(|err| io_error(&format!("reading {schema_path}"), err))?;

    compile_text(&schema_json, sources.store, sources.resolver, &config)
        .map_err(|err| engine_error(&format!("compiling {schema_path}"), err))?;

    print_compiled(&schema_path, format);
    Ok(SUCCESS)
}
