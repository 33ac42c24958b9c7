use schemagate_engine::{compile_text, Mode};

use crate::cmd::ValidateArgs;
use crate::exit::{engine_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_outcome, OutputFormat};
use crate::sources::Sources;

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let mode = if args.fast {
        Mode::FastValidation
    } else {
        Mode::Exhaustive
    };
    let config = args.resolver.engine_config(mode);
    let sources = Sources::from_args(&args.resolver, &config)?;

    let schema_path = args.resolver.schema.display().to_string();
    let schema_json = std::fs::read_to_string(&args.resolver.schema)
        .map_err(|err| io_error(&format!("reading {schema_path}"), err))?;
    let instance_json = read_instance(&args)?;

    let compiled = compile_text(&schema_json, sources.store, sources.resolver, &config)
        .map_err(|err| engine_error(&format!("compiling {schema_path}"), err))?;
    let outcome = compiled
        .evaluate_text(&instance_json, &config)
        .map_err(|err| engine_error("parsing instance", err))?;

    tracing::debug!(
        valid = outcome.is_valid(),
        errors = outcome.errors().len(),
        "validation finished"
    );
    print_outcome(&outcome, format);

    Ok(if outcome.is_valid() {
        SUCCESS
    } else {
        DATA_INVALID
    })
}

fn read_instance(args: &ValidateArgs) -> CliResult<String> {
    if let Some(data) = &args.data {
        return Ok(data.clone());
    }
    let path = args
        .instance
        .as_ref()
        .ok_or_else(|| CliError::new(USAGE, "one of --instance or --data is required"))?;
    std::fs::read_to_string(path).map_err(|err| io_error(&format!("reading {}", path.display()), err))
}
