use std::collections::BTreeMap;

use schemagate_engine::EngineConfig;
use serde::Serialize;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct Limits {
    max_document_bytes: usize,
    max_schemas_from_directory: usize,
    max_schema_file_size: usize,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    version: String,
    target: String,
    platform: PlatformInfo,
    limits: Limits,
    dependencies: BTreeMap<String, String>,
    environment: BTreeMap<String, Option<String>>,
}

pub fn run(_args: EnvinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let config = EngineConfig::default();

    let mut deps = BTreeMap::new();
    deps.insert("clap".to_string(), "4.5".to_string());
    deps.insert("jsonschema".to_string(), "0.41".to_string());

    let mut env = BTreeMap::new();
    for key in ["SCHEMAGATE_SCHEMA_DIR", "SCHEMAGATE_LOG_LEVEL"] {
        env.insert(key.to_string(), std::env::var(key).ok());
    }

    let output = EnvInfoOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        target: target_triple(),
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        limits: Limits {
            max_document_bytes: config.max_document_bytes,
            max_schemas_from_directory: config.store_limits.max_schemas_from_directory,
            max_schema_file_size: config.store_limits.max_schema_file_size,
        },
        dependencies: deps,
        environment: env,
    };

    print_envinfo(&output, format);
    Ok(SUCCESS)
}

fn target_triple() -> String {
    match option_env!("SCHEMAGATE_BUILD_TARGET") {
        Some(target) => target.to_string(),
        None => format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
    }
}

fn print_envinfo(output: &EnvInfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("schemagate environment\n");
            println!("  Version:    {}", output.version);
            println!("  Target:     {}", output.target);
            println!(
                "  Platform:   {} ({})",
                output.platform.os, output.platform.arch
            );
            println!("\n  Limits:");
            println!("    {:<28} {}", "max_document_bytes", output.limits.max_document_bytes);
            println!(
                "    {:<28} {}",
                "max_schemas_from_directory", output.limits.max_schemas_from_directory
            );
            println!(
                "    {:<28} {}",
                "max_schema_file_size", output.limits.max_schema_file_size
            );
            println!("\n  Dependencies:");
            for (k, v) in &output.dependencies {
                println!("    {:<12} {}", k, v);
            }
            println!("\n  Environment:");
            for (k, v) in &output.environment {
                println!("    {:<24} {}", k, v.as_deref().unwrap_or("(not set)"));
            }
        }
    }
}
