use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use schemagate_engine::Outcome;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct CompileOutput<'a> {
    schema: &'a str,
    compiled: bool,
}

pub fn print_compiled(schema: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = CompileOutput {
                schema,
                compiled: true,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => println!("compiled {schema}"),
    }
}

/// Print an outcome. JSON output is exactly the encoded result document.
pub fn print_outcome(outcome: &Outcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            outcome
                .to_json()
                .unwrap_or_else(|_| r#"{"valid":false}"#.to_string())
        ),
        OutputFormat::Table => {
            if outcome.is_valid() {
                println!("valid");
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INSTANCE", "EVALUATE PATH", "MESSAGE"]);
            for entry in outcome.errors() {
                table.add_row(vec![
                    display_location(&entry.instance_location).to_string(),
                    entry.evaluate_path.clone(),
                    entry.message.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if outcome.is_valid() {
                println!("valid");
                return;
            }
            println!("invalid ({} errors)", outcome.errors().len());
            for entry in outcome.errors() {
                println!(
                    "- {} at {} ({})",
                    entry.message,
                    display_location(&entry.instance_location),
                    entry.evaluate_path
                );
            }
        }
    }
}

fn display_location(pointer: &str) -> &str {
    if pointer.is_empty() {
        "<root>"
    } else {
        pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_location_is_labelled() {
        assert_eq!(display_location(""), "<root>");
        assert_eq!(display_location("/items/0"), "/items/0");
    }

    #[test]
    fn compile_output_serializes() {
        let json = serde_json::to_string(&CompileOutput {
            schema: "a.json",
            compiled: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"schema":"a.json","compiled":true}"#);
    }
}
