//! `document` command: generate documentation for a schema

use metamind::llm::{LlmClient, build_table_documentation_prompt};
use metamind::schema::NormalizeOptions;
use metamind::Session;

use super::tables::load_tables;
use super::{GatewayArgs, SourceArgs};
use crate::error::CliError;

/// Sample rows sent with each table in per-table mode
pub const PER_TABLE_SAMPLE_ROWS: usize = 3;

/// Arguments for the `document` command
pub struct DocumentArgs {
    /// Document each table with its own request
    pub per_table: bool,
    /// Sample rows to include per table, if given on the command line
    pub samples: Option<usize>,
}

impl DocumentArgs {
    /// Sample rows to request from the source
    pub fn sample_rows(&self) -> usize {
        match (self.samples, self.per_table) {
            (Some(rows), _) => rows,
            (None, true) => PER_TABLE_SAMPLE_ROWS,
            (None, false) => 0,
        }
    }
}

/// Handle the `document` command
pub fn handle_document(
    source: &SourceArgs,
    gateway_args: &GatewayArgs,
    args: &DocumentArgs,
) -> Result<(), CliError> {
    let gateway = gateway_args.gateway()?;
    let options = NormalizeOptions::default().with_sample_rows(args.sample_rows());
    let schema_source = source.to_source()?;

    if !args.per_table {
        let mut session =
            Session::new(gateway, gateway_args.credentials()).with_options(options);
        session.submit_schema(&schema_source)?;
        eprintln!("Documenting schema...");
        let docs = session.generate_documentation()?;
        println!("{}", docs);
        return Ok(());
    }

    let tables = load_tables(&schema_source, &options)?;
    if tables.is_empty() {
        eprintln!("No tables found.");
        return Ok(());
    }

    let names: Vec<&str> = tables.iter().map(|(t, _)| t.name.as_str()).collect();
    eprintln!("Found tables: {}\n", names.join(", "));

    let credentials = gateway_args.credentials().resolve();
    for (table, samples) in &tables {
        println!("--- Documentation for table: {} ---", table.name);
        let prompt = build_table_documentation_prompt(table, samples.as_ref());
        let docs = gateway.complete(&prompt, &credentials)?;
        println!("{}", docs);
        println!("--------------------------------------------------\n");
    }
    Ok(())
}
