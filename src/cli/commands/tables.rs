//! `tables` command: list tables and columns without calling the LLM

use metamind::schema::{NormalizeOptions, SampleRows, TableSchema, parse_tables, read_tables};
use metamind::SchemaSource;

use super::SourceArgs;
use crate::error::CliError;

/// Handle the `tables` command
pub fn handle_tables(source: &SourceArgs) -> Result<(), CliError> {
    let tables = load_tables(&source.to_source()?, &NormalizeOptions::default())?
        .into_iter()
        .map(|(table, _)| table)
        .collect::<Vec<_>>();

    if tables.is_empty() {
        println!("No tables found.");
        return Ok(());
    }

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    println!("Found tables: {}\n", names.join(", "));
    for table in &tables {
        print!("{}", format_table(table));
    }
    Ok(())
}

/// Tables (with samples where the source has data) from either kind of source
pub fn load_tables(
    source: &SchemaSource,
    options: &NormalizeOptions,
) -> Result<Vec<(TableSchema, Option<SampleRows>)>, CliError> {
    match source {
        SchemaSource::Database(handle) => Ok(read_tables(handle, options)?),
        SchemaSource::RawText(text) => Ok(parse_tables(text)?
            .into_iter()
            .map(|table| (table, None))
            .collect()),
    }
}

fn format_table(table: &TableSchema) -> String {
    let mut out = format!("{}:\n", table.name);
    for column in &table.columns {
        out.push_str(&format!("  - {} ({})\n", column.name, column.declared_type));
    }
    out.push('\n');
    out
}
