//! Pasted DDL inspection
//!
//! Lists the tables declared in raw `CREATE TABLE` text using `sqlparser`.
//! Normalization never rewrites raw text; this is only for listing tables
//! and for documenting them one at a time.

use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use super::error::{SchemaError, SchemaResult};
use super::model::{ColumnSchema, TableSchema};

/// Parse `CREATE TABLE` statements out of raw DDL
///
/// Other statements are ignored. Tables without columns are dropped.
pub fn parse_tables(sql: &str) -> SchemaResult<Vec<TableSchema>> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(SchemaError::EmptyInput);
    }

    let statements = Parser::parse_sql(&GenericDialect {}, sql)
        .map_err(|e| SchemaError::IntrospectionFailure(e.to_string()))?;

    let tables: Vec<TableSchema> = statements
        .into_iter()
        .filter_map(|statement| match statement {
            Statement::CreateTable(create) => {
                let columns = create
                    .columns
                    .iter()
                    .map(|col| ColumnSchema::new(col.name.value.clone(), col.data_type.to_string()))
                    .collect::<Vec<_>>();
                Some(TableSchema::new(create.name.to_string(), columns))
            }
            _ => None,
        })
        .filter(|table| !table.columns.is_empty())
        .collect();

    tracing::debug!("Parsed {} table(s) from raw DDL", tables.len());
    Ok(tables)
}
