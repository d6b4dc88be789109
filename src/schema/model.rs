//! Schema model types and canonical rendering

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single column as reported by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,
    /// Source-reported type name, passed through verbatim
    pub declared_type: String,
}

impl ColumnSchema {
    /// Create a new column
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }

    /// Render as `name type`, or just `name` when the source declared no type
    pub fn render(&self) -> String {
        if self.declared_type.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.declared_type)
        }
    }
}

/// A table with its columns in declared order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Columns in declared order
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a new table
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Render the `CREATE TABLE` block without the trailing blank line
    pub fn render_create(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.render()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE {} (\n{}\n);\n", self.name, columns)
    }
}

/// Up to N rows read from a table, every value already rendered as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRows {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Row values in column order
    pub rows: Vec<Vec<String>>,
}

impl SampleRows {
    /// Check if no rows were read
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as `-- ` prefixed comment lines (header, then one line per row)
    pub fn render_comment(&self) -> String {
        let mut out = format!("-- sample: {}\n", self.columns.join(" | "));
        for row in &self.rows {
            out.push_str(&format!("-- {}\n", row.join(" | ")));
        }
        out
    }

    /// Render as a plain table for prompts
    pub fn render_plain(&self) -> String {
        let mut out = self.columns.join(" | ");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(" | "));
            out.push('\n');
        }
        out
    }
}

/// The flattened, order-sensitive text form of a schema
///
/// Each table renders as `CREATE TABLE <name> (\n    <col> <type>,\n...\n);\n\n`,
/// tables concatenated in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalSchemaText(String);

impl CanonicalSchemaText {
    /// Wrap already-canonical text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Render a sequence of tables, skipping tables without columns
    pub fn from_tables(tables: &[TableSchema]) -> Self {
        let mut text = String::new();
        for table in tables.iter().filter(|t| !t.columns.is_empty()) {
            text.push_str(&table.render_create());
            text.push('\n');
        }
        Self(text)
    }

    /// Render tables with optional sample rows after each block
    ///
    /// Tables without columns are skipped along with their samples.
    pub fn from_tables_with_samples(tables: &[(TableSchema, Option<SampleRows>)]) -> Self {
        let mut text = String::new();
        for (table, samples) in tables.iter().filter(|(t, _)| !t.columns.is_empty()) {
            text.push_str(&table.render_create());
            if let Some(samples) = samples.as_ref().filter(|s| !s.is_empty()) {
                text.push_str(&samples.render_comment());
            }
            text.push('\n');
        }
        Self(text)
    }

    /// Borrow the text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the text
    pub fn into_string(self) -> String {
        self.0
    }

    /// Check if the text is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalSchemaText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalSchemaText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
