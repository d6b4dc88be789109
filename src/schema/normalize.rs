//! Schema normalization
//!
//! Turns a [`SchemaSource`] into [`CanonicalSchemaText`]. Database sources are
//! introspected table by table in the order the source reports them; raw
//! text is trimmed and passed through.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{SchemaError, SchemaResult};
use super::model::{CanonicalSchemaText, ColumnSchema, SampleRows, TableSchema};
use super::sqlite::{SqliteDatabase, UploadedDatabase};

/// Anything that can list its tables and their columns
pub trait SchemaIntrospector {
    /// Table names in source-reported order
    fn table_names(&self) -> SchemaResult<Vec<String>>;

    /// Columns of `table` in declared order
    fn columns(&self, table: &str) -> SchemaResult<Vec<ColumnSchema>>;

    /// Up to `limit` rows of `table`
    ///
    /// Sources that cannot read data return no rows.
    fn sample_rows(&self, _table: &str, _limit: usize) -> SchemaResult<SampleRows> {
        Ok(SampleRows::default())
    }
}

/// A connectable relational source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseHandle {
    /// An existing SQLite file on disk
    File(PathBuf),
    /// Raw bytes of an uploaded SQLite file
    Upload(Vec<u8>),
}

/// Where a schema comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// A database to introspect
    Database(DatabaseHandle),
    /// Text assumed to hold SQL DDL
    RawText(String),
}

impl SchemaSource {
    /// Source backed by a database file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SchemaSource::Database(DatabaseHandle::File(path.into()))
    }

    /// Source backed by uploaded database bytes
    pub fn upload(bytes: impl Into<Vec<u8>>) -> Self {
        SchemaSource::Database(DatabaseHandle::Upload(bytes.into()))
    }

    /// Source backed by pasted DDL
    pub fn raw_text(text: impl Into<String>) -> Self {
        SchemaSource::RawText(text.into())
    }
}

/// Options for normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Rows to append per table as comments (0 = none)
    #[serde(default)]
    pub sample_rows: usize,

    /// Directory for staging uploaded databases (system temp dir if unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl NormalizeOptions {
    /// Set the number of sample rows per table
    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    /// Set the staging directory for uploads
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

/// Normalize a source with default options
pub fn normalize(source: &SchemaSource) -> SchemaResult<CanonicalSchemaText> {
    normalize_with(source, &NormalizeOptions::default())
}

/// Normalize a source
///
/// # Errors
/// - `EmptyInput` for blank raw text, or a database with no tables that have columns
/// - `UnreadableSource` if a database file cannot be opened
/// - `IntrospectionFailure` if reading metadata fails part-way
pub fn normalize_with(
    source: &SchemaSource,
    options: &NormalizeOptions,
) -> SchemaResult<CanonicalSchemaText> {
    match source {
        SchemaSource::RawText(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(SchemaError::EmptyInput);
            }
            Ok(CanonicalSchemaText::new(trimmed))
        }
        SchemaSource::Database(handle) => with_database(handle, options.temp_dir.as_deref(), |db| {
            normalize_introspector(db, options.sample_rows)
        }),
    }
}

/// Read every table (with optional samples) from a database handle
///
/// Tables without columns are dropped.
pub fn read_tables(
    handle: &DatabaseHandle,
    options: &NormalizeOptions,
) -> SchemaResult<Vec<(TableSchema, Option<SampleRows>)>> {
    with_database(handle, options.temp_dir.as_deref(), |db| {
        collect_tables(db, options.sample_rows)
    })
}

/// Render any introspector as canonical text
///
/// `sample_rows = 0` produces the plain canonical form.
pub fn normalize_introspector<I: SchemaIntrospector + ?Sized>(
    introspector: &I,
    sample_rows: usize,
) -> SchemaResult<CanonicalSchemaText> {
    let tables = collect_tables(introspector, sample_rows)?;
    if tables.is_empty() {
        return Err(SchemaError::EmptyInput);
    }
    Ok(CanonicalSchemaText::from_tables_with_samples(&tables))
}

fn collect_tables<I: SchemaIntrospector + ?Sized>(
    introspector: &I,
    sample_rows: usize,
) -> SchemaResult<Vec<(TableSchema, Option<SampleRows>)>> {
    let names = introspector.table_names()?;
    tracing::debug!("Introspecting {} table(s)", names.len());

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let columns = introspector.columns(&name)?;
        if columns.is_empty() {
            tracing::debug!("Skipping table '{}' with no columns", name);
            continue;
        }

        // Unreadable data still leaves a documentable table.
        let samples = if sample_rows > 0 {
            match introspector.sample_rows(&name, sample_rows) {
                Ok(samples) => Some(samples),
                Err(e) => {
                    tracing::warn!("Could not fetch sample data for '{}': {}", name, e);
                    None
                }
            }
        } else {
            None
        };
        tables.push((TableSchema::new(name, columns), samples));
    }
    Ok(tables)
}

fn with_database<T>(
    handle: &DatabaseHandle,
    temp_dir: Option<&Path>,
    f: impl FnOnce(&SqliteDatabase) -> SchemaResult<T>,
) -> SchemaResult<T> {
    match handle {
        DatabaseHandle::File(path) => {
            let db = SqliteDatabase::open(path)?;
            f(&db)
        }
        DatabaseHandle::Upload(bytes) => {
            let uploaded = UploadedDatabase::stage(bytes, temp_dir)?;
            f(uploaded.database())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory introspector with a fixed table order
    struct StaticSource {
        order: Vec<String>,
        tables: HashMap<String, Vec<ColumnSchema>>,
        fail_on: Option<String>,
        samples_fail_on: Option<String>,
    }

    impl StaticSource {
        fn new(tables: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
            Self {
                order: tables.iter().map(|(n, _)| n.to_string()).collect(),
                tables: tables
                    .iter()
                    .map(|(n, cols)| {
                        (
                            n.to_string(),
                            cols.iter().map(|(c, t)| ColumnSchema::new(*c, *t)).collect(),
                        )
                    })
                    .collect(),
                fail_on: None,
                samples_fail_on: None,
            }
        }
    }

    impl SchemaIntrospector for StaticSource {
        fn table_names(&self) -> SchemaResult<Vec<String>> {
            Ok(self.order.clone())
        }

        fn columns(&self, table: &str) -> SchemaResult<Vec<ColumnSchema>> {
            if self.fail_on.as_deref() == Some(table) {
                return Err(SchemaError::IntrospectionFailure(format!(
                    "driver exploded on {table}"
                )));
            }
            Ok(self.tables.get(table).cloned().unwrap_or_default())
        }

        fn sample_rows(&self, table: &str, _limit: usize) -> SchemaResult<SampleRows> {
            if self.samples_fail_on.as_deref() == Some(table) {
                return Err(SchemaError::IntrospectionFailure(
                    "database disk image is malformed".to_string(),
                ));
            }
            Ok(SampleRows {
                columns: vec!["id".to_string()],
                rows: vec![vec!["1".to_string()]],
            })
        }
    }

    #[test]
    fn test_raw_text_trimmed() {
        let source = SchemaSource::raw_text("\n  CREATE TABLE users (id INT, email TEXT);  \n");
        let text = normalize(&source).unwrap();
        assert_eq!(text.as_str(), "CREATE TABLE users (id INT, email TEXT);");
    }

    #[test]
    fn test_raw_text_empty() {
        assert_eq!(
            normalize(&SchemaSource::raw_text("   \n\t ")),
            Err(SchemaError::EmptyInput)
        );
        assert_eq!(
            normalize(&SchemaSource::raw_text("")),
            Err(SchemaError::EmptyInput)
        );
    }

    #[test]
    fn test_introspector_source_order() {
        let source = StaticSource::new(vec![
            ("zebra", vec![("id", "INTEGER")]),
            ("alpha", vec![("id", "INTEGER"), ("label", "VARCHAR(20)")]),
        ]);
        let text = normalize_introspector(&source, 0).unwrap();
        assert_eq!(
            text.as_str(),
            "CREATE TABLE zebra (\n    id INTEGER\n);\n\n\
             CREATE TABLE alpha (\n    id INTEGER,\n    label VARCHAR(20)\n);\n\n"
        );
    }

    #[test]
    fn test_introspector_skips_columnless_tables() {
        let source = StaticSource::new(vec![("empty", vec![]), ("users", vec![("id", "INTEGER")])]);
        let text = normalize_introspector(&source, 0).unwrap();
        assert!(!text.as_str().contains("empty"));
        assert!(text.as_str().starts_with("CREATE TABLE users"));
    }

    #[test]
    fn test_introspector_without_tables_is_empty_input() {
        let source = StaticSource::new(vec![("empty", vec![])]);
        assert_eq!(
            normalize_introspector(&source, 0),
            Err(SchemaError::EmptyInput)
        );
    }

    #[test]
    fn test_introspector_failure_propagates() {
        let mut source = StaticSource::new(vec![("users", vec![("id", "INTEGER")])]);
        source.fail_on = Some("users".to_string());
        let err = normalize_introspector(&source, 0).unwrap_err();
        assert_eq!(
            err,
            SchemaError::IntrospectionFailure("driver exploded on users".to_string())
        );
    }

    #[test]
    fn test_unreadable_samples_keep_the_table() {
        let mut source = StaticSource::new(vec![
            ("users", vec![("id", "INTEGER")]),
            ("orders", vec![("id", "INTEGER")]),
        ]);
        source.samples_fail_on = Some("users".to_string());

        let tables = collect_tables(&source, 3).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].0.name, "users");
        assert_eq!(tables[0].1, None);
        assert_eq!(tables[1].1.as_ref().map(|s| s.rows.len()), Some(1));

        let text = normalize_introspector(&source, 3).unwrap();
        assert!(text.as_str().starts_with("CREATE TABLE users (\n    id INTEGER\n);\n\n"));
        assert!(text.as_str().contains("-- sample: id\n-- 1\n"));
    }

    #[test]
    fn test_samples_skipped_when_zero_rows_requested() {
        let source = StaticSource::new(vec![("users", vec![("id", "INTEGER")])]);
        let tables = collect_tables(&source, 0).unwrap();
        assert_eq!(tables[0].1, None);
        assert!(!normalize_introspector(&source, 0).unwrap().as_str().contains("-- sample"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = SchemaSource::file(dir.path().join("nope.db"));
        assert!(matches!(
            normalize(&source),
            Err(SchemaError::UnreadableSource(_))
        ));
    }

    #[test]
    fn test_options_builder() {
        let options = NormalizeOptions::default()
            .with_sample_rows(3)
            .with_temp_dir("/tmp/uploads");
        assert_eq!(options.sample_rows, 3);
        assert_eq!(options.temp_dir, Some(PathBuf::from("/tmp/uploads")));
    }
}
