//! SQLite introspection
//!
//! Reads table and column metadata from a SQLite file through `rusqlite`.
//! Uploaded database bytes are staged in a temporary `.db` file that is
//! removed when the [`UploadedDatabase`] guard drops, whichever way the
//! caller exits.

use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tempfile::NamedTempFile;

use super::error::{SchemaError, SchemaResult};
use super::model::{ColumnSchema, SampleRows};
use super::normalize::SchemaIntrospector;

const TABLE_NAMES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY rowid";

const COLUMNS_SQL: &str = "SELECT name, type FROM pragma_table_info(?1) ORDER BY cid";

/// A read-only connection to a SQLite database file
pub struct SqliteDatabase {
    conn: Connection,
    path: PathBuf,
}

impl SqliteDatabase {
    /// Open an existing database file read-only
    ///
    /// Fails with `UnreadableSource` if the file is missing or is not a
    /// SQLite database.
    pub fn open(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SchemaError::UnreadableSource(format!(
                "{} does not exist or is not a file",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SchemaError::UnreadableSource(e.to_string()))?;

        // SQLite opens lazily; touching the schema is what rejects non-database files.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| SchemaError::UnreadableSource(e.to_string()))?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Get the database path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaIntrospector for SqliteDatabase {
    fn table_names(&self) -> SchemaResult<Vec<String>> {
        let mut stmt = self.conn.prepare(TABLE_NAMES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn columns(&self, table: &str) -> SchemaResult<Vec<ColumnSchema>> {
        let mut stmt = self.conn.prepare(COLUMNS_SQL)?;
        let columns = stmt
            .query_map([table], |row| {
                let name: String = row.get(0)?;
                let declared_type: Option<String> = row.get(1)?;
                Ok(ColumnSchema::new(name, declared_type.unwrap_or_default()))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn sample_rows(&self, table: &str, limit: usize) -> SchemaResult<SampleRows> {
        let sql = format!("SELECT * FROM {} LIMIT ?1", quote_identifier(table));
        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([limit as i64], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(render_value))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SampleRows { columns, rows })
    }
}

/// An uploaded database staged in a temporary file
///
/// The connection is declared before the file so it closes before the file
/// is removed.
pub struct UploadedDatabase {
    database: SqliteDatabase,
    _file: NamedTempFile,
}

impl UploadedDatabase {
    /// Write `bytes` to a temporary `.db` file and open it
    ///
    /// The temporary file lives in `temp_dir` when given, otherwise in the
    /// system temp directory. It is deleted on drop, including when opening
    /// fails here.
    pub fn stage(bytes: &[u8], temp_dir: Option<&Path>) -> SchemaResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("metamind-upload-").suffix(".db");
        let mut file = match temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!(
            "Staged uploaded database ({} bytes) at {}",
            bytes.len(),
            file.path().display()
        );

        let database = SqliteDatabase::open(file.path())?;
        Ok(Self {
            database,
            _file: file,
        })
    }

    /// Get the staged database
    pub fn database(&self) -> &SqliteDatabase {
        &self.database
    }

    /// Get the temporary file path
    pub fn path(&self) -> &Path {
        self.database.path()
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => format!("'{}'", String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(dir: &Path) -> PathBuf {
        let path = dir.join("fixture.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE users (user_id INTEGER PRIMARY KEY, email TEXT NOT NULL);
             CREATE TABLE orders (order_id INTEGER, user_id INTEGER, amount_usd DECIMAL(10, 2), note);
             INSERT INTO users (user_id, email) VALUES (1, 'a@example.com'), (2, 'b@example.com');
             INSERT INTO orders VALUES (10, 1, 9.5, NULL);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_table_names_in_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let db = SqliteDatabase::open(fixture(dir.path())).unwrap();
        assert_eq!(db.table_names().unwrap(), vec!["users", "orders"]);
    }

    #[test]
    fn test_columns_keep_declared_types() {
        let dir = tempfile::tempdir().unwrap();
        let db = SqliteDatabase::open(fixture(dir.path())).unwrap();
        let columns = db.columns("orders").unwrap();
        assert_eq!(
            columns,
            vec![
                ColumnSchema::new("order_id", "INTEGER"),
                ColumnSchema::new("user_id", "INTEGER"),
                ColumnSchema::new("amount_usd", "DECIMAL(10, 2)"),
                ColumnSchema::new("note", ""),
            ]
        );
    }

    #[test]
    fn test_sample_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = SqliteDatabase::open(fixture(dir.path())).unwrap();

        let samples = db.sample_rows("users", 1).unwrap();
        assert_eq!(samples.columns, vec!["user_id", "email"]);
        assert_eq!(samples.rows, vec![vec!["1", "'a@example.com'"]]);

        let samples = db.sample_rows("orders", 5).unwrap();
        assert_eq!(samples.rows, vec![vec!["10", "1", "9.5", "NULL"]]);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteDatabase::open(dir.path().join("missing.db"));
        assert!(matches!(result, Err(SchemaError::UnreadableSource(_))));
    }

    #[test]
    fn test_open_not_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");
        std::fs::write(&path, "not a sqlite file\n".repeat(256)).unwrap();
        let result = SqliteDatabase::open(&path);
        assert!(matches!(result, Err(SchemaError::UnreadableSource(_))));
    }

    #[test]
    fn test_uploaded_database_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = std::fs::read(fixture(dir.path())).unwrap();
        let staging = tempfile::tempdir().unwrap();

        let uploaded = UploadedDatabase::stage(&bytes, Some(staging.path())).unwrap();
        let staged_path = uploaded.path().to_path_buf();
        assert!(staged_path.exists());
        assert_eq!(staged_path.extension().and_then(|e| e.to_str()), Some("db"));
        assert_eq!(
            uploaded.database().table_names().unwrap(),
            vec!["users", "orders"]
        );

        drop(uploaded);
        assert!(!staged_path.exists());
    }

    #[test]
    fn test_uploaded_garbage_removed_on_error() {
        let staging = tempfile::tempdir().unwrap();
        let garbage = "garbage\n".repeat(512);
        let result = UploadedDatabase::stage(garbage.as_bytes(), Some(staging.path()));
        assert!(matches!(result, Err(SchemaError::UnreadableSource(_))));
        assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
