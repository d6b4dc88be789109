//! Schema extraction
//!
//! Produces the canonical text form of a relational schema from either a
//! SQLite database (a file on disk or uploaded bytes) or pasted DDL.
//!
//! # Example
//!
//! ```ignore
//! use metamind::schema::{SchemaSource, normalize};
//!
//! let text = normalize(&SchemaSource::file("sample.db"))?;
//! println!("{text}");
//! ```

pub mod ddl;
pub mod error;
pub mod model;
pub mod normalize;
pub mod sqlite;

pub use ddl::parse_tables;
pub use error::{SchemaError, SchemaResult};
pub use model::{CanonicalSchemaText, ColumnSchema, SampleRows, TableSchema};
pub use normalize::{
    DatabaseHandle, NormalizeOptions, SchemaIntrospector, SchemaSource, normalize,
    normalize_introspector, normalize_with, read_tables,
};
pub use sqlite::{SqliteDatabase, UploadedDatabase};
