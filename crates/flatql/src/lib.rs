//! # FlatQL
//!
//! A minimal single-user query engine over flat-file tables.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flatql::Database;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Table schemas and rows live as plain files under this directory
//!     let db = Database::open("./my_data")?;
//!
//!     db.execute("DATASET users name STRING age INTEGER")?;
//!     db.execute("INSERT_INTO users name='Ann' age=30")?;
//!
//!     let result = db.execute("SELECT users age>25")?;
//!     println!("{}", result);
//!
//!     db.execute("DELETE users age>25")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Statements
//!
//! | Statement     | Form                                            |
//! |---------------|-------------------------------------------------|
//! | `DATASET`     | `DATASET <table> <column> <TYPE> ...`           |
//! | `INSERT_INTO` | `INSERT_INTO <table> <column>=<value> ...`      |
//! | `SELECT`      | `SELECT <table> [<column><op><value> ...]`      |
//! | `UPDATE`      | `UPDATE <table> [<condition> ...] <column>=<value>` |
//! | `DELETE`      | `DELETE <table> [<column><op><value> ...]`      |
//!
//! Types are `INTEGER`, `NUMBER`, `STRING` and `BOOLEAN`. Conditions use
//! `=`, `!=`, `<>`, `<`, `>`, `<=` and `>=` and are combined with AND.
//! In an `UPDATE` only the last `=` assigns; use `<column>:<value>` to
//! assign several columns.

use std::path::Path;

pub mod executor;
pub mod logging;

// Re-export core types
pub use flatql_core::{
    classify_query, classify_type, tokenize, ColumnDef, Error, FieldType, Operator, Predicate,
    QueryType, Result, Row, SchemaError, TableSchema, Token, Value,
};

// Storage components
pub use flatql_storage::{Catalog, Storage, StorageConfig, SyncMode, TableStore};

pub use executor::{ExecutionResult, Executor};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The main database handle.
///
/// Owns the storage of one data directory. Every call to
/// [`execute`](Database::execute) is independent; nothing is cached between
/// statements, so the files on disk are always the source of truth.
///
/// # Examples
///
/// ```rust,no_run
/// use flatql::Database;
///
/// let db = Database::open("./my_data")?;
/// db.execute("DATASET users name STRING")?;
///
/// // Schemas persist across restarts
/// drop(db);
/// let db = Database::open("./my_data")?;
/// assert!(db.find_table("users")?.is_some());
/// # Ok::<(), flatql::Error>(())
/// ```
pub struct Database {
    storage: Storage,
}

impl Database {
    /// Opens the database stored in `path`.
    ///
    /// Creates the directory and an empty catalog if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Database {
            storage: Storage::open(path)?,
        })
    }

    /// Opens the database with custom storage configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory holding the catalog and table files
    /// * `config` - File names and sync behaviour
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StorageConfig) -> Result<Self> {
        Ok(Database {
            storage: Storage::open_with_config(path, config)?,
        })
    }

    /// Runs one statement.
    ///
    /// A statement that fails leaves the table files as they were.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use flatql::{Database, ExecutionResult};
    ///
    /// let db = Database::open("./data")?;
    /// db.execute("DATASET users name STRING age INTEGER")?;
    /// db.execute("INSERT_INTO users name='Ann' age=30")?;
    ///
    /// if let ExecutionResult::Updated { count, .. } = db.execute("UPDATE users age:31")? {
    ///     println!("{} rows updated", count);
    /// }
    /// # Ok::<(), flatql::Error>(())
    /// ```
    pub fn execute(&self, query: &str) -> Result<ExecutionResult> {
        Executor::new(&self.storage).execute(query).map_err(|e| {
            tracing::warn!(error = %e, "statement aborted");
            e
        })
    }

    /// Every table schema, in creation order.
    pub fn tables(&self) -> Result<Vec<TableSchema>> {
        self.storage.catalog().schemas()
    }

    /// Looks up one table schema by name.
    pub fn find_table(&self, name: &str) -> Result<Option<TableSchema>> {
        self.storage.catalog().find_table(name)
    }

    /// Underlying storage handle
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}
