//! # FlatQL Storage
//!
//! Flat-file persistence for FlatQL.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of FlatQL.**
//!
//! Users should depend on the main `flatql` crate instead, which provides
//! the `execute` entry point. This crate's API may change without notice
//! between minor versions.
//!
//! ---
//!
//! A data directory holds two kinds of files:
//!
//! - **Catalog** (`__tables_data.dat`): a header followed by one fixed-size
//!   binary record per table schema. Append-only.
//! - **Tables** (`<name>.tbl`): UTF-8 text, one row per line, fields
//!   separated by `;`.
//!
//! ## Write paths
//!
//! ```text
//! INSERT          → append one line to <name>.tbl
//! UPDATE / DELETE → write every row to a temp file → rename over <name>.tbl
//! ```

use flatql_core::Result;
use std::path::{Path, PathBuf};

pub mod catalog;
pub mod format;
pub mod table;

pub use catalog::Catalog;
pub use table::TableStore;

/// Default catalog file name
pub const DEFAULT_CATALOG_FILE: &str = "__tables_data.dat";

/// Default table file extension
pub const DEFAULT_TABLE_EXTENSION: &str = "tbl";

/// Durability of catalog and table writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Call fsync after every write (strongest durability)
    Sync,
    /// Flush to the OS only (fastest, unsafe for power loss)
    None,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Catalog file name inside the data directory
    pub catalog_file: String,
    /// Extension of table files
    pub table_extension: String,
    /// Sync mode for catalog and table writes
    pub sync_mode: SyncMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            table_extension: DEFAULT_TABLE_EXTENSION.to_string(),
            sync_mode: SyncMode::Sync,
        }
    }
}

/// Handle on one data directory: its catalog and its table files.
///
/// Executors receive this handle instead of reaching for file paths
/// themselves.
pub struct Storage {
    dir: PathBuf,
    catalog: Catalog,
    tables: TableStore,
}

impl Storage {
    /// Open or create storage at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, StorageConfig::default())
    }

    /// Open or create storage with custom configuration
    pub fn open_with_config(path: impl AsRef<Path>, config: StorageConfig) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let catalog = Catalog::open(dir.join(&config.catalog_file), config.sync_mode)?;
        let tables = TableStore::new(&dir, &config.table_extension, config.sync_mode);

        tracing::debug!(dir = %dir.display(), "storage opened");

        Ok(Self {
            dir,
            catalog,
            tables,
        })
    }

    /// Data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Schema catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Table files
    pub fn tables(&self) -> &TableStore {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_directory_and_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data");

        let storage = Storage::open(&path).unwrap();
        assert!(path.is_dir());
        assert!(path.join(DEFAULT_CATALOG_FILE).is_file());
        assert_eq!(storage.dir(), path.as_path());
        assert!(storage.catalog().schemas().unwrap().is_empty());
    }

    #[test]
    fn test_custom_config() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            catalog_file: "schemas.bin".to_string(),
            table_extension: "rows".to_string(),
            sync_mode: SyncMode::None,
        };

        let storage = Storage::open_with_config(dir.path(), config).unwrap();
        assert!(dir.path().join("schemas.bin").is_file());
        assert_eq!(
            storage.tables().path("users"),
            dir.path().join("users.rows")
        );
    }
}
