// Common test utilities for FlatQL integration tests

use flatql::Database;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture owning a temporary data directory
pub struct DbTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl DbTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().join("data");

        Self {
            temp_dir,
            data_path,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_path
    }

    pub fn open(&self) -> Database {
        Database::open(&self.data_path).expect("Failed to open database")
    }

    /// Open the database and run each statement, panicking on the first
    /// failure
    #[allow(dead_code)]
    pub fn with_statements(&self, statements: &[&str]) -> Database {
        let db = self.open();
        for statement in statements {
            db.execute(statement)
                .unwrap_or_else(|e| panic!("`{}` failed: {}", statement, e));
        }
        db
    }

    #[allow(dead_code)]
    pub fn table_file(&self, table: &str) -> PathBuf {
        self.data_path.join(format!("{}.tbl", table))
    }

    #[allow(dead_code)]
    pub fn read_table(&self, table: &str) -> Vec<u8> {
        fs::read(self.table_file(table)).expect("Failed to read table file")
    }

    #[allow(dead_code)]
    pub fn list_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.data_path)
            .expect("Failed to read data directory")
            .filter_map(|entry| {
                entry
                    .ok()
                    .and_then(|e| e.file_name().to_str().map(String::from))
            })
            .collect();
        names.sort();
        names
    }
}

impl Default for DbTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
