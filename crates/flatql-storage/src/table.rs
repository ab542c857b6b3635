//! Table files: scan, append and whole-file rewrite.

use crate::format::{decode_row, encode_row};
use crate::SyncMode;
use flatql_core::{Error, Predicate, Result, Row, TableSchema};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Prefix of rewrite temp files, so stray ones are easy to spot
const TEMP_PREFIX: &str = "__flatql_tmp_";

/// Access to the per-table row files of one data directory
pub struct TableStore {
    dir: PathBuf,
    extension: String,
    sync_mode: SyncMode,
}

impl TableStore {
    /// Create a store over `dir`. No file is touched until a table is used.
    pub fn new(dir: impl AsRef<Path>, extension: &str, sync_mode: SyncMode) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            extension: extension.to_string(),
            sync_mode,
        }
    }

    /// Path of a table's row file
    pub fn path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", table, self.extension))
    }

    /// Create an empty row file for a new table.
    ///
    /// A leftover file with the same name belongs to no catalog entry and is
    /// truncated.
    pub fn create(&self, schema: &TableSchema) -> Result<()> {
        let path = self.path(schema.name());
        if path.exists() {
            tracing::warn!(path = %path.display(), "discarding stale table file");
        }
        let file = File::create(&path)?;
        if self.sync_mode == SyncMode::Sync {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Read every row in file order, keeping only those that satisfy
    /// `filter` when one is given. A missing file is an empty table.
    pub fn scan(&self, schema: &TableSchema, filter: Option<&Predicate>) -> Result<Vec<Row>> {
        let path = self.path(schema.name());
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let row = decode_row(schema, &line).map_err(|e| match e {
                Error::Storage(msg) => {
                    Error::Storage(format!("{}:{}: {}", path.display(), number + 1, msg))
                }
                other => other,
            })?;

            let keep = match filter {
                Some(predicate) => predicate.matches(&row)?,
                None => true,
            };
            if keep {
                rows.push(row);
            }
        }

        tracing::debug!(table = schema.name(), rows = rows.len(), "scan finished");
        Ok(rows)
    }

    /// Index for the next inserted row: one past the largest stored index.
    pub fn next_index(&self, schema: &TableSchema) -> Result<i64> {
        let rows = self.scan(schema, None)?;
        let largest = rows.iter().map(|r| r.index).max().unwrap_or(0);
        largest.checked_add(1).ok_or_else(|| {
            Error::Storage(format!(
                "row index space exhausted in table `{}`",
                schema.name()
            ))
        })
    }

    /// Append one row. The row is validated before the file is opened.
    pub fn append(&self, schema: &TableSchema, row: &Row) -> Result<()> {
        let mut line = encode_row(schema, row)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(schema.name()))?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        if self.sync_mode == SyncMode::Sync {
            file.sync_all()?;
        }

        Ok(())
    }

    /// Replace the table's contents with `rows`.
    ///
    /// Rows are written to a temp file in the same directory which is then
    /// renamed over the table file. If any row fails validation or any write
    /// fails, the temp file is removed and the table file is untouched.
    pub fn rewrite(&self, schema: &TableSchema, rows: &[Row]) -> Result<()> {
        let path = self.path(schema.name());
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.dir)?;

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            for row in rows {
                let line = encode_row(schema, row)?;
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        if self.sync_mode == SyncMode::Sync {
            temp.as_file().sync_all()?;
        }

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::info!(table = schema.name(), rows = rows.len(), "table rewritten");
        Ok(())
    }
}
