//! Catalog - durable store of table schemas
//!
//! File layout:
//!
//! ```text
//! [magic: u32 LE] [version: u16 LE] [reserved: u16]
//! [record 0] [record 1] ...
//! ```
//!
//! Every record has the same length: a padded [`SchemaRecord`] encoded with
//! bincode (fixed-width integers, little endian) followed by a CRC32 of the
//! encoded bytes. Records are only ever appended.

use crc32fast::Hasher;
use flatql_core::format_version::{catalog_version, magic, CATALOG_FORMAT_VERSION};
use flatql_core::{ColumnDef, Error, FieldType, Result, SchemaError, TableSchema, MAX_COLUMNS};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::SyncMode;

/// Bytes reserved for one name (127 bytes + terminator slot)
const NAME_SLOT: usize = 128;

/// Catalog header length
pub const HEADER_LEN: usize = 8;

/// Encoded [`SchemaRecord`] length: four length-prefixed byte vectors
/// (name, column slots, each column name, type tags) and the column count.
pub const PAYLOAD_LEN: usize = (8 + NAME_SLOT) + 4 + 8 + MAX_COLUMNS * (8 + NAME_SLOT) + (8 + MAX_COLUMNS);

/// Full record length on disk (payload + CRC32)
pub const RECORD_LEN: usize = PAYLOAD_LEN + 4;

/// Fixed-layout schema record. Every vector is padded to its full capacity
/// so the encoded size never varies.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaRecord {
    name: Vec<u8>,
    count: u32,
    columns: Vec<Vec<u8>>,
    types: Vec<u8>,
}

fn pad_name(name: &str) -> Vec<u8> {
    let mut slot = vec![0u8; NAME_SLOT];
    slot[..name.len()].copy_from_slice(name.as_bytes());
    slot
}

fn unpad_name(slot: &[u8]) -> Result<String> {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    String::from_utf8(slot[..end].to_vec())
        .map_err(|_| Error::Storage("catalog record holds a non UTF-8 name".to_string()))
}

impl SchemaRecord {
    fn from_schema(schema: &TableSchema) -> Self {
        let mut columns = vec![vec![0u8; NAME_SLOT]; MAX_COLUMNS];
        let mut types = vec![0u8; MAX_COLUMNS];
        for (i, column) in schema.columns().iter().enumerate() {
            columns[i] = pad_name(&column.name);
            types[i] = column.field_type.tag();
        }

        Self {
            name: pad_name(schema.name()),
            count: schema.len() as u32,
            columns,
            types,
        }
    }

    fn into_schema(self) -> Result<TableSchema> {
        let count = self.count as usize;
        if count > MAX_COLUMNS || self.columns.len() < count || self.types.len() < count {
            return Err(Error::Storage(format!(
                "catalog record declares {} columns",
                self.count
            )));
        }

        let name = unpad_name(&self.name)?;
        let columns = self
            .columns
            .iter()
            .zip(&self.types)
            .take(count)
            .map(|(slot, &tag)| {
                let field_type = FieldType::from_tag(tag).ok_or_else(|| {
                    Error::Storage(format!("unknown type tag {} in table `{}`", tag, name))
                })?;
                Ok(ColumnDef::new(unpad_name(slot)?, field_type))
            })
            .collect::<Result<Vec<_>>>()?;

        TableSchema::new(name, columns)
    }

    /// Encode with framing and CRC
    fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)
            .map_err(|e| Error::Storage(format!("Failed to serialize schema: {}", e)))?;
        if payload.len() != PAYLOAD_LEN {
            return Err(Error::Storage(format!(
                "schema record is {} bytes, expected {}",
                payload.len(),
                PAYLOAD_LEN
            )));
        }

        let mut hasher = Hasher::new();
        hasher.update(&payload);
        let crc = hasher.finalize();

        let mut frame = Vec::with_capacity(RECORD_LEN);
        frame.extend_from_slice(&payload);
        frame.extend_from_slice(&crc.to_le_bytes());
        Ok(frame)
    }

    fn decode(frame: &[u8]) -> Result<Self> {
        let (payload, crc_bytes) = frame.split_at(PAYLOAD_LEN);
        let stored_crc = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);

        let mut hasher = Hasher::new();
        hasher.update(payload);
        if hasher.finalize() != stored_crc {
            return Err(Error::Storage("catalog record checksum mismatch".to_string()));
        }

        bincode::deserialize(payload)
            .map_err(|e| Error::Storage(format!("Failed to deserialize schema: {}", e)))
    }
}

fn encode_header() -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(&magic::CATALOG.to_le_bytes());
    header[4..6].copy_from_slice(&CATALOG_FORMAT_VERSION.to_le_bytes());
    header
}

fn check_header(header: &[u8; HEADER_LEN]) -> Result<()> {
    let found = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if found != magic::CATALOG {
        return Err(Error::Storage(format!(
            "not a catalog file (magic {:#010x})",
            found
        )));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if !catalog_version().can_read(version) {
        return Err(Error::Storage(format!(
            "unsupported catalog version {}",
            version
        )));
    }
    Ok(())
}

/// Fill `buf` from `reader`. Returns false on a clean end of file.
fn read_frame(reader: &mut impl Read, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(false),
        n if n == buf.len() => Ok(true),
        n => Err(Error::Storage(format!(
            "truncated catalog record ({} of {} bytes)",
            n,
            buf.len()
        ))),
    }
}

/// Append-only table schema store
pub struct Catalog {
    path: PathBuf,
    sync_mode: SyncMode,
}

impl Catalog {
    /// Open the catalog file, creating it with a header if needed.
    pub fn open(path: impl AsRef<Path>, sync_mode: SyncMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let is_new = match std::fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        if is_new {
            let mut file = File::create(&path)?;
            file.write_all(&encode_header())?;
            if sync_mode == SyncMode::Sync {
                file.sync_all()?;
            }
            tracing::debug!(path = %path.display(), "created catalog");
        } else {
            let mut header = [0u8; HEADER_LEN];
            File::open(&path)?
                .read_exact(&mut header)
                .map_err(|_| Error::Storage("catalog header is truncated".to_string()))?;
            check_header(&header)?;
        }

        Ok(Self { path, sync_mode })
    }

    /// Catalog file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> Result<BufReader<File>> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut header = [0u8; HEADER_LEN];
        reader
            .read_exact(&mut header)
            .map_err(|_| Error::Storage("catalog header is truncated".to_string()))?;
        check_header(&header)?;
        Ok(reader)
    }

    /// Find a table by exact name. Linear scan, first match wins.
    pub fn find_table(&self, name: &str) -> Result<Option<TableSchema>> {
        let mut reader = self.reader()?;
        let mut frame = vec![0u8; RECORD_LEN];

        while read_frame(&mut reader, &mut frame)? {
            let record = SchemaRecord::decode(&frame)?;
            if unpad_name(&record.name)? == name {
                return Ok(Some(record.into_schema()?));
            }
        }

        Ok(None)
    }

    /// Every schema, in creation order
    pub fn schemas(&self) -> Result<Vec<TableSchema>> {
        let mut reader = self.reader()?;
        let mut frame = vec![0u8; RECORD_LEN];
        let mut schemas = Vec::new();

        while read_frame(&mut reader, &mut frame)? {
            schemas.push(SchemaRecord::decode(&frame)?.into_schema()?);
        }

        Ok(schemas)
    }

    /// Append a schema. Fails if the name is already taken.
    pub fn create_table(&self, schema: &TableSchema) -> Result<()> {
        if self.find_table(schema.name())?.is_some() {
            return Err(SchemaError::DuplicateTable(schema.name().to_string()).into());
        }

        let frame = SchemaRecord::from_schema(schema).encode()?;

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(&frame)?;
        file.flush()?;
        if self.sync_mode == SyncMode::Sync {
            file.sync_all()?;
        }

        tracing::info!(
            table = schema.name(),
            columns = schema.len(),
            "table schema recorded"
        );
        Ok(())
    }
}
