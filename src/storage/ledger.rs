//! Metadata ledger
//!
//! Three small files kept beside the row tree:
//! - `columns`: the ordered column names
//! - `size`: number of row files
//! - `fingerprint`: wrapping sum of row hashes
//!
//! Every update is a separate write issued after the row file write. A crash
//! in between leaves the counters out of step with the rows on disk;
//! [`super::FileTable::audit`] reports such drift.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TableError};
use crate::row::codec;

use super::write_file;

/// Reads and writes the metadata files of one table
#[derive(Debug, Clone)]
pub struct Ledger {
    metadata_dir: PathBuf,
    sync_writes: bool,
}

impl Ledger {
    const COLUMNS_FILE: &'static str = "columns";
    const SIZE_FILE: &'static str = "size";
    const FINGERPRINT_FILE: &'static str = "fingerprint";

    pub fn new(metadata_dir: impl Into<PathBuf>, sync_writes: bool) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            sync_writes,
        }
    }

    /// Write the columns; start the counters at zero unless they already exist
    pub fn init(&self, columns: &[String]) -> Result<()> {
        fs::create_dir_all(&self.metadata_dir)?;
        self.write_columns(columns)?;
        if !self.size_path().exists() {
            self.set_size(0)?;
        }
        if !self.fingerprint_path().exists() {
            self.set_fingerprint(0)?;
        }
        Ok(())
    }

    pub fn columns_path(&self) -> PathBuf {
        self.metadata_dir.join(Self::COLUMNS_FILE)
    }

    pub fn size_path(&self) -> PathBuf {
        self.metadata_dir.join(Self::SIZE_FILE)
    }

    pub fn fingerprint_path(&self) -> PathBuf {
        self.metadata_dir.join(Self::FINGERPRINT_FILE)
    }

    pub fn read_columns(&self) -> Result<Vec<String>> {
        let data = fs::read(self.columns_path())?;
        codec::decode_columns(&data)
    }

    pub fn write_columns(&self, columns: &[String]) -> Result<()> {
        let data = codec::encode_columns(columns)?;
        write_file(&self.columns_path(), &data, self.sync_writes)
    }

    pub fn size(&self) -> Result<usize> {
        let size = read_counter(&self.size_path())?;
        usize::try_from(size)
            .map_err(|_| TableError::Corruption(format!("negative row count {}", size)))
    }

    pub fn set_size(&self, size: usize) -> Result<()> {
        let size = i32::try_from(size)
            .map_err(|_| TableError::InvalidArgument(format!("row count {} exceeds i32", size)))?;
        write_file(&self.size_path(), &codec::encode_i32(size), self.sync_writes)
    }

    pub fn fingerprint(&self) -> Result<i32> {
        read_counter(&self.fingerprint_path())
    }

    pub fn set_fingerprint(&self, fingerprint: i32) -> Result<()> {
        write_file(
            &self.fingerprint_path(),
            &codec::encode_i32(fingerprint),
            self.sync_writes,
        )
    }

    /// Replace `old_hash` with `new_hash` in the stored fingerprint
    pub fn swap_hash(&self, old_hash: i32, new_hash: i32) -> Result<()> {
        let fingerprint = self.fingerprint()?;
        self.set_fingerprint(fingerprint.wrapping_sub(old_hash).wrapping_add(new_hash))
    }

    /// Zero both counters; columns are untouched
    pub fn reset(&self) -> Result<()> {
        self.set_size(0)?;
        self.set_fingerprint(0)
    }
}

fn read_counter(path: &Path) -> Result<i32> {
    let data = fs::read(path)?;
    codec::decode_i32(&data)
}
