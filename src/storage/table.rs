//! FileTable implementation
//!
//! Each mutation is a read-modify-write of one row file followed by the
//! ledger update.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, TableError};
use crate::row::{codec, Row, Scalar};
use crate::table::{self, Rows, Table};

use super::digest::{digest_from_path, digest_key, shard_path};
use super::{check_table_name, write_file, Ledger};

/// Durable table storing one file per row under `{base_dir}/{name}`
#[derive(Debug)]
pub struct FileTable {
    name: String,
    root: PathBuf,
    data_dir: PathBuf,
    /// Loaded once; columns only change through `create`
    columns: Vec<String>,
    ledger: Ledger,
    sync_writes: bool,
}

/// Ledger counters compared with the rows actually on disk
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerAudit {
    pub recorded_size: usize,
    pub actual_size: usize,
    pub recorded_fingerprint: i32,
    pub actual_fingerprint: i32,
    /// Row files whose key does not digest to their own path
    pub misplaced: Vec<PathBuf>,
}

impl LedgerAudit {
    pub fn is_consistent(&self) -> bool {
        self.recorded_size == self.actual_size
            && self.recorded_fingerprint == self.actual_fingerprint
            && self.misplaced.is_empty()
    }
}

impl FileTable {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const DATA_DIR: &'static str = "data";
    const METADATA_DIR: &'static str = "metadata";

    /// Create (or re-create) a table under `config.base_dir`.
    ///
    /// The columns file is always rewritten. Existing rows and counters are
    /// kept, so creating a table twice does not lose data. Changing the
    /// degree of a table that still holds rows is `InvalidArgument`.
    pub fn create(config: &Config, name: &str, columns: Vec<String>) -> Result<Self> {
        check_table_name(name)?;
        table::check_columns(&columns)?;

        let root = config.base_dir.join(name);
        let data_dir = root.join(Self::DATA_DIR);
        let ledger = Ledger::new(root.join(Self::METADATA_DIR), config.sync_writes);

        if ledger.columns_path().is_file() {
            let stored = ledger.read_columns()?;
            if stored.len() != columns.len() && has_row_files(&data_dir)? {
                return Err(TableError::InvalidArgument(format!(
                    "table {} holds degree {} rows, cannot re-create with degree {}",
                    name,
                    stored.len(),
                    columns.len()
                )));
            }
        }

        fs::create_dir_all(&data_dir)?;
        ledger.init(&columns)?;

        info!(table = name, root = %root.display(), degree = columns.len(), "created table");

        Ok(Self {
            name: name.to_string(),
            root,
            data_dir,
            columns,
            ledger,
            sync_writes: config.sync_writes,
        })
    }

    /// Open an existing table under `config.base_dir`
    pub fn open(config: &Config, name: &str) -> Result<Self> {
        check_table_name(name)?;

        if !Self::exists(config, name) {
            return Err(TableError::MissingTable(name.to_string()));
        }
        let root = config.base_dir.join(name);
        let ledger = Ledger::new(root.join(Self::METADATA_DIR), config.sync_writes);

        let columns = ledger.read_columns()?;
        table::check_columns(&columns)
            .map_err(|e| TableError::Corruption(format!("columns of {}: {}", name, e)))?;

        let data_dir = root.join(Self::DATA_DIR);
        fs::create_dir_all(&data_dir)?;

        info!(table = name, root = %root.display(), "opened table");

        Ok(Self {
            name: name.to_string(),
            root,
            data_dir,
            columns,
            ledger,
            sync_writes: config.sync_writes,
        })
    }

    /// Whether `name` under `config.base_dir` holds a table (has a columns file).
    ///
    /// Invalid names never exist.
    pub fn exists(config: &Config, name: &str) -> bool {
        if check_table_name(name).is_err() {
            return false;
        }
        let metadata_dir = config.base_dir.join(name).join(Self::METADATA_DIR);
        Ledger::new(metadata_dir, false).columns_path().is_file()
    }

    /// Directory holding this table's `data/` and `metadata/`
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Where the row for `key` lives (whether or not it exists)
    pub fn row_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(shard_path(&digest_key(key)))
    }

    /// Walk every row file and compare the ledger with what is on disk.
    ///
    /// Reports drift; never rewrites the ledger.
    pub fn audit(&self) -> Result<LedgerAudit> {
        let mut actual_size = 0;
        let mut actual_fingerprint = 0i32;
        let mut misplaced = Vec::new();

        for entry in self.row_files() {
            let (path, digest) = entry?;
            let row = read_row(&path)?;
            if digest_key(&row.key) != digest {
                misplaced.push(path);
            }
            actual_size += 1;
            actual_fingerprint = actual_fingerprint.wrapping_add(row.hash32());
        }

        let audit = LedgerAudit {
            recorded_size: self.ledger.size()?,
            actual_size,
            recorded_fingerprint: self.ledger.fingerprint()?,
            actual_fingerprint,
            misplaced,
        };

        if audit.is_consistent() {
            debug!(table = %self.name, rows = actual_size, "ledger consistent");
        } else {
            warn!(
                table = %self.name,
                recorded_size = audit.recorded_size,
                actual_size = audit.actual_size,
                recorded_fingerprint = audit.recorded_fingerprint,
                actual_fingerprint = audit.actual_fingerprint,
                misplaced = audit.misplaced.len(),
                "ledger out of step with row files"
            );
        }
        Ok(audit)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Row files in traversal order, paired with the digest their path encodes.
    /// Anything that is not a `shard/file` pair of hex names is skipped.
    fn row_files(&self) -> impl Iterator<Item = Result<(PathBuf, String)>> + '_ {
        WalkDir::new(&self.data_dir)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(TableError::from(e))),
                };
                if !entry.file_type().is_file() {
                    return None;
                }
                let relative = entry.path().strip_prefix(&self.data_dir).ok()?;
                match digest_from_path(relative) {
                    Some(digest) => Some(Ok((entry.into_path(), digest))),
                    None => {
                        trace!(path = %entry.path().display(), "skipping stray file");
                        None
                    }
                }
            })
    }

    /// Decode the row at `path` if the file exists
    fn read_existing(&self, path: &Path, key: &str) -> Result<Option<Row>> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let row = codec::decode_row(&data)?;
        if row.key != key {
            return Err(TableError::Corruption(format!(
                "{} holds key {:?}, expected {:?}",
                path.display(),
                row.key,
                key
            )));
        }
        Ok(Some(row))
    }

    /// Remove the shard directory holding `path` once it has no files left
    fn prune_shard(&self, path: &Path) -> Result<()> {
        let Some(shard) = path.parent() else {
            return Ok(());
        };
        if shard == self.data_dir {
            return Ok(());
        }
        if fs::read_dir(shard)?.next().is_none() {
            fs::remove_dir(shard)?;
            trace!(shard = %shard.display(), "pruned empty shard");
        }
        Ok(())
    }
}

impl Table for FileTable {
    fn put(&mut self, key: &str, fields: Vec<Scalar>) -> Result<Option<Vec<Scalar>>> {
        table::check_row(key, &fields, self.degree())?;

        let row = Row::new(key, fields);
        let new_hash = row.hash32();
        let path = self.row_path(key);
        // Encode up front so an unencodable row fails before any write
        let data = codec::encode_row(&row)?;

        match self.read_existing(&path, key)? {
            Some(old) => {
                write_file(&path, &data, self.sync_writes)?;
                self.ledger.swap_hash(old.hash32(), new_hash)?;
                debug!(table = %self.name, key, path = %path.display(), "put hit");
                Ok(Some(old.fields))
            }
            None => {
                if let Some(shard) = path.parent() {
                    fs::create_dir_all(shard)?;
                }
                write_file(&path, &data, self.sync_writes)?;
                let size = self.ledger.size()?;
                self.ledger.set_size(size + 1)?;
                self.ledger.swap_hash(0, new_hash)?;
                debug!(table = %self.name, key, path = %path.display(), "put miss");
                Ok(None)
            }
        }
    }

    fn get(&self, key: &str) -> Result<Option<Vec<Scalar>>> {
        table::check_key(key)?;
        let path = self.row_path(key);
        Ok(self.read_existing(&path, key)?.map(Row::into_fields))
    }

    fn remove(&mut self, key: &str) -> Result<Option<Vec<Scalar>>> {
        table::check_key(key)?;
        let path = self.row_path(key);

        let Some(old) = self.read_existing(&path, key)? else {
            return Ok(None);
        };

        // A row file with a zero count means the ledger already drifted
        let size = self.ledger.size()?.checked_sub(1).ok_or_else(|| {
            warn!(table = %self.name, key, "ledger size is 0 but the row file exists");
            TableError::Corruption(format!(
                "ledger of {} records no rows but {} exists",
                self.name,
                path.display()
            ))
        })?;

        fs::remove_file(&path)?;
        self.prune_shard(&path)?;

        self.ledger.set_size(size)?;
        self.ledger.swap_hash(old.hash32(), 0)?;

        debug!(table = %self.name, key, path = %path.display(), "removed");
        Ok(Some(old.fields))
    }

    fn clear(&mut self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        self.ledger.reset()?;

        info!(table = %self.name, "cleared table");
        Ok(())
    }

    fn size(&self) -> Result<usize> {
        self.ledger.size()
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fingerprint(&self) -> Result<i32> {
        self.ledger.fingerprint()
    }

    fn rows(&self) -> Result<Rows<'_>> {
        let rows = self
            .row_files()
            .map(|entry| entry.and_then(|(path, _)| read_row(&path)));
        Ok(Box::new(rows))
    }
}

/// Whether the shard tree under `data_dir` holds any file
fn has_row_files(data_dir: &Path) -> Result<bool> {
    if !data_dir.is_dir() {
        return Ok(false);
    }
    for entry in WalkDir::new(data_dir).min_depth(2).max_depth(2) {
        if entry?.file_type().is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn read_row(path: &Path) -> Result<Row> {
    let data = fs::read(path)?;
    codec::decode_row(&data).map_err(|e| match e {
        TableError::Corruption(msg) => TableError::Corruption(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}
