//! Catalog Module
//!
//! Entry point for file-backed tables rooted at one configured directory.
//!
//! ## Responsibilities
//! - Create and open named tables under `Config::base_dir`
//! - List and drop tables
//! - Load a stored table into memory

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::{Result, TableError};
use crate::memtable::MemTable;
use crate::storage::{self, FileTable};
use crate::table::{copy_rows, Table};

/// Named tables under one base directory
#[derive(Debug, Clone)]
pub struct Catalog {
    config: Config,
}

impl Catalog {
    /// Open the catalog, creating the base directory if needed
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.base_dir)?;
        info!(base_dir = %config.base_dir.display(), "opened catalog");
        Ok(Self { config })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified base directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().base_dir(path).build())
    }

    /// Create a table.
    ///
    /// With `create_exclusive` an existing table is an error; otherwise its
    /// rows are kept and its columns replaced.
    pub fn create(&self, name: &str, columns: Vec<String>) -> Result<FileTable> {
        if self.config.create_exclusive && self.exists(name)? {
            return Err(TableError::TableExists(name.to_string()));
        }
        FileTable::create(&self.config, name, columns)
    }

    pub fn open_table(&self, name: &str) -> Result<FileTable> {
        FileTable::open(&self.config, name)
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        storage::check_table_name(name)?;
        Ok(FileTable::exists(&self.config, name))
    }

    /// Names of all tables, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.config.base_dir)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if FileTable::exists(&self.config, &name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a table and all its files. Returns `false` if it did not exist.
    pub fn drop_table(&self, name: &str) -> Result<bool> {
        if !self.exists(name)? {
            return Ok(false);
        }
        fs::remove_dir_all(self.config.base_dir.join(name))?;
        info!(table = name, "dropped table");
        Ok(true)
    }

    /// Copy a stored table into a new in-memory table of the same name
    pub fn load(&self, name: &str) -> Result<MemTable> {
        let stored = self.open_table(name)?;
        let mut memory = MemTable::new(stored.name(), stored.columns().to_vec())?;
        let copied = copy_rows(&stored, &mut memory)?;
        info!(table = name, rows = copied, "loaded table into memory");
        Ok(memory)
    }

    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
