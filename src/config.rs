//! Configuration for tablekv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for file-backed tables
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory holding one subdirectory per table
    /// Internal structure:
    ///   {base_dir}/
    ///     └── {table}/
    ///           ├── metadata/   (columns, size, fingerprint)
    ///           └── data/       (sharded row files)
    pub base_dir: PathBuf,

    /// fsync row and ledger files after every write
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Catalog Configuration
    // -------------------------------------------------------------------------
    /// Fail `Catalog::create` when the table directory already exists
    /// (otherwise creation reuses the existing rows and counters)
    pub create_exclusive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./tablekv_data"),
            sync_writes: false,
            create_exclusive: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the base directory (root for all tables)
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.base_dir = path.into();
        self
    }

    /// Enable or disable fsync after every file write
    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.config.sync_writes = enabled;
        self
    }

    /// Make `Catalog::create` refuse to reuse an existing table
    pub fn create_exclusive(mut self, enabled: bool) -> Self {
        self.config.create_exclusive = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
