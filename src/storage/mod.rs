//! Storage Module
//!
//! Durable, file-backed tables using content-addressed sharding.
//!
//! ## Responsibilities
//! - One file per row, located by a salted digest of its key
//! - Bounded directory fan-out: at most 256 shard directories
//! - Row count and fingerprint kept in a ledger beside the rows
//! - Full traversal for iteration (filesystem order, not key order)
//!
//! ## Layout
//! ```text
//! {base_dir}/{table}/
//! ├── metadata/
//! │   ├── columns       i32 count + length-prefixed names
//! │   ├── size          i32 row count
//! │   └── fingerprint   i32 wrapping sum of row hashes
//! └── data/
//!     ├── 3f/
//!     │   └── a9c1...e07b   one encoded row (see `row::codec`)
//!     └── ...
//! ```
//!
//! ## Consistency
//! The row write and the ledger write are independent. A crash between them
//! leaves `size`/`fingerprint` out of step with the row files; nothing
//! repairs this automatically.

pub mod digest;
mod ledger;
mod table;

pub use ledger::Ledger;
pub use table::{FileTable, LedgerAudit};

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, TableError};

/// Replace the contents of `path` with `data` in one write
pub(crate) fn write_file(path: &Path, data: &[u8], sync: bool) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}

/// A table name must be usable as a single directory name
pub(crate) fn check_table_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(TableError::InvalidArgument(format!(
            "invalid table name {:?}",
            name
        )));
    }
    Ok(())
}
