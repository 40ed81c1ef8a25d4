//! # tablekv
//!
//! Named, fixed-degree tables of keyed rows behind one `Table` contract:
//! - `MemTable`: open addressing with quadratic probing, tombstone deletion
//!   and prime-sized growth
//! - `FileTable`: one file per row, sharded by a salted BLAKE3 digest of the
//!   key, with row count and fingerprint kept in a metadata ledger
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Table contract (trait Table)                │
//! │        put / get / remove / clear / rows / fingerprint      │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │                               │
//!                ▼                               ▼
//!   ┌─────────────────────────┐     ┌─────────────────────────────┐
//!   │        MemTable         │     │          FileTable          │
//!   │  Vec<Slot> + probing    │     │  digest → data/ab/cdef...   │
//!   └─────────────────────────┘     └──────────────┬──────────────┘
//!                                                  │
//!                                   ┌──────────────┴──────────────┐
//!                                   ▼                             ▼
//!                            ┌─────────────┐              ┌─────────────┐
//!                            │  Row codec  │              │   Ledger    │
//!                            │ (row files) │              │ size / fp   │
//!                            └─────────────┘              └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tablekv::{fields, MemTable, Table};
//!
//! let mut t = MemTable::new("demo", vec!["a".into(), "b".into()]).unwrap();
//! assert_eq!(t.put("x", fields![1]).unwrap(), None);
//! assert_eq!(t.put("x", fields![2]).unwrap(), Some(fields![1]));
//! assert_eq!(t.remove("x").unwrap(), Some(fields![2]));
//! assert_eq!(t.size().unwrap(), 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod row;
pub mod table;
pub mod memtable;
pub mod storage;
pub mod catalog;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TableError, Result};
pub use config::Config;
pub use row::{Row, Scalar};
pub use table::{Rows, Table};
pub use memtable::MemTable;
pub use storage::FileTable;
pub use catalog::Catalog;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tablekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
