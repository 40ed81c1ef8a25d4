//! MemTable Module
//!
//! In-memory table using open addressing.
//!
//! ## Responsibilities
//! - Resolve a key to a slot with a salted FNV hash and quadratic probing
//! - Lazy deletion: removed rows leave a tombstone that lookups skip
//! - Grow through prime capacities once the load factor reaches 0.75
//! - Keep size and fingerprint in step with every mutation
//!
//! ## Data Structure Choice
//! A flat `Vec<Slot>` owned by the table. Each slot exclusively owns its
//! row; indices come from [`probe::ProbeSequence`].

pub mod probe;
mod table;

pub use table::MemTable;

use crate::row::Row;

/// State of one slot in the backing array
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    /// Never used since the last rehash; ends a lookup probe
    #[default]
    Empty,

    /// A removed row; lookups continue past it, inserts may reuse it
    Tombstone,

    /// A live row
    Occupied(Row),
}

impl Slot {
    pub fn row(&self) -> Option<&Row> {
        match self {
            Slot::Occupied(row) => Some(row),
            _ => None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }
}
