//! MemTable implementation
//!
//! Quadratic-probing hash table over a `Vec<Slot>`.

use std::fmt;
use std::mem;

use tracing::debug;

use crate::error::{Result, TableError};
use crate::row::{Row, Scalar};
use crate::table::{self, Rows, Table};

use super::probe::{self, ProbeSequence, CAPACITY_SCHEDULE};
use super::Slot;

/// Grow before a new row would bring the load factor to this value or above
pub const MAX_LOAD_FACTOR: f64 = 0.75;

/// Where an insert for a key lands
enum Placement {
    /// The key is already resident at this index
    Existing(usize),
    /// First reusable tombstone on the probe path, else the empty slot ending it
    Vacant(usize),
}

/// In-memory table with open addressing and tombstone deletion
#[derive(Debug, Clone)]
pub struct MemTable {
    name: String,
    columns: Vec<String>,
    slots: Vec<Slot>,
    /// Live rows
    size: usize,
    tombstones: usize,
    fingerprint: i32,
}

impl MemTable {
    /// Create an empty table at the first scheduled capacity
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Result<Self> {
        Self::with_capacity(name, columns, CAPACITY_SCHEDULE[0])
    }

    /// Create an empty table with an explicit starting capacity.
    ///
    /// `capacity` must be a prime congruent to 3 mod 4.
    pub fn with_capacity(
        name: impl Into<String>,
        columns: Vec<String>,
        capacity: usize,
    ) -> Result<Self> {
        table::check_columns(&columns)?;
        probe::validate_capacity(capacity)?;

        Ok(Self {
            name: name.into(),
            columns,
            slots: empty_slots(capacity),
            size: 0,
            tombstones: 0,
            fingerprint: 0,
        })
    }

    /// Number of slots in the backing array
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live rows; same as `Table::size` without the `Result`
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity() as f64
    }

    /// Number of slots currently holding a tombstone
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Fingerprint without the `Result`
    pub fn checksum(&self) -> i32 {
        self.fingerprint
    }

    /// Live rows in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Row> + '_ {
        self.slots.iter().filter_map(Slot::row)
    }

    /// Raw slot states, for inspecting probe behaviour
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Index of the live row stored under `key`
    fn find(&self, key: &str) -> Option<usize> {
        for index in ProbeSequence::for_key(key, self.capacity()) {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Tombstone => continue,
                Slot::Occupied(row) if row.key == key => return Some(index),
                Slot::Occupied(_) => {}
            }
        }
        None
    }

    fn placement(&self, key: &str) -> Option<Placement> {
        let mut reusable = None;
        for index in ProbeSequence::for_key(key, self.capacity()) {
            match &self.slots[index] {
                Slot::Empty => return Some(Placement::Vacant(reusable.unwrap_or(index))),
                Slot::Tombstone => {
                    reusable.get_or_insert(index);
                }
                Slot::Occupied(row) if row.key == key => return Some(Placement::Existing(index)),
                Slot::Occupied(_) => {}
            }
        }
        reusable.map(Placement::Vacant)
    }

    /// Insert or replace without a load check (shared by put and rehash)
    fn place(&mut self, row: Row) -> Result<Option<Vec<Scalar>>> {
        let new_hash = row.hash32();

        match self.placement(&row.key) {
            Some(Placement::Existing(index)) => {
                match mem::replace(&mut self.slots[index], Slot::Occupied(row)) {
                    Slot::Occupied(old) => {
                        self.fingerprint = self
                            .fingerprint
                            .wrapping_sub(old.hash32())
                            .wrapping_add(new_hash);
                        Ok(Some(old.fields))
                    }
                    _ => Err(TableError::InvariantViolation(format!(
                        "slot {} changed state during replace",
                        index
                    ))),
                }
            }
            Some(Placement::Vacant(index)) => {
                if let Slot::Tombstone = mem::replace(&mut self.slots[index], Slot::Occupied(row)) {
                    self.tombstones -= 1;
                }
                self.size += 1;
                self.fingerprint = self.fingerprint.wrapping_add(new_hash);
                Ok(None)
            }
            None => Err(TableError::InvariantViolation(format!(
                "probe sequence exhausted: no free slot among {} (size {})",
                self.capacity(),
                self.size
            ))),
        }
    }

    /// Move every live row into the next scheduled capacity; tombstones are dropped
    fn rehash(&mut self) -> Result<()> {
        let old_capacity = self.capacity();
        let new_capacity = probe::next_capacity(old_capacity);
        let old_slots = mem::replace(&mut self.slots, empty_slots(new_capacity));

        self.size = 0;
        self.tombstones = 0;
        self.fingerprint = 0;

        for slot in old_slots {
            if let Slot::Occupied(row) = slot {
                self.place(row)?;
            }
        }

        debug!(
            table = %self.name,
            old_capacity,
            new_capacity,
            rows = self.size,
            "rehashed"
        );
        Ok(())
    }
}

impl Table for MemTable {
    fn put(&mut self, key: &str, fields: Vec<Scalar>) -> Result<Option<Vec<Scalar>>> {
        table::check_row(key, &fields, self.degree())?;

        // Only a new row counts toward the load; a replace never grows
        let adds_row = !matches!(self.placement(key), Some(Placement::Existing(_)));
        if adds_row && (self.size + 1) as f64 / self.capacity() as f64 >= MAX_LOAD_FACTOR {
            self.rehash()?;
        }

        // place re-probes, so the slot is resolved against the current capacity
        self.place(Row::new(key, fields))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<Scalar>>> {
        table::check_key(key)?;
        Ok(self
            .find(key)
            .and_then(|index| self.slots[index].row())
            .map(|row| row.fields.clone()))
    }

    fn remove(&mut self, key: &str) -> Result<Option<Vec<Scalar>>> {
        table::check_key(key)?;
        let Some(index) = self.find(key) else {
            return Ok(None);
        };

        match mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied(old) => {
                self.size -= 1;
                self.tombstones += 1;
                self.fingerprint = self.fingerprint.wrapping_sub(old.hash32());
                Ok(Some(old.fields))
            }
            other => {
                self.slots[index] = other;
                Err(TableError::InvariantViolation(format!(
                    "slot {} matched a key but holds no row",
                    index
                )))
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        self.slots = empty_slots(CAPACITY_SCHEDULE[0]);
        self.size = 0;
        self.tombstones = 0;
        self.fingerprint = 0;
        Ok(())
    }

    fn size(&self) -> Result<usize> {
        Ok(self.size)
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fingerprint(&self) -> Result<i32> {
        Ok(self.fingerprint)
    }

    fn rows(&self) -> Result<Rows<'_>> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }
}

/// Fingerprint equality, as with [`Table::equals`]
impl PartialEq for MemTable {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl fmt::Display for MemTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = table::render(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

fn empty_slots(capacity: usize) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, Slot::default);
    slots
}
