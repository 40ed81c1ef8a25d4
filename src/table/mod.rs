//! Table Module
//!
//! The contract every storage engine implements.
//!
//! ## Responsibilities
//! - Mutate: `put`, `remove`, `clear`
//! - Read: `get`, `rows`
//! - Describe: `size`, `degree`, `columns`, `name`, `fingerprint`
//!
//! Derived operations (`filter`, `render`, `copy_rows`) are free functions
//! over `&dyn Table` so each engine only implements its own storage logic.

mod display;
mod filter;

pub use display::render;
pub use filter::{copy_rows, filter};

use crate::error::{Result, TableError};
use crate::row::{Row, Scalar};

/// One-shot, lazy sequence of rows produced by [`Table::rows`]
pub type Rows<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// A named, fixed-degree collection of keyed rows
pub trait Table {
    /// Insert or replace a row.
    ///
    /// Returns:
    /// - `Ok(None)` when the key was absent
    /// - `Ok(Some(old_fields))` when an existing row was replaced
    fn put(&mut self, key: &str, fields: Vec<Scalar>) -> Result<Option<Vec<Scalar>>>;

    /// Look up the fields stored under `key`
    fn get(&self, key: &str) -> Result<Option<Vec<Scalar>>>;

    /// Remove the row stored under `key`, returning its fields
    fn remove(&mut self, key: &str) -> Result<Option<Vec<Scalar>>>;

    /// Remove every row; columns are kept
    fn clear(&mut self) -> Result<()>;

    /// Number of live rows
    fn size(&self) -> Result<usize>;

    /// Number of columns, key included
    fn degree(&self) -> usize {
        self.columns().len()
    }

    fn columns(&self) -> &[String];

    fn name(&self) -> &str;

    /// Wrapping sum of the hashes of all live rows
    fn fingerprint(&self) -> Result<i32>;

    /// Iterate over all live rows. Order is engine-specific.
    fn rows(&self) -> Result<Rows<'_>>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.size()? == 0)
    }

    /// Fingerprint comparison.
    ///
    /// Distinct contents can collide; use only as a cheap probable-equality test.
    fn equals(&self, other: &dyn Table) -> Result<bool> {
        Ok(self.fingerprint()? == other.fingerprint()?)
    }
}

/// Reject empty keys and field lists of the wrong width
pub(crate) fn check_row(key: &str, fields: &[Scalar], degree: usize) -> Result<()> {
    check_key(key)?;
    if fields.len() + 1 != degree {
        return Err(TableError::InvalidArgument(format!(
            "expected {} fields for degree {}, got {}",
            degree.saturating_sub(1),
            degree,
            fields.len()
        )));
    }
    Ok(())
}

pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(TableError::invalid("key cannot be empty"));
    }
    Ok(())
}

/// Reject empty, blank or duplicate column names
pub(crate) fn check_columns(columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(TableError::invalid("a table needs at least one column"));
    }
    for (i, column) in columns.iter().enumerate() {
        if column.is_empty() {
            return Err(TableError::invalid(format!("column {} has an empty name", i)));
        }
        if columns[..i].contains(column) {
            return Err(TableError::invalid(format!("duplicate column {:?}", column)));
        }
    }
    Ok(())
}
