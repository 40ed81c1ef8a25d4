//! Backend-agnostic derived tables, built from `Table::rows`.

use tracing::debug;

use crate::error::{Result, TableError};
use crate::memtable::MemTable;
use crate::row::Scalar;

use super::Table;

/// Build an in-memory table holding the rows whose `column` equals `value`.
///
/// The first column is the key, matched against `Scalar::String(key)`.
/// The result is named `"<name> Filtered"` and has the same columns.
pub fn filter(table: &dyn Table, column: &str, value: &Scalar) -> Result<MemTable> {
    let index = table
        .columns()
        .iter()
        .position(|c| c == column)
        .ok_or_else(|| TableError::InvalidArgument(format!("column not found: {}", column)))?;

    let mut filtered = MemTable::new(format!("{} Filtered", table.name()), table.columns().to_vec())?;

    for row in table.rows()? {
        let row = row?;
        let matches = if index == 0 {
            matches!(value, Scalar::String(s) if *s == row.key)
        } else {
            row.fields.get(index - 1) == Some(value)
        };
        if matches {
            filtered.put(&row.key, row.fields)?;
        }
    }

    debug!(
        source = table.name(),
        column,
        kept = filtered.len(),
        "filtered table"
    );
    Ok(filtered)
}

/// Put every row of `from` into `into`, returning how many rows were copied.
///
/// Both tables must have the same degree; rows already in `into` are replaced.
pub fn copy_rows(from: &dyn Table, into: &mut dyn Table) -> Result<usize> {
    if from.degree() != into.degree() {
        return Err(TableError::InvalidArgument(format!(
            "cannot copy degree {} rows into a degree {} table",
            from.degree(),
            into.degree()
        )));
    }

    let mut copied = 0;
    for row in from.rows()? {
        let row = row?;
        into.put(&row.key, row.fields)?;
        copied += 1;
    }
    Ok(copied)
}
