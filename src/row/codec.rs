//! Row codec
//!
//! Binary encoding for rows, column lists and ledger counters. Every file a
//! table persists goes through these functions.
//!
//! ## Format (all integers big-endian)
//! ```text
//! string  ┌──────────┬──────────────┐
//!         │ Len u16  │ UTF-8 bytes  │
//!         └──────────┴──────────────┘
//!
//! row     ┌──────────┬───────────────┬─────────────────────────────┐
//!         │ key str  │ Count i32     │ (tag str, payload) x Count  │
//!         └──────────┴───────────────┴─────────────────────────────┘
//!
//! tag        payload
//! "String"   str
//! "Integer"  i32
//! "Double"   f64 (IEEE-754 bits)
//! "Boolean"  u8 (0 or 1)
//! "null"     (none)
//!
//! columns ┌───────────┬────────────────┐
//!         │ Count i32 │ str x Count    │
//!         └───────────┴────────────────┘
//! ```
//!
//! Encoders build one contiguous buffer so each file is written with a
//! single `write_all`. Decoders reject truncated input, unknown tags and
//! trailing bytes as [`TableError::Corruption`].

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, TableError};

use super::{Row, Scalar};

/// Longest string (in bytes) the u16 length prefix can describe
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

const TAG_STRING: &str = "String";
const TAG_INTEGER: &str = "Integer";
const TAG_DOUBLE: &str = "Double";
const TAG_BOOLEAN: &str = "Boolean";
const TAG_NULL: &str = "null";

// =============================================================================
// Rows
// =============================================================================

/// Encode a row into its file representation
pub fn encode_row(row: &Row) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(64);
    put_str(&mut buf, &row.key)?;
    put_count(&mut buf, row.fields.len())?;

    for field in &row.fields {
        put_str(&mut buf, field.type_name())?;
        match field {
            Scalar::String(s) => put_str(&mut buf, s)?,
            Scalar::Integer(n) => buf.put_i32(*n),
            Scalar::Float64(x) => buf.put_f64(*x),
            Scalar::Boolean(b) => buf.put_u8(u8::from(*b)),
            Scalar::Null => {}
        }
    }

    Ok(buf.freeze())
}

/// Decode a row from its file representation
pub fn decode_row(data: &[u8]) -> Result<Row> {
    let mut buf = data;
    let key = get_str(&mut buf, "row key")?;
    let count = get_count(&mut buf, "field count")?;

    // Cap the preallocation: the count comes from disk
    let mut fields = Vec::with_capacity(count.min(64));
    for i in 0..count {
        let tag = get_str(&mut buf, "field tag")?;
        let field = match tag.as_str() {
            TAG_STRING => Scalar::String(get_str(&mut buf, "string field")?),
            TAG_INTEGER => {
                ensure(&buf, 4, "integer field")?;
                Scalar::Integer(buf.get_i32())
            }
            TAG_DOUBLE => {
                ensure(&buf, 8, "double field")?;
                Scalar::Float64(buf.get_f64())
            }
            TAG_BOOLEAN => {
                ensure(&buf, 1, "boolean field")?;
                match buf.get_u8() {
                    0 => Scalar::Boolean(false),
                    1 => Scalar::Boolean(true),
                    other => {
                        return Err(TableError::corrupt(format!(
                            "field {} has invalid boolean byte {}",
                            i, other
                        )))
                    }
                }
            }
            TAG_NULL => Scalar::Null,
            other => {
                return Err(TableError::corrupt(format!(
                    "field {} has unknown type tag {:?}",
                    i, other
                )))
            }
        };
        fields.push(field);
    }

    ensure_consumed(&buf, "row")?;
    Ok(Row { key, fields })
}

// =============================================================================
// Columns and Counters
// =============================================================================

/// Encode an ordered column list
pub fn encode_columns(columns: &[String]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(4 + columns.len() * 16);
    put_count(&mut buf, columns.len())?;
    for column in columns {
        put_str(&mut buf, column)?;
    }
    Ok(buf.freeze())
}

/// Decode an ordered column list
pub fn decode_columns(data: &[u8]) -> Result<Vec<String>> {
    let mut buf = data;
    let count = get_count(&mut buf, "column count")?;
    let mut columns = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        columns.push(get_str(&mut buf, "column name")?);
    }
    ensure_consumed(&buf, "columns")?;
    Ok(columns)
}

/// Encode a 4-byte signed counter
pub fn encode_i32(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode a 4-byte signed counter
pub fn decode_i32(data: &[u8]) -> Result<i32> {
    let bytes: [u8; 4] = data.try_into().map_err(|_| {
        TableError::corrupt(format!("expected 4-byte counter, got {} bytes", data.len()))
    })?;
    Ok(i32::from_be_bytes(bytes))
}

// =============================================================================
// Private Helpers
// =============================================================================

fn put_str(buf: &mut BytesMut, s: &str) -> Result<()> {
    let len = u16::try_from(s.len()).map_err(|_| {
        TableError::invalid(format!(
            "string of {} bytes exceeds the {} byte limit",
            s.len(),
            MAX_STRING_LEN
        ))
    })?;
    buf.put_u16(len);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn put_count(buf: &mut BytesMut, count: usize) -> Result<()> {
    let count = i32::try_from(count)
        .map_err(|_| TableError::invalid(format!("count {} does not fit in i32", count)))?;
    buf.put_i32(count);
    Ok(())
}

fn get_str(buf: &mut &[u8], what: &str) -> Result<String> {
    ensure(buf, 2, what)?;
    let len = buf.get_u16() as usize;
    ensure(buf, len, what)?;
    let bytes = buf.copy_to_bytes(len);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| TableError::corrupt(format!("{} is not valid UTF-8: {}", what, e)))
}

fn get_count(buf: &mut &[u8], what: &str) -> Result<usize> {
    ensure(buf, 4, what)?;
    let count = buf.get_i32();
    usize::try_from(count)
        .map_err(|_| TableError::corrupt(format!("{} is negative: {}", what, count)))
}

fn ensure(buf: &&[u8], needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(TableError::corrupt(format!(
            "truncated {}: need {} bytes, have {}",
            what,
            needed,
            buf.remaining()
        )));
    }
    Ok(())
}

fn ensure_consumed(buf: &&[u8], what: &str) -> Result<()> {
    if buf.has_remaining() {
        return Err(TableError::corrupt(format!(
            "{} trailing bytes after {}",
            buf.remaining(),
            what
        )));
    }
    Ok(())
}
