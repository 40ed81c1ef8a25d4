//! Row Module
//!
//! The value stored by every table: a key plus an ordered list of scalars.
//!
//! ## Hashing
//! Each row has a 32-bit hash, `hash(key) ^ hash(fields)`, summed with
//! wrapping arithmetic into a table's fingerprint. The hash must be identical
//! across processes because file-backed tables persist the fingerprint:
//!
//! ```text
//! string  h = 31*h + unit      (UTF-16 code units, starting at 0)
//! fields  h = 31*h + hash(f)   (starting at 1)
//! Integer value
//! Float64 bits ^ (bits >> 32)
//! Boolean 1231 / 1237
//! Null    0
//! ```

pub mod codec;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A single typed field value
#[derive(Debug, Clone)]
pub enum Scalar {
    String(String),
    Integer(i32),
    Float64(f64),
    Boolean(bool),
    Null,
}

impl Scalar {
    /// Order- and value-sensitive 32-bit hash
    pub fn hash32(&self) -> i32 {
        match self {
            Scalar::String(s) => string_hash(s),
            Scalar::Integer(n) => *n,
            Scalar::Float64(f) => {
                // all NaNs hash alike
                let bits = if f.is_nan() { f64::NAN.to_bits() } else { f.to_bits() };
                (bits ^ (bits >> 32)) as i32
            }
            Scalar::Boolean(true) => 1231,
            Scalar::Boolean(false) => 1237,
            Scalar::Null => 0,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Name of the variant as written in row files
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "String",
            Scalar::Integer(_) => "Integer",
            Scalar::Float64(_) => "Double",
            Scalar::Boolean(_) => "Boolean",
            Scalar::Null => "null",
        }
    }
}

/// Agrees with [`Scalar::hash32`]: floats compare by bit pattern with every
/// NaN equal to every other, so `0.0 != -0.0` and a decoded NaN equals the
/// value that was encoded.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::String(a), Scalar::String(b)) => a == b,
            (Scalar::Integer(a), Scalar::Integer(b)) => a == b,
            (Scalar::Float64(a), Scalar::Float64(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Scalar::Boolean(a), Scalar::Boolean(b)) => a == b,
            (Scalar::Null, Scalar::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Integer(n) => write!(f, "{}", n),
            Scalar::Float64(x) => write!(f, "{:?}", x),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Null => f.write_str("null"),
        }
    }
}

/// Parses a command-line literal: `null`, `true`/`false`, an i32, an f64,
/// otherwise the text itself as a string.
impl FromStr for Scalar {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "null" => Scalar::Null,
            "true" => Scalar::Boolean(true),
            "false" => Scalar::Boolean(false),
            _ => {
                if let Ok(n) = s.parse::<i32>() {
                    Scalar::Integer(n)
                } else if let Ok(x) = s.parse::<f64>() {
                    Scalar::Float64(x)
                } else {
                    Scalar::String(s.to_string())
                }
            }
        })
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Integer(n)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float64(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// A key and its ordered field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub fields: Vec<Scalar>,
}

impl Row {
    pub fn new(key: impl Into<String>, fields: Vec<Scalar>) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }

    /// `hash(key) ^ hash(fields)`; the unit summed into table fingerprints
    pub fn hash32(&self) -> i32 {
        string_hash(&self.key) ^ fields_hash(&self.fields)
    }

    pub fn into_fields(self) -> Vec<Scalar> {
        self.fields
    }
}

/// Polynomial hash over the UTF-16 code units of `s`
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Order-sensitive hash over a field list
pub fn fields_hash(fields: &[Scalar]) -> i32 {
    fields
        .iter()
        .fold(1i32, |h, field| h.wrapping_mul(31).wrapping_add(field.hash32()))
}

/// Shorthand for building field lists in tests and examples
///
/// ```
/// use tablekv::{fields, row::Scalar};
///
/// let f = fields!["club", 230, 9.5, true, None::<i32>];
/// assert_eq!(f[4], Scalar::Null);
/// ```
#[macro_export]
macro_rules! fields {
    () => { Vec::<$crate::row::Scalar>::new() };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::row::Scalar::from($value)),+]
    };
}
