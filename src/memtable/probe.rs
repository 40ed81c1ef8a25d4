//! Probe arithmetic for the open-addressing table
//!
//! ## Probe Sequence
//! For a home slot `h` and attempt `j = 0, 1, 2, ...`:
//! ```text
//! index(j) = floor_mod(h + sign(j) * j², capacity)     sign(j) = +1 (j even), -1 (j odd)
//! ```
//! When `capacity` is a prime `p ≡ 3 (mod 4)`, the first `capacity` indices
//! are a permutation of `0..capacity`, so a probe always finds a free slot if
//! one exists. Any other capacity is rejected.

use crate::error::{Result, TableError};

/// Capacities the table grows through, every one a prime `≡ 3 (mod 4)`
pub const CAPACITY_SCHEDULE: [usize; 9] = [7, 19, 43, 83, 167, 331, 683, 991, 1999];

/// Appended to every key before hashing
pub const HASH_SALT: &str = "Haufe";

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1 over the UTF-16 code units of `key` followed by the salt
pub fn hash_key(key: &str) -> i32 {
    key.encode_utf16()
        .chain(HASH_SALT.encode_utf16())
        .fold(FNV_OFFSET_BASIS, |hash, unit| {
            (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
        }) as i32
}

/// Home slot of `key` in a table of `capacity` slots, always in `[0, capacity)`
pub fn home_slot(key: &str, capacity: usize) -> usize {
    floor_mod(i64::from(hash_key(key)), capacity)
}

/// Capacity to grow to from `current`.
///
/// Follows [`CAPACITY_SCHEDULE`]; past its end, the smallest valid capacity
/// greater than twice the current one.
pub fn next_capacity(current: usize) -> usize {
    CAPACITY_SCHEDULE
        .iter()
        .copied()
        .find(|&p| p > current)
        .unwrap_or_else(|| {
            let mut candidate = current * 2 + 1;
            while !is_valid_capacity(candidate) {
                candidate += 1;
            }
            candidate
        })
}

/// A prime congruent to 3 mod 4
pub fn is_valid_capacity(capacity: usize) -> bool {
    capacity % 4 == 3 && is_prime(capacity)
}

pub fn validate_capacity(capacity: usize) -> Result<()> {
    if !is_valid_capacity(capacity) {
        return Err(TableError::InvalidArgument(format!(
            "capacity {} is not a prime congruent to 3 mod 4",
            capacity
        )));
    }
    Ok(())
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

fn floor_mod(value: i64, modulus: usize) -> usize {
    value.rem_euclid(modulus as i64) as usize
}

/// Slot indices visited for one key, `capacity` of them, each exactly once
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    home: i64,
    capacity: usize,
    attempt: usize,
}

impl ProbeSequence {
    /// Probe from `home` in a table of `capacity` slots.
    ///
    /// Fails if `capacity` is not a prime `≡ 3 (mod 4)`.
    pub fn new(home: usize, capacity: usize) -> Result<Self> {
        validate_capacity(capacity)?;
        Ok(Self::unchecked(home, capacity))
    }

    /// Probe for `key`; the caller guarantees `capacity` is valid
    pub(crate) fn for_key(key: &str, capacity: usize) -> Self {
        Self::unchecked(home_slot(key, capacity), capacity)
    }

    fn unchecked(home: usize, capacity: usize) -> Self {
        Self {
            home: home as i64,
            capacity,
            attempt: 0,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.attempt >= self.capacity {
            return None;
        }
        let j = self.attempt as i64;
        let offset = if j % 2 == 0 { j * j } else { -(j * j) };
        self.attempt += 1;
        Some(floor_mod(self.home + offset, self.capacity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.capacity - self.attempt;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ProbeSequence {}
