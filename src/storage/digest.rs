//! Key digests and shard paths
//!
//! A key maps to `blake3(SALT || key)` rendered as 64 lowercase hex chars.
//! The first two chars name the shard directory, the rest the row file:
//!
//! ```text
//! "k" ──blake3──▶ "3fa9c1...e07b" ──▶ data/3f/a9c1...e07b
//! ```

use std::path::{Path, PathBuf};

/// Mixed into every key digest
pub const DIGEST_SALT: &[u8] = b"tablekv/row-key/v1";

/// Hex characters used for the shard directory name (at most 256 shards)
pub const SHARD_PREFIX_LEN: usize = 2;

/// Length of a rendered digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Salted digest of `key` as lowercase hex
pub fn digest_key(key: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DIGEST_SALT);
    hasher.update(key.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Row file path for a digest, relative to the data directory
pub fn shard_path(digest: &str) -> PathBuf {
    let (shard, rest) = digest.split_at(SHARD_PREFIX_LEN);
    Path::new(shard).join(rest)
}

/// Reassemble the digest from a row file path relative to the data
/// directory. Returns `None` for anything that is not a shard/file pair of
/// hex names.
pub fn digest_from_path(relative: &Path) -> Option<String> {
    let mut parts = relative.iter();
    let shard = parts.next()?.to_str()?;
    let rest = parts.next()?.to_str()?;
    if parts.next().is_some() || shard.len() != SHARD_PREFIX_LEN {
        return None;
    }

    let digest = format!("{}{}", shard, rest);
    let is_hex = digest
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    (digest.len() == DIGEST_HEX_LEN && is_hex).then_some(digest)
}
