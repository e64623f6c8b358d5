//! Content hashing via xxh3.

use xxhash_rust::xxh3::{xxh3_64, Xxh3};

/// Compute the xxh3 64-bit hash of file content.
#[inline]
pub fn hash_content(content: &[u8]) -> u64 {
    xxh3_64(content)
}

/// Fixed-width lowercase hex form used in reports.
#[inline]
pub fn to_hex(hash: u64) -> String {
    format!("{hash:016x}")
}

/// Order-sensitive digest over `(path, fingerprint)` pairs.
///
/// Callers pass pairs sorted by path so the digest identifies the inventory,
/// not the order it was produced in.
pub fn inventory_digest<'a, I>(entries: I) -> u64
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut hasher = Xxh3::new();
    for (path, fingerprint) in entries {
        hasher.update(path.as_bytes());
        hasher.update(&[0]);
        hasher.update(fingerprint.as_bytes());
        hasher.update(&[b'\n']);
    }
    hasher.digest()
}
