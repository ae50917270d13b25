//! Content hashing utilities.

use xxhash_rust::xxh3::xxh3_64;

/// Compute a content hash for arbitrary bytes
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Derive a stable synthetic element identifier from a source identifier.
///
/// Repeated conversion of the same document must yield identical IDs, so the
/// derivation is a pure function of the source string.
pub fn synthetic_id(source: &str) -> String {
    format!("el-{:016x}", xxh3_64(source.as_bytes()))
}
