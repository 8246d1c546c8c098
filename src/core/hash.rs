//! SHA-256 Helpers
//!
//! Thin wrappers around SHA-256 used by the commit-reveal protocol:
//! - hex-encoded commit hashes (published before the seed is revealed)
//! - raw digests for roll derivation

use sha2::{Digest, Sha256};

/// Raw hash output (256 bits / 32 bytes).
pub type HashBytes = [u8; 32];

/// Compute the SHA-256 digest of arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> HashBytes {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the SHA-256 digest of a string and return it hex-encoded.
///
/// This is the commit function: `commit = sha256_hex(seed)`.
pub fn sha256_hex(s: &str) -> String {
    hex::encode(hash_bytes(s.as_bytes()))
}

/// Reduce a 256-bit digest, interpreted as a big-endian unsigned integer,
/// modulo `m`.
///
/// Folding byte by byte is equivalent to `int(digest) % m` without needing
/// a big-integer type.
pub fn digest_mod(digest: &HashBytes, m: u64) -> u64 {
    debug_assert!(m > 0);
    let mut acc: u64 = 0;
    for byte in digest {
        acc = (acc.wrapping_mul(256).wrapping_add(*byte as u64)) % m;
    }
    acc
}

// =============================================================================
// TESTS
// =============================================================================
