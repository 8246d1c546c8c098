//! Core deterministic primitives.
//!
//! Pure functions with no I/O and no shared state. Everything the fairness
//! guarantee rests on lives here or in `fair`.

pub mod dice;
pub mod hash;

// Re-export core types
pub use dice::{pick_dice, DiceType};
pub use hash::{digest_mod, hash_bytes, sha256_hex};
