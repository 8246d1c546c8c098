//! Provable Fairness
//!
//! Commit-reveal randomness: the seed is committed before the round locks in
//! any outcome and revealed once rolls are derived, making every published
//! roll independently auditable.

pub mod commit;

pub use commit::{derive_roll, generate_seed, Commitment, ROLL_PHASE_INITIAL};
