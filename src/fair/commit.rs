//! Commit-Reveal Protocol
//!
//! The operator commits to a secret seed by publishing `sha256(seed)` before
//! any die is rolled, then reveals the seed once rolls are derived. Anyone can
//! re-hash the revealed seed against the published commitment and recompute
//! every roll, so the outcome cannot be altered after the commit without
//! detection.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::core::dice::DiceType;
use crate::core::hash::{digest_mod, hash_bytes, sha256_hex};

/// Phase passed to [`derive_roll`] for the initial roll of a round.
///
/// A tied round may be re-rolled; callers can bump the phase to obtain an
/// independent derivation from the same committed seed.
pub const ROLL_PHASE_INITIAL: u32 = 1;

/// A committed seed: the secret and its published hash.
///
/// The `seed` field must never reach a public view until the round enters
/// rolling or finished; only `commit` is published at lock time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Commitment {
    /// Secret seed, withheld until reveal.
    pub seed: String,
    /// Hex-encoded `sha256(seed)`, published immediately.
    pub commit: String,
}

impl Commitment {
    /// Commit to a caller-supplied seed.
    pub fn from_seed(seed: String) -> Self {
        let commit = sha256_hex(&seed);
        Self { seed, commit }
    }

    /// Commit to a freshly generated unpredictable seed.
    pub fn generate() -> Self {
        Self::from_seed(generate_seed())
    }

    /// Check that the stored seed still hashes to the published commitment.
    ///
    /// The engine trusts its own commitment, but verifying the equality before
    /// reveal is a cheap consistency check the audit path relies on.
    pub fn verify(&self) -> bool {
        sha256_hex(&self.seed) == self.commit
    }
}

/// Generate an unpredictable seed string.
///
/// 16 random bytes, hex encoded. This is a request for unpredictability, not
/// a hardened RNG; see the crate-level non-goals.
pub fn generate_seed() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Derive a player's roll from the committed seed.
///
/// `value = 1 + (int_be(sha256("{seed}|{round_id}|{player_id}|{phase}")) mod sides)`
///
/// Deterministic and reproducible by anyone holding the revealed seed. The
/// die's side count is applied only in the modulo step, not in the hash input.
/// The modular reduction carries a negligible bias toward low faces
/// (2^256 is not a multiple of any supported side count); it is documented
/// here rather than corrected.
pub fn derive_roll(seed: &str, round_id: u64, player_id: i64, dice: DiceType, phase: u32) -> u32 {
    let preimage = format!("{seed}|{round_id}|{player_id}|{phase}");
    let digest = hash_bytes(preimage.as_bytes());
    1 + digest_mod(&digest, dice.sides() as u64) as u32
}

// =============================================================================
// TESTS
// =============================================================================
