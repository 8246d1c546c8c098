//! Dice Types and Stake Tiers
//!
//! Maps a player's stake to the die they roll with. Bigger stakes buy dice
//! with more sides. Tier bounds are half-open: lower bound inclusive,
//! upper bound exclusive.

use serde::{Deserialize, Serialize};

/// A die type, named by its side count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiceType {
    /// Six-sided die (stakes below 10, the floor tier).
    D6,
    /// Eight-sided die (stakes in [10, 50)).
    D8,
    /// Twelve-sided die (stakes in [50, 200)).
    D12,
    /// Twenty-sided die (stakes of 200 and above).
    D20,
}

impl DiceType {
    /// Number of sides on this die.
    #[inline]
    pub fn sides(self) -> u32 {
        match self {
            DiceType::D6 => 6,
            DiceType::D8 => 8,
            DiceType::D12 => 12,
            DiceType::D20 => 20,
        }
    }
}

impl std::fmt::Display for DiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}", self.sides())
    }
}

/// Resolve a stake amount to its dice tier.
///
/// Tiers: `[1, 10) -> D6`, `[10, 50) -> D8`, `[50, 200) -> D12`,
/// `[200, inf) -> D20`. Stakes below 1 also fall through to D6; that is the
/// observed legacy fallback and is kept for compatibility.
pub fn pick_dice(stake: f64) -> DiceType {
    if stake >= 200.0 {
        DiceType::D20
    } else if stake >= 50.0 {
        DiceType::D12
    } else if stake >= 10.0 {
        DiceType::D8
    } else {
        DiceType::D6
    }
}

// =============================================================================
// TESTS
// =============================================================================
