//! Round State Definitions
//!
//! The single `Round` aggregate and its public projection.
//! Uses BTreeMap so player iteration (and therefore logging and roll
//! derivation order) is deterministic.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::dice::DiceType;
use crate::fair::Commitment;

/// Unique player identifier. Opaque, positive, assigned by the front end.
pub type PlayerId = i64;

/// How many trailing log entries the public snapshot exposes.
pub const PUBLIC_LOG_LEN: usize = 20;

// =============================================================================
// PLAYER
// =============================================================================

/// A joined player. Stake and dice are frozen for the rest of the round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub username: String,
    /// Stake amount committed on join.
    pub stake: f64,
    /// Die assigned from the stake tier.
    pub dice: DiceType,
}

// =============================================================================
// ROUND STATUS
// =============================================================================

/// Lifecycle phase of a round.
///
/// `Collecting -> Locking -> Rolling -> Finished`; a tie keeps the round in
/// `Rolling` until another roll or a reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    /// Accepting joins.
    #[default]
    Collecting,
    /// Seed committed, no roll derived yet.
    Locking,
    /// Rolls derived; only reached without a winner (tie pending).
    Rolling,
    /// Single winner determined.
    Finished,
}

impl std::fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoundStatus::Collecting => "collecting",
            RoundStatus::Locking => "locking",
            RoundStatus::Rolling => "rolling",
            RoundStatus::Finished => "finished",
        };
        f.write_str(s)
    }
}

// =============================================================================
// ROUND
// =============================================================================

/// The round aggregate. Sole long-lived mutable object in the process;
/// only [`crate::game::engine::RoundEngine`] writes to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Round {
    /// Monotonically increasing round counter.
    pub round_id: u64,
    /// Current lifecycle phase.
    pub status: RoundStatus,
    /// Joined players, keyed by id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Committed seed, present from lock onward.
    pub commitment: Option<Commitment>,
    /// Derived rolls, present from the first roll onward.
    pub rolls: BTreeMap<PlayerId, u32>,
    /// Winning player, set exactly when `status == Finished`.
    pub winner: Option<PlayerId>,
    /// Sum of joined stakes; zeroed on payout and on reset.
    pub pot: f64,
    /// Ordered event log. Survives resets; public views see the tail.
    pub log: Vec<String>,
}

impl Round {
    /// Create the initial round.
    pub fn new(round_id: u64) -> Self {
        Self {
            round_id,
            status: RoundStatus::Collecting,
            players: BTreeMap::new(),
            commitment: None,
            rolls: BTreeMap::new(),
            winner: None,
            pot: 0.0,
            log: Vec::new(),
        }
    }

    /// Append a timestamped entry to the event log.
    pub fn push_log(&mut self, entry: impl AsRef<str>) {
        self.log
            .push(format!("{} {}", timestamp(), entry.as_ref()));
    }

    /// Whether the seed may appear in public views.
    fn seed_revealed(&self) -> bool {
        matches!(self.status, RoundStatus::Rolling | RoundStatus::Finished)
    }

    /// Project the externally observable state.
    ///
    /// This is the only path by which round state leaves the engine; the
    /// secret seed is included iff the round has reached reveal.
    pub fn public(&self) -> PublicRound {
        let reveal = if self.seed_revealed() {
            self.commitment.as_ref().map(|c| c.seed.clone())
        } else {
            None
        };
        let log_tail = self.log.len().saturating_sub(PUBLIC_LOG_LEN);
        PublicRound {
            round_id: self.round_id,
            status: self.status,
            commit: self.commitment.as_ref().map(|c| c.commit.clone()),
            reveal,
            players: self.players.values().cloned().collect(),
            rolls: self.rolls.clone(),
            winner: self.winner,
            pot: self.pot,
            log: self.log[log_tail..].to_vec(),
        }
    }

    /// Clear per-round state and advance to the next round id.
    ///
    /// The log is intentionally kept so the RESET entry and round history
    /// stay visible.
    pub fn reset(&mut self) {
        self.round_id += 1;
        self.status = RoundStatus::Collecting;
        self.players.clear();
        self.commitment = None;
        self.rolls.clear();
        self.winner = None;
        self.pot = 0.0;
    }
}

/// Current UTC time formatted for log entries (second precision).
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

// =============================================================================
// PUBLIC SNAPSHOT
// =============================================================================

/// Externally observable round state.
///
/// Serialized as-is on the HTTP surface and handed to the snapshot writer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicRound {
    /// Round counter.
    pub round_id: u64,
    /// Lifecycle phase.
    pub status: RoundStatus,
    /// Published commitment hash, if locked.
    pub commit: Option<String>,
    /// Revealed seed; `null` until the round reaches rolling or finished.
    pub reveal: Option<String>,
    /// Joined players.
    pub players: Vec<Player>,
    /// Derived rolls by player id.
    pub rolls: BTreeMap<PlayerId, u32>,
    /// Winner id, if finished.
    pub winner: Option<PlayerId>,
    /// Current pot.
    pub pot: f64,
    /// Last [`PUBLIC_LOG_LEN`] log entries.
    pub log: Vec<String>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_round() -> Round {
        let mut round = Round::new(1);
        round.commitment = Some(Commitment::from_seed("abcd".to_string()));
        round.status = RoundStatus::Locking;
        round
    }

    #[test]
    fn test_seed_hidden_until_reveal() {
        let mut round = locked_round();
        assert_eq!(round.public().reveal, None);
        assert!(round.public().commit.is_some());

        round.status = RoundStatus::Rolling;
        assert_eq!(round.public().reveal.as_deref(), Some("abcd"));

        round.status = RoundStatus::Finished;
        assert_eq!(round.public().reveal.as_deref(), Some("abcd"));
    }

    #[test]
    fn test_seed_never_in_serialized_snapshot_before_reveal() {
        let round = locked_round();
        let json = serde_json::to_string(&round.public()).unwrap();
        assert!(!json.contains("abcd"));
    }

    #[test]
    fn test_public_log_capped_to_tail() {
        let mut round = Round::new(1);
        for i in 0..30 {
            round.push_log(format!("ENTRY {i}"));
        }
        let public = round.public();
        assert_eq!(public.log.len(), PUBLIC_LOG_LEN);
        assert!(public.log.last().unwrap().contains("ENTRY 29"));
        assert!(public.log.first().unwrap().contains("ENTRY 10"));
    }

    #[test]
    fn test_reset_clears_round_but_keeps_log() {
        let mut round = locked_round();
        round.push_log("LOCK");
        round.pot = 12.5;
        round.reset();

        assert_eq!(round.round_id, 2);
        assert_eq!(round.status, RoundStatus::Collecting);
        assert!(round.players.is_empty());
        assert!(round.commitment.is_none());
        assert!(round.rolls.is_empty());
        assert_eq!(round.winner, None);
        assert_eq!(round.pot, 0.0);
        assert_eq!(round.log.len(), 1);
    }

    #[test]
    fn test_snapshots_of_same_round_compare_equal() {
        let mut round = locked_round();
        round.players.insert(
            7,
            Player {
                id: 7,
                username: "alice".into(),
                stake: 5.0,
                dice: crate::core::dice::DiceType::D6,
            },
        );
        assert_eq!(round.public(), round.public());

        let before = round.public();
        round.pot += 1.0;
        assert_ne!(before, round.public());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RoundStatus::Collecting).unwrap(),
            "\"collecting\""
        );
        assert_eq!(RoundStatus::Finished.to_string(), "finished");
    }
}
