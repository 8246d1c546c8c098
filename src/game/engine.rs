//! Round Engine
//!
//! Owns the single [`Round`] and sequences its lifecycle:
//! Join -> Lock -> Roll -> Reset. Both ingress surfaces (HTTP handlers and
//! the bot polling loop) share one engine instance; every operation takes the
//! engine-wide lock for exactly one invocation and does nothing but hashing
//! and arithmetic while holding it.

use std::collections::BTreeMap;

use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use crate::core::dice::pick_dice;
use crate::fair::{derive_roll, Commitment, ROLL_PHASE_INITIAL};
use crate::game::state::{Player, PlayerId, PublicRound, Round, RoundStatus};

/// Minimum number of joined players required to lock a round.
pub const MIN_PLAYERS: usize = 2;

/// Engine operation failures.
///
/// All variants are client-input or state-precondition violations; they are
/// surfaced to the caller as values and never propagate as panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Missing or non-positive player id, or non-positive stake.
    #[error("{0}")]
    InvalidInput(&'static str),

    /// Join or lock attempted after the round left the collecting phase.
    #[error("round is not collecting")]
    RoundNotCollecting,

    /// Lock attempted with fewer than [`MIN_PLAYERS`] players.
    #[error("need at least 2 players")]
    InsufficientPlayers,

    /// Roll attempted outside the locking/rolling phases.
    #[error("not ready for rolling")]
    RoundNotReady,

    /// Stored seed no longer hashes to the published commitment.
    #[error("seed does not match published commitment")]
    CommitMismatch,
}

/// The round engine: sole writer of the round aggregate.
///
/// Cheap to share via `Arc`; all operations are `&self`.
pub struct RoundEngine {
    round: RwLock<Round>,
    snapshot_tx: Option<mpsc::Sender<PublicRound>>,
}

impl Default for RoundEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundEngine {
    /// Create an engine with a fresh round 1 in the collecting phase.
    pub fn new() -> Self {
        Self {
            round: RwLock::new(Round::new(1)),
            snapshot_tx: None,
        }
    }

    /// Hand a copy of the public snapshot to this channel after every
    /// mutating operation, in operation order.
    pub fn with_snapshot_channel(mut self, tx: mpsc::Sender<PublicRound>) -> Self {
        self.snapshot_tx = Some(tx);
        self
    }

    /// Non-blocking handoff to the snapshot writer. A full or closed channel
    /// must never abort the in-memory transition, so failures only log.
    fn publish(&self, snap: &PublicRound) {
        if let Some(tx) = &self.snapshot_tx {
            if let Err(e) = tx.try_send(snap.clone()) {
                warn!("snapshot not queued: {e}");
            }
        }
    }

    /// Read-only public snapshot of the current round.
    pub async fn snapshot(&self) -> PublicRound {
        self.round.read().await.public()
    }

    /// Join the current round.
    ///
    /// Idempotent per player id: a second join with any stake is a no-op
    /// success and leaves the first-recorded stake, dice and pot untouched.
    pub async fn join(
        &self,
        id: PlayerId,
        username: String,
        stake: f64,
    ) -> Result<PublicRound, EngineError> {
        if id <= 0 {
            return Err(EngineError::InvalidInput("user_id required"));
        }
        if stake.is_nan() || stake <= 0.0 {
            return Err(EngineError::InvalidInput("stake must be positive"));
        }

        let mut round = self.round.write().await;
        if round.status != RoundStatus::Collecting {
            return Err(EngineError::RoundNotCollecting);
        }

        if !round.players.contains_key(&id) {
            let dice = pick_dice(stake);
            round.players.insert(
                id,
                Player {
                    id,
                    username: username.clone(),
                    stake,
                    dice,
                },
            );
            round.pot += stake;
            round.push_log(format!("JOIN {username} ({id}) dice={dice} stake={stake}"));
            info!(player = id, %dice, stake, pot = round.pot, "player joined");
        }
        let snap = round.public();
        self.publish(&snap);
        Ok(snap)
    }

    /// Lock the round: commit to a fresh unpredictable seed.
    ///
    /// Publishes only the commitment hash; the seed stays secret until a roll
    /// reveals it.
    pub async fn lock(&self) -> Result<PublicRound, EngineError> {
        self.lock_commitment(Commitment::generate()).await
    }

    /// Lock the round with a caller-supplied seed.
    ///
    /// Exists for deterministic replay and audit tooling; production callers
    /// use [`lock`](Self::lock).
    pub async fn lock_with_seed(&self, seed: String) -> Result<PublicRound, EngineError> {
        self.lock_commitment(Commitment::from_seed(seed)).await
    }

    async fn lock_commitment(&self, commitment: Commitment) -> Result<PublicRound, EngineError> {
        let mut round = self.round.write().await;
        if round.status != RoundStatus::Collecting {
            return Err(EngineError::RoundNotCollecting);
        }
        if round.players.len() < MIN_PLAYERS {
            return Err(EngineError::InsufficientPlayers);
        }

        let commit = commitment.commit.clone();
        round.commitment = Some(commitment);
        round.status = RoundStatus::Locking;
        round.push_log(format!("LOCK commit={}…", &commit[..12.min(commit.len())]));
        info!(round = round.round_id, commit = %commit, "round locked");
        let snap = round.public();
        self.publish(&snap);
        Ok(snap)
    }

    /// Derive every player's roll from the committed seed and settle the
    /// round if a single maximum exists.
    ///
    /// On a tie the status stays `Rolling` with no winner; callers decide
    /// whether to roll again or reset. The seed is revealed either way, since
    /// the derivation already consumed it.
    pub async fn roll(&self) -> Result<PublicRound, EngineError> {
        let mut round = self.round.write().await;
        if !matches!(round.status, RoundStatus::Locking | RoundStatus::Rolling) {
            return Err(EngineError::RoundNotReady);
        }
        let commitment = round.commitment.clone().ok_or(EngineError::RoundNotReady)?;
        if !commitment.verify() {
            return Err(EngineError::CommitMismatch);
        }

        round.status = RoundStatus::Rolling;
        let round_id = round.round_id;
        let rolls: BTreeMap<PlayerId, u32> = round
            .players
            .values()
            .map(|p| {
                let value =
                    derive_roll(&commitment.seed, round_id, p.id, p.dice, ROLL_PHASE_INITIAL);
                (p.id, value)
            })
            .collect();
        round.rolls = rolls;

        let (max_value, holders) = max_holders(&round.rolls);
        if let [winner] = holders[..] {
            let pot_at_win = round.pot;
            round.status = RoundStatus::Finished;
            round.winner = Some(winner);
            round.pot = 0.0;
            round.push_log(format!(
                "REVEAL seed={} winner={winner} val={max_value} pot={pot_at_win}",
                commitment.seed
            ));
            info!(round = round_id, winner, value = max_value, pot = pot_at_win, "round finished");
        } else {
            round.push_log(format!("TIE on {max_value} among {holders:?}"));
            info!(round = round_id, value = max_value, tied = ?holders, "roll tied");
        }
        let snap = round.public();
        self.publish(&snap);
        Ok(snap)
    }

    /// Start the next round. Always succeeds, from any status.
    pub async fn reset(&self) -> Result<PublicRound, EngineError> {
        let mut round = self.round.write().await;
        round.reset();
        let round_id = round.round_id;
        round.push_log(format!("RESET to round {round_id}"));
        info!(round = round_id, "round reset");
        let snap = round.public();
        self.publish(&snap);
        Ok(snap)
    }
}

/// Maximum roll value and the ids of every player holding it.
fn max_holders(rolls: &BTreeMap<PlayerId, u32>) -> (u32, Vec<PlayerId>) {
    let max_value = rolls.values().copied().max().unwrap_or(0);
    let holders = rolls
        .iter()
        .filter(|(_, v)| **v == max_value)
        .map(|(id, _)| *id)
        .collect();
    (max_value, holders)
}

// =============================================================================
// TESTS
// =============================================================================
