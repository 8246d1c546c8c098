//! # Gift Dice Server
//!
//! Provably-fair multiplayer dice rounds: players join with a stake, the
//! round locks by committing to a secret seed, and every die roll is derived
//! from that seed after it is revealed, so any outcome can be audited.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    GIFT DICE SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Pure primitives                           │
//! │  ├── dice.rs     - Dice types and stake tiers                │
//! │  └── hash.rs     - SHA-256 helpers                           │
//! │                                                              │
//! │  fair/           - Commit-reveal protocol                    │
//! │  └── commit.rs   - Seed commitment and roll derivation       │
//! │                                                              │
//! │  game/           - Round engine (deterministic given seed)   │
//! │  ├── state.rs    - Round aggregate and public snapshot       │
//! │  └── engine.rs   - Join/Lock/Roll/Reset behind one lock      │
//! │                                                              │
//! │  network/        - Ingress adapters (non-deterministic)      │
//! │  ├── http.rs     - Axum API for the browser miniapp          │
//! │  ├── bot.rs      - Long-polling chat bot                     │
//! │  └── protocol.rs - Wire types                                │
//! │                                                              │
//! │  storage.rs      - Ordered crash-recovery snapshots          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fairness Guarantee
//!
//! `sha256(seed)` is published before any roll exists; rolls are
//! `1 + (sha256("{seed}|{round_id}|{player_id}|{phase}") mod sides)`.
//! Once the seed is revealed, anyone can recompute every roll and check the
//! commitment, so neither the operator nor any player can steer the outcome
//! after lock.
//!
//! Both ingress surfaces share one [`game::RoundEngine`]; its lock makes
//! every operation atomic and every snapshot consistent.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod fair;
pub mod game;
pub mod network;
pub mod storage;

// Re-export commonly used types
pub use crate::core::dice::{pick_dice, DiceType};
pub use crate::fair::{derive_roll, Commitment};
pub use crate::game::{EngineError, Player, PlayerId, PublicRound, RoundEngine, RoundStatus};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stake used when a surface provides none (the chat bot always joins with
/// this; the HTTP surface falls back to it when the body omits `stake`).
pub const DEFAULT_STAKE: f64 = 1.0;
