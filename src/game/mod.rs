//! Round Logic Module
//!
//! The round lifecycle state machine and its state types. Deterministic given
//! a committed seed; all I/O lives in `network` and `storage`.
//!
//! ## Module Structure
//!
//! - `state`: Player, round aggregate, public snapshot projection
//! - `engine`: atomic Join/Lock/Roll/Reset operations behind one lock

pub mod engine;
pub mod state;

// Re-export key types
pub use engine::{EngineError, RoundEngine, MIN_PLAYERS};
pub use state::{Player, PlayerId, PublicRound, Round, RoundStatus, PUBLIC_LOG_LEN};
