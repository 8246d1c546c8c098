//! Ingress Adapters
//!
//! The two front doors of the round engine: an HTTP API and a long-polling
//! chat bot. Both translate external requests into single engine operations
//! and format the returned snapshot; neither touches round state directly.

pub mod bot;
pub mod http;
pub mod protocol;

pub use bot::{Bot, BotTransport, TelegramApi};
pub use http::{create_router, AppState};
pub use protocol::{ErrorBody, JoinRequest, Update};
