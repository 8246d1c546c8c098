//! Wire Types
//!
//! Request/response bodies for the HTTP API and the subset of the Telegram
//! Bot API the polling adapter consumes. Loosely-typed payloads from the
//! outside world are parsed into these structs before any engine call.

use serde::{Deserialize, Serialize};

// =============================================================================
// HTTP API BODIES
// =============================================================================

/// Body of `POST /api/join`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinRequest {
    /// Joining player's id. Required and positive.
    pub user_id: Option<i64>,
    /// Display name; defaults to `user_{id}`.
    pub username: Option<String>,
    /// Stake amount; defaults to [`crate::DEFAULT_STAKE`].
    pub stake: Option<f64>,
}

/// Error body returned with a 400/404 status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

impl ErrorBody {
    /// Build from anything displayable.
    pub fn new(message: impl ToString) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

// =============================================================================
// TELEGRAM BOT API (polling subset)
// =============================================================================

/// Response envelope of `getUpdates`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatesResponse {
    /// Telegram-level success flag.
    #[serde(default)]
    pub ok: bool,
    /// Update batch, oldest first.
    #[serde(default)]
    pub result: Vec<Update>,
}

/// One inbound update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id; the poll offset is `last + 1`.
    pub update_id: i64,
    /// New chat message, if any.
    pub message: Option<ChatMessage>,
    /// Edited chat message; treated like a new one.
    pub edited_message: Option<ChatMessage>,
    /// Inline-keyboard button press, if any.
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// The message carried by this update, edited or not.
    pub fn message(&self) -> Option<&ChatMessage> {
        self.message.as_ref().or(self.edited_message.as_ref())
    }
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    /// Chat the message arrived in.
    pub chat: Chat,
    /// Sender, absent for channel posts.
    pub from: Option<TelegramUser>,
    /// Text content, absent for media messages.
    pub text: Option<String>,
}

/// Chat identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Numeric chat id.
    pub id: i64,
}

/// Message sender.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    /// Numeric user id; doubles as the engine player id.
    pub id: i64,
    /// Optional handle used as the display name.
    pub username: Option<String>,
}

impl TelegramUser {
    /// Display name for the engine: handle if set, else `user_{id}`.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| format!("user_{}", self.id))
    }
}

/// Inline-keyboard button press.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Pressing user.
    pub from: TelegramUser,
    /// Button payload (`"join"` for the join button).
    pub data: Option<String>,
    /// Message the keyboard was attached to; carries the chat to reply into.
    pub message: Option<ChatMessage>,
}

// =============================================================================
// TESTS
// =============================================================================
