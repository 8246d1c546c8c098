//! Chat-Bot Adapter
//!
//! Long-polling Telegram front end sharing the one engine instance with the
//! HTTP surface. Delivery is best-effort by design: a failed `sendMessage` is
//! dropped without retry, and a failed poll yields an empty batch. The round
//! state is never left half-applied by a transport failure because every
//! engine call completes before any reply is attempted.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::game::{PublicRound, RoundEngine};
use crate::network::protocol::{TelegramUser, Update, UpdatesResponse};
use crate::DEFAULT_STAKE;

/// Transport seam between the bot logic and the Telegram HTTP API.
///
/// Implemented by [`TelegramApi`] in production and by a recording mock in
/// tests.
pub trait BotTransport: Send + Sync {
    /// Fetch the next batch of updates, oldest first. Failures surface as an
    /// empty batch.
    fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> impl std::future::Future<Output = Vec<Update>> + Send;

    /// Send a text reply, optionally with a keyboard markup. Best-effort.
    fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<Value>,
    ) -> impl std::future::Future<Output = ()> + Send;
}

/// Reqwest-backed Telegram Bot API client.
pub struct TelegramApi {
    client: reqwest::Client,
    base: String,
}

impl TelegramApi {
    /// Build a client for the given bot token.
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("https://api.telegram.org/bot{token}"),
        }
    }
}

impl BotTransport for TelegramApi {
    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Vec<Update> {
        let mut request = self
            .client
            .get(format!("{}/getUpdates", self.base))
            // The server holds the request open for `timeout_secs`; give the
            // client some slack on top.
            .timeout(Duration::from_secs(timeout_secs + 10))
            .query(&[("timeout", timeout_secs)]);
        if let Some(offset) = offset {
            request = request.query(&[("offset", offset)]);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("getUpdates failed: {e}");
                return Vec::new();
            }
        };
        match response.json::<UpdatesResponse>().await {
            Ok(batch) if batch.ok => batch.result,
            Ok(_) => Vec::new(),
            Err(e) => {
                debug!("getUpdates returned malformed body: {e}");
                Vec::new()
            }
        }
    }

    async fn send_message(&self, chat_id: i64, text: &str, reply_markup: Option<Value>) {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = markup;
        }
        // Deliberately no retry; a lost reply is acceptable, a stuck loop
        // is not.
        let result = self
            .client
            .post(format!("{}/sendMessage", self.base))
            .json(&body)
            .send()
            .await;
        if let Err(e) = result {
            debug!(chat_id, "sendMessage dropped: {e}");
        }
    }
}

/// The bot: command dispatch over a shared round engine.
pub struct Bot<T: BotTransport> {
    api: T,
    engine: Arc<RoundEngine>,
    webapp_url: Option<String>,
    poll_timeout_secs: u64,
    offset: Option<i64>,
}

impl<T: BotTransport> Bot<T> {
    /// Create a bot over the shared engine.
    pub fn new(
        api: T,
        engine: Arc<RoundEngine>,
        webapp_url: Option<String>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            api,
            engine,
            webapp_url,
            poll_timeout_secs,
            offset: None,
        }
    }

    /// Poll forever, dispatching each update as it arrives.
    pub async fn run(mut self) {
        info!("bot polling started");
        loop {
            let updates = self.api.get_updates(self.offset, self.poll_timeout_secs).await;
            for update in updates {
                self.offset = Some(update.update_id + 1);
                self.handle_update(&update).await;
            }
        }
    }

    /// Dispatch a single update.
    pub async fn handle_update(&self, update: &Update) {
        if let Some(msg) = update.message() {
            let Some(from) = msg.from.as_ref() else {
                return;
            };
            let text = msg.text.as_deref().unwrap_or("").trim();
            self.handle_command(msg.chat.id, from, text).await;
        } else if let Some(cbq) = update.callback_query.as_ref() {
            let Some(chat_id) = cbq.message.as_ref().map(|m| m.chat.id) else {
                return;
            };
            if cbq.data.as_deref() == Some("join") {
                self.handle_join(chat_id, &cbq.from).await;
            }
        }
    }

    async fn handle_command(&self, chat_id: i64, from: &TelegramUser, text: &str) {
        if text.starts_with("/start") || text.starts_with("/menu") {
            self.send_menu(chat_id).await;
        } else if text.starts_with("/status") {
            let snap = self.engine.snapshot().await;
            let reply = format!("Status: {}\nPlayers: {}", snap.status, snap.players.len());
            self.api.send_message(chat_id, &reply, None).await;
        } else if text.starts_with("/join") || text == "Join /join" {
            self.handle_join(chat_id, from).await;
        } else if text.starts_with("/lock") {
            let reply = match self.engine.lock().await {
                Ok(snap) => {
                    let commit = snap.commit.as_deref().unwrap_or("");
                    format!("Locked. Commit {}…", &commit[..12.min(commit.len())])
                }
                Err(e) => e.to_string(),
            };
            self.api.send_message(chat_id, &reply, None).await;
        } else if text.starts_with("/roll") {
            let reply = match self.engine.roll().await {
                Ok(snap) => roll_reply(&snap),
                Err(e) => e.to_string(),
            };
            self.api.send_message(chat_id, &reply, None).await;
        } else {
            self.api
                .send_message(
                    chat_id,
                    "Commands: /menu, /start, /join, /status, /lock, /roll",
                    None,
                )
                .await;
        }
    }

    /// Join with the surface's fixed default stake.
    ///
    /// The chat surface has no stake input, so every bot join uses
    /// [`DEFAULT_STAKE`]; arbitrary stakes are an HTTP-surface feature.
    async fn handle_join(&self, chat_id: i64, from: &TelegramUser) {
        let reply = match self
            .engine
            .join(from.id, from.display_name(), DEFAULT_STAKE)
            .await
        {
            Ok(snap) => {
                let dice = snap
                    .players
                    .iter()
                    .find(|p| p.id == from.id)
                    .map(|p| p.dice.to_string())
                    .unwrap_or_default();
                format!("Joined. Dice {dice}. Players: {}", snap.players.len())
            }
            Err(e) => e.to_string(),
        };
        self.api.send_message(chat_id, &reply, None).await;
    }

    /// Send the menu: a persistent reply keyboard (when a webapp is
    /// configured) plus a status message with inline buttons as fallback.
    async fn send_menu(&self, chat_id: i64) {
        if let Some(keyboard) = self.reply_keyboard() {
            self.api.send_message(chat_id, "Menu:", Some(keyboard)).await;
        }
        let snap = self.engine.snapshot().await;
        let commit = snap.commit.as_deref().unwrap_or("");
        let text = format!(
            "Gift Dice\nRound: {}\nStatus: {}\nCommit: {}…",
            snap.round_id,
            snap.status,
            &commit[..12.min(commit.len())]
        );
        self.api
            .send_message(chat_id, &text, Some(self.inline_markup()))
            .await;
    }

    fn inline_markup(&self) -> Value {
        let mut row = Vec::new();
        if let Some(url) = &self.webapp_url {
            row.push(json!({ "text": "Open Gift Dice", "web_app": { "url": url } }));
        }
        row.push(json!({ "text": "Join Round", "callback_data": "join" }));
        json!({ "inline_keyboard": [row] })
    }

    fn reply_keyboard(&self) -> Option<Value> {
        let url = self.webapp_url.as_ref()?;
        Some(json!({
            "keyboard": [[
                { "text": "Open Gift Dice", "web_app": { "url": url } },
                { "text": "Join /join" }
            ]],
            "resize_keyboard": true,
            "is_persistent": true
        }))
    }
}

/// Format the reply for a roll outcome.
fn roll_reply(snap: &PublicRound) -> String {
    let max_value = snap.rolls.values().copied().max().unwrap_or(0);
    match snap.winner {
        Some(winner) => {
            let seed = snap.reveal.as_deref().unwrap_or("");
            format!("Reveal: {seed}\nWinner: {winner} with {max_value}")
        }
        None => {
            let tied: Vec<String> = snap
                .rolls
                .iter()
                .filter(|(_, v)| **v == max_value)
                .map(|(id, _)| id.to_string())
                .collect();
            format!("Tie on {max_value}. Winners: {}", tied.join(", "))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
