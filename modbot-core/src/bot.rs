//! Outbound messaging abstraction.
//!
//! [`Bot`] is transport-agnostic; the Telegram implementation lives in `modbot-telegram` and tests
//! substitute recording fakes.

use async_trait::async_trait;

use crate::error::{HandlerError, Result};
use crate::types::{Message, User};

/// Outbound calls handlers make against the messaging platform.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain text message to the given chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Sends a message formatted as Telegram HTML.
    async fn send_html(&self, chat_id: i64, html: &str) -> Result<()>;

    /// Replies to `message` in its chat. The default sends a plain message to the same chat.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let chat = message.chat().ok_or(HandlerError::MissingContext("chat"))?;
        self.send_message(chat.id, text).await
    }

    /// Acknowledges a callback query, optionally showing `text` as a toast.
    async fn answer_callback_query(&self, query_id: &str, text: Option<&str>) -> Result<()>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()>;

    /// The bot's own account.
    async fn get_me(&self) -> Result<User>;
}
