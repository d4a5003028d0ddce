//! "close" inline button: removes the message it is attached to.

use std::sync::Arc;

use async_trait::async_trait;
use dispatcher::CallbackHandler;
use modbot_core::{Bot, CallbackData, CallbackQuery, Context, HandlerError, Result};
use serde_json::Value;
use tracing::info;

pub const CLOSE_CALLBACK: &str = "close";

/// Callback data to put on a "close" button.
pub fn close_button_data() -> String {
    CallbackData::new(CLOSE_CALLBACK, Value::Null).encode()
}

pub struct CloseCallback {
    bot: Arc<dyn Bot>,
}

impl CloseCallback {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl CallbackHandler for CloseCallback {
    fn callbacks(&self) -> &[&'static str] {
        &[CLOSE_CALLBACK]
    }

    async fn run(&self, ctx: &Context, query: &CallbackQuery) -> Result<()> {
        // Answer first so the client stops its spinner even if the delete fails.
        self.bot.answer_callback_query(&query.id, None).await?;

        let chat_id = ctx.chat_id().ok_or(HandlerError::MissingContext("chat"))?;
        let message = ctx.message().ok_or(HandlerError::MissingContext("message"))?;
        self.bot.delete_message(chat_id, message.id()).await?;
        info!(chat_id, message_id = message.id(), "Closed message");
        Ok(())
    }
}
