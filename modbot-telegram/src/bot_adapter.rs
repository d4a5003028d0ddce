//! Wraps teloxide::Bot and implements [`modbot_core::Bot`]. Handlers talk to Telegram through it;
//! tests substitute another Bot impl.

use async_trait::async_trait;
use modbot_core::{Bot as CoreBot, HandlerError, Message, ModbotError, Result, User};
use teloxide::payloads::{AnswerCallbackQuerySetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, ChatId, MessageId, ParseMode, ReplyParameters};

use crate::config::TelegramConfig;

pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Builds the teloxide client from token and optional API URL.
    pub fn from_config(config: &TelegramConfig) -> anyhow::Result<Self> {
        let mut bot = teloxide::Bot::new(config.bot_token.clone());
        if let Some(url) = &config.telegram_api_url {
            bot = bot.set_api_url(reqwest::Url::parse(url)?);
        }
        Ok(Self::new(bot))
    }

    /// The underlying teloxide::Bot for calls the trait does not cover.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

fn bot_error(e: impl std::fmt::Display) -> ModbotError {
    ModbotError::Bot(e.to_string())
}

fn message_id(id: i64) -> Result<MessageId> {
    i32::try_from(id)
        .map(MessageId)
        .map_err(|_| ModbotError::Bot(format!("message id out of range: {}", id)))
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), html.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let chat = message.chat().ok_or(HandlerError::MissingContext("chat"))?;
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .reply_parameters(ReplyParameters::new(message_id(message.id())?))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str, text: Option<&str>) -> Result<()> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(query_id.to_string()));
        if let Some(text) = text {
            request = request.text(text.to_string());
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id_raw: i64) -> Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), message_id(message_id_raw)?)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn get_me(&self) -> Result<User> {
        let me = self.bot.get_me().await.map_err(bot_error)?;
        let user = &me.user;
        Ok(User {
            id: user.id.0 as i64,
            is_bot: user.is_bot,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            language_code: user.language_code.clone(),
        })
    }
}
