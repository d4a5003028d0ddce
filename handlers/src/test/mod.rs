//! Unit test module
//!
//! Handler tests live here, separate from source files. Handlers are driven through a
//! [`dispatcher::Dispatcher`] with raw envelopes and a recording [`Bot`].


use std::sync::Mutex;

use async_trait::async_trait;
use modbot_core::{Bot, HandlerError, Message, Result, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sent {
    Text { chat_id: i64, text: String },
    Html { chat_id: i64, html: String },
    Reply { chat_id: i64, reply_to: i64, text: String },
    Answer { query_id: String, text: Option<String> },
    Delete { chat_id: i64, message_id: i64 },
}

#[derive(Default)]
pub(crate) struct RecordingBot {
    pub sent: Mutex<Vec<Sent>>,
}

impl RecordingBot {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn push(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.push(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<()> {
        self.push(Sent::Html {
            chat_id,
            html: html.to_string(),
        });
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let chat = message.chat().ok_or(HandlerError::MissingContext("chat"))?;
        self.push(Sent::Reply {
            chat_id: chat.id,
            reply_to: message.id(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str, text: Option<&str>) -> Result<()> {
        self.push(Sent::Answer {
            query_id: query_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.push(Sent::Delete {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn get_me(&self) -> Result<User> {
        Ok(User {
            id: 999,
            is_bot: true,
            first_name: "Modbot".to_string(),
            last_name: None,
            username: Some("modbot".to_string()),
            language_code: None,
        })
    }
}
