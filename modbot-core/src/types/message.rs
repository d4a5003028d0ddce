//! Message payload (wire form) and the normalized [`Message`] handlers read.

use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{chat::Chat, command::Command, entity::EntityKind, entity::MessageEntity, user::User};
use crate::directory::UserDirectory;
use crate::entities::{mention_username, parse_commands, render_markup};

/// Message-shaped payload as it arrives in `message`, `edited_message`, `channel_post`,
/// `business_message` and their variants. Fields the core does not model are kept in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub chat: Option<Chat>,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub sender_chat: Option<Chat>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
    #[serde(default)]
    pub caption_entities: Vec<MessageEntity>,
    #[serde(default)]
    pub reply_to_message: Option<Box<RawMessage>>,
    #[serde(default)]
    pub new_chat_member: Option<User>,
    #[serde(default)]
    pub new_chat_members: Vec<User>,
    #[serde(default)]
    pub left_chat_member: Option<User>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized message: text (or caption), entities, reply chain, service fields.
///
/// Commands are parsed on first access and cached.
#[derive(Debug, Clone)]
pub struct Message {
    id: i64,
    date: i64,
    chat: Option<Chat>,
    from: Option<User>,
    sender_chat: Option<Chat>,
    text: String,
    has_text: bool,
    entities: Vec<MessageEntity>,
    reply_to: Option<Box<Message>>,
    new_chat_members: Vec<User>,
    left_chat_member: Option<User>,
    extra: Map<String, Value>,
    commands: OnceLock<Vec<Command>>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        let (text, entities) = match (raw.text, raw.caption) {
            (Some(text), _) => (Some(text), raw.entities),
            (None, Some(caption)) => (Some(caption), raw.caption_entities),
            (None, None) => (None, Vec::new()),
        };
        let mut new_chat_members = raw.new_chat_members;
        if let Some(member) = raw.new_chat_member {
            if !new_chat_members.iter().any(|u| u.id == member.id) {
                new_chat_members.insert(0, member);
            }
        }
        Self {
            id: raw.message_id,
            date: raw.date,
            chat: raw.chat,
            from: raw.from,
            sender_chat: raw.sender_chat,
            has_text: text.is_some(),
            text: text.unwrap_or_default(),
            entities,
            reply_to: raw.reply_to_message.map(|m| Box::new((*m).into())),
            new_chat_members,
            left_chat_member: raw.left_chat_member,
            extra: raw.extra,
            commands: OnceLock::new(),
        }
    }
}

impl Message {
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Unix timestamp of the message.
    pub fn date(&self) -> i64 {
        self.date
    }

    pub fn chat(&self) -> Option<&Chat> {
        self.chat.as_ref()
    }

    pub fn from(&self) -> Option<&User> {
        self.from.as_ref()
    }

    /// Channel or anonymous admin the message was sent on behalf of.
    pub fn sender_chat(&self) -> Option<&Chat> {
        self.sender_chat.as_ref()
    }

    /// Text, or caption for media messages; empty when neither is present.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the message carried a text or caption.
    pub fn has_text(&self) -> bool {
        self.has_text
    }

    pub fn entities(&self) -> &[MessageEntity] {
        &self.entities
    }

    pub fn reply_to(&self) -> Option<&Message> {
        self.reply_to.as_deref()
    }

    pub fn new_chat_members(&self) -> &[User] {
        &self.new_chat_members
    }

    pub fn left_chat_member(&self) -> Option<&User> {
        self.left_chat_member.as_ref()
    }

    /// Raw value of a payload field the core does not model (`photo`, `sticker`, ...).
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Every `bot_command` in the text, in entity order.
    pub fn commands(&self) -> &[Command] {
        self.commands
            .get_or_init(|| parse_commands(&self.text, &self.entities))
    }

    /// The command starting at offset 0, if the message begins with one.
    pub fn leading_command(&self) -> Option<&Command> {
        self.commands().first().filter(|c| c.start == 0)
    }

    /// Users mentioned in the text.
    ///
    /// `@username` mentions are resolved through `directory`; a username the directory does not
    /// know, or a failed lookup, is skipped. `text_mention` entities carry their user and are
    /// returned as-is. Order follows the entity list.
    pub async fn mentions(&self, directory: &dyn UserDirectory) -> Vec<User> {
        let mut users = Vec::new();
        for entity in &self.entities {
            match entity.kind {
                EntityKind::TextMention => {
                    if let Some(user) = &entity.user {
                        users.push(user.clone());
                    }
                }
                EntityKind::Mention => {
                    let Some(username) = mention_username(&self.text, entity) else {
                        continue;
                    };
                    match directory.find_by_username(&username).await {
                        Ok(Some(user)) => users.push(user),
                        Ok(None) => debug!(username = %username, "mention not in user directory"),
                        Err(e) => debug!(username = %username, error = %e, "mention lookup failed"),
                    }
                }
                _ => {}
            }
        }
        users
    }

    /// Text with formatting entities rendered as Telegram HTML.
    pub fn render_html(&self) -> String {
        render_markup(&self.text, &self.entities)
    }
}
