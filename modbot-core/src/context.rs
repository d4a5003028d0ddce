//! Normalized per-update context handed to every handler.
//!
//! A [`Context`] is assembled once through [`ContextBuilder`] and is read-only afterwards;
//! handlers share it by reference (or `Arc` for detached actions).

use crate::types::{CallbackQuery, Chat, Command, Message, User};
use crate::update::UpdateType;

/// Locale used when neither the user nor the configuration provides one.
pub const DEFAULT_LOCALE: &str = "en";

/// Normalized view of one update.
#[derive(Debug, Clone)]
pub struct Context {
    update_id: Option<i64>,
    kind: UpdateType,
    chat: Option<Chat>,
    user: Option<User>,
    message: Option<Message>,
    new_chat_member: Option<User>,
    left_chat_member: Option<User>,
    callback_query: Option<CallbackQuery>,
    locale: String,
}

impl Context {
    pub fn builder(kind: UpdateType, update_id: Option<i64>) -> ContextBuilder {
        ContextBuilder::new(kind, update_id)
    }

    pub fn update_id(&self) -> Option<i64> {
        self.update_id
    }

    /// Envelope key that produced this context.
    pub fn kind(&self) -> UpdateType {
        self.kind
    }

    pub fn chat(&self) -> Option<&Chat> {
        self.chat.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn new_chat_member(&self) -> Option<&User> {
        self.new_chat_member.as_ref()
    }

    pub fn left_chat_member(&self) -> Option<&User> {
        self.left_chat_member.as_ref()
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        self.callback_query.as_ref()
    }

    /// Locale for anything rendered in response to this update.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Commands parsed from the message text; empty without a message.
    pub fn commands(&self) -> &[Command] {
        self.message.as_ref().map(Message::commands).unwrap_or(&[])
    }

    /// Message text, if there is a message with text or caption.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|m| m.has_text())
            .map(Message::text)
    }

    pub fn chat_id(&self) -> Option<i64> {
        self.chat.as_ref().map(|c| c.id)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Construction phase of a [`Context`].
#[derive(Debug)]
pub struct ContextBuilder {
    update_id: Option<i64>,
    kind: UpdateType,
    chat: Option<Chat>,
    user: Option<User>,
    message: Option<Message>,
    new_chat_member: Option<User>,
    left_chat_member: Option<User>,
    callback_query: Option<CallbackQuery>,
    locale: Option<String>,
}

impl ContextBuilder {
    pub fn new(kind: UpdateType, update_id: Option<i64>) -> Self {
        Self {
            update_id,
            kind,
            chat: None,
            user: None,
            message: None,
            new_chat_member: None,
            left_chat_member: None,
            callback_query: None,
            locale: None,
        }
    }

    pub fn chat(&mut self, chat: Chat) -> &mut Self {
        self.chat = Some(chat);
        self
    }

    pub fn user(&mut self, user: User) -> &mut Self {
        self.user = Some(user);
        self
    }

    pub fn message(&mut self, message: Message) -> &mut Self {
        self.message = Some(message);
        self
    }

    pub fn new_chat_member(&mut self, user: User) -> &mut Self {
        self.new_chat_member = Some(user);
        self
    }

    pub fn left_chat_member(&mut self, user: User) -> &mut Self {
        self.left_chat_member = Some(user);
        self
    }

    pub fn callback_query(&mut self, query: CallbackQuery) -> &mut Self {
        self.callback_query = Some(query);
        self
    }

    pub fn locale(&mut self, locale: impl Into<String>) -> &mut Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn build(self) -> Context {
        Context {
            update_id: self.update_id,
            kind: self.kind,
            chat: self.chat,
            user: self.user,
            message: self.message,
            new_chat_member: self.new_chat_member,
            left_chat_member: self.left_chat_member,
            callback_query: self.callback_query,
            locale: self.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
        }
    }
}
