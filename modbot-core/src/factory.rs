//! Context factory: recognized [`Update`] → [`Context`].
//!
//! Each kind maps to one constructor in an exhaustive `match`. Kinds without a constructor map
//! to `None` explicitly ("recognized, nothing to do"), which callers treat as a no-op rather than
//! an error.

use serde_json::Value;
use tracing::debug;

use crate::context::{Context, ContextBuilder, DEFAULT_LOCALE};
use crate::error::EnvelopeError;
use crate::types::{
    CallbackQuery, MembershipChange, Message, RawCallbackQuery, RawChatMemberUpdated, RawMessage,
    User,
};
use crate::update::{Update, UpdateKind, UpdateType};

/// Builds contexts from raw envelopes. Holds the locale used when the acting user has none.
#[derive(Debug, Clone)]
pub struct ContextFactory {
    default_locale: String,
}

impl Default for ContextFactory {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl ContextFactory {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Recognizes `envelope` and builds its context.
    ///
    /// `Err` when no known key is set or the payload is malformed; `Ok(None)` when the kind is
    /// known but deliberately not turned into a context.
    pub fn create(&self, envelope: Value) -> Result<Option<Context>, EnvelopeError> {
        let update = Update::from_value(envelope)?;
        Ok(self.from_update(update))
    }

    /// Builds the context for an already recognized update.
    pub fn from_update(&self, update: Update) -> Option<Context> {
        let id = update.update_id;
        match update.kind {
            UpdateKind::Message(m) => Some(self.message_context(UpdateType::Message, id, *m)),
            UpdateKind::EditedMessage(m) => {
                Some(self.message_context(UpdateType::EditedMessage, id, *m))
            }
            UpdateKind::ChannelPost(m) => {
                Some(self.message_context(UpdateType::ChannelPost, id, *m))
            }
            UpdateKind::EditedChannelPost(m) => {
                Some(self.message_context(UpdateType::EditedChannelPost, id, *m))
            }
            UpdateKind::BusinessMessage(m) => {
                Some(self.message_context(UpdateType::BusinessMessage, id, *m))
            }
            UpdateKind::EditedBusinessMessage(m) => {
                Some(self.message_context(UpdateType::EditedBusinessMessage, id, *m))
            }
            UpdateKind::MyChatMember(u) => {
                Some(self.member_context(UpdateType::MyChatMember, id, *u))
            }
            UpdateKind::ChatMember(u) => Some(self.member_context(UpdateType::ChatMember, id, *u)),
            UpdateKind::CallbackQuery(q) => Some(self.callback_context(id, *q)),
            UpdateKind::BusinessConnection(_)
            | UpdateKind::DeletedBusinessMessages(_)
            | UpdateKind::MessageReaction(_)
            | UpdateKind::MessageReactionCount(_)
            | UpdateKind::InlineQuery(_)
            | UpdateKind::ChosenInlineResult(_)
            | UpdateKind::ShippingQuery(_)
            | UpdateKind::PreCheckoutQuery(_)
            | UpdateKind::PurchasedPaidMedia(_)
            | UpdateKind::Poll(_)
            | UpdateKind::PollAnswer(_)
            | UpdateKind::ChatJoinRequest(_)
            | UpdateKind::ChatBoost(_)
            | UpdateKind::RemovedChatBoost(_) => None,
        }
    }

    /// Message-shaped kinds: chat, then user (only with a chat), then service members, then the
    /// message itself.
    fn message_context(&self, kind: UpdateType, id: Option<i64>, raw: RawMessage) -> Context {
        let mut builder = ContextBuilder::new(kind, id);
        if let Some(chat) = &raw.chat {
            builder.chat(chat.clone());
            if let Some(from) = &raw.from {
                builder.user(from.clone());
            }
        }
        let message: Message = raw.into();
        if let Some(member) = message.new_chat_members().first() {
            builder.new_chat_member(member.clone());
        }
        if let Some(member) = message.left_chat_member() {
            builder.left_chat_member(member.clone());
        }
        builder.message(message);
        self.finish(builder)
    }

    /// `my_chat_member` / `chat_member`: at most one of new/left member is set, decided by the
    /// old → new status transition.
    fn member_context(
        &self,
        kind: UpdateType,
        id: Option<i64>,
        raw: RawChatMemberUpdated,
    ) -> Context {
        let mut builder = ContextBuilder::new(kind, id);
        if let Some(chat) = &raw.chat {
            builder.chat(chat.clone());
            if let Some(from) = &raw.from {
                builder.user(from.clone());
            }
        }
        let change = raw.change();
        debug!(
            kind = %kind,
            old_status = %raw.old_chat_member.status,
            new_status = %raw.new_chat_member.status,
            change = ?change,
            "chat member transition"
        );
        match change {
            MembershipChange::Joined => {
                builder.new_chat_member(raw.new_chat_member.user);
            }
            MembershipChange::Left => {
                builder.left_chat_member(raw.new_chat_member.user);
            }
            MembershipChange::Unchanged => {}
        }
        self.finish(builder)
    }

    fn callback_context(&self, id: Option<i64>, raw: RawCallbackQuery) -> Context {
        let mut builder = ContextBuilder::new(UpdateType::CallbackQuery, id);
        let query = CallbackQuery::from_raw(&raw);
        if let Some(chat) = raw.message.as_ref().and_then(|m| m.chat.clone()) {
            builder.chat(chat);
        }
        builder.user(raw.from);
        if let Some(message) = raw.message {
            builder.message(message.into());
        }
        builder.callback_query(query);
        self.finish(builder)
    }

    fn finish(&self, mut builder: ContextBuilder) -> Context {
        let locale = self.locale_for(builder.current_user());
        builder.locale(locale);
        builder.build()
    }

    /// Primary language subtag of the user's client language, or the default locale.
    fn locale_for(&self, user: Option<&User>) -> String {
        user.and_then(|u| u.language_code.as_deref())
            .and_then(|code| code.split(['-', '_']).next())
            .filter(|lang| !lang.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| self.default_locale.clone())
    }
}
