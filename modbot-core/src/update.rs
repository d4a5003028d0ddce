//! Inbound update envelope as a closed sum type.
//!
//! The platform sends one JSON object per event carrying `update_id` and exactly one payload key.
//! [`Update::from_value`] decides the kind once, at the boundary, by scanning [`UpdateType::ALL`]
//! in declaration order and taking the first key whose value is present and not `null`.

use std::fmt;

use serde_json::Value;

use crate::error::EnvelopeError;
use crate::types::{RawCallbackQuery, RawChatMemberUpdated, RawMessage};

/// One variant per known envelope key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateType {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    BusinessConnection,
    BusinessMessage,
    EditedBusinessMessage,
    DeletedBusinessMessages,
    MessageReaction,
    MessageReactionCount,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
    PurchasedPaidMedia,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
    ChatBoost,
    RemovedChatBoost,
}

impl UpdateType {
    /// Known keys in the order the recognizer checks them.
    pub const ALL: [UpdateType; 23] = [
        UpdateType::Message,
        UpdateType::EditedMessage,
        UpdateType::ChannelPost,
        UpdateType::EditedChannelPost,
        UpdateType::BusinessConnection,
        UpdateType::BusinessMessage,
        UpdateType::EditedBusinessMessage,
        UpdateType::DeletedBusinessMessages,
        UpdateType::MessageReaction,
        UpdateType::MessageReactionCount,
        UpdateType::InlineQuery,
        UpdateType::ChosenInlineResult,
        UpdateType::CallbackQuery,
        UpdateType::ShippingQuery,
        UpdateType::PreCheckoutQuery,
        UpdateType::PurchasedPaidMedia,
        UpdateType::Poll,
        UpdateType::PollAnswer,
        UpdateType::MyChatMember,
        UpdateType::ChatMember,
        UpdateType::ChatJoinRequest,
        UpdateType::ChatBoost,
        UpdateType::RemovedChatBoost,
    ];

    /// Wire key of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateType::Message => "message",
            UpdateType::EditedMessage => "edited_message",
            UpdateType::ChannelPost => "channel_post",
            UpdateType::EditedChannelPost => "edited_channel_post",
            UpdateType::BusinessConnection => "business_connection",
            UpdateType::BusinessMessage => "business_message",
            UpdateType::EditedBusinessMessage => "edited_business_message",
            UpdateType::DeletedBusinessMessages => "deleted_business_messages",
            UpdateType::MessageReaction => "message_reaction",
            UpdateType::MessageReactionCount => "message_reaction_count",
            UpdateType::InlineQuery => "inline_query",
            UpdateType::ChosenInlineResult => "chosen_inline_result",
            UpdateType::CallbackQuery => "callback_query",
            UpdateType::ShippingQuery => "shipping_query",
            UpdateType::PreCheckoutQuery => "pre_checkout_query",
            UpdateType::PurchasedPaidMedia => "purchased_paid_media",
            UpdateType::Poll => "poll",
            UpdateType::PollAnswer => "poll_answer",
            UpdateType::MyChatMember => "my_chat_member",
            UpdateType::ChatMember => "chat_member",
            UpdateType::ChatJoinRequest => "chat_join_request",
            UpdateType::ChatBoost => "chat_boost",
            UpdateType::RemovedChatBoost => "removed_chat_boost",
        }
    }

    /// Kind for a wire key, `None` for keys this crate does not know.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an envelope, one variant per [`UpdateType`].
///
/// Kinds the core builds no context for keep their JSON payload untouched.
#[derive(Debug, Clone)]
pub enum UpdateKind {
    Message(Box<RawMessage>),
    EditedMessage(Box<RawMessage>),
    ChannelPost(Box<RawMessage>),
    EditedChannelPost(Box<RawMessage>),
    BusinessConnection(Value),
    BusinessMessage(Box<RawMessage>),
    EditedBusinessMessage(Box<RawMessage>),
    DeletedBusinessMessages(Value),
    MessageReaction(Value),
    MessageReactionCount(Value),
    InlineQuery(Value),
    ChosenInlineResult(Value),
    CallbackQuery(Box<RawCallbackQuery>),
    ShippingQuery(Value),
    PreCheckoutQuery(Value),
    PurchasedPaidMedia(Value),
    Poll(Value),
    PollAnswer(Value),
    MyChatMember(Box<RawChatMemberUpdated>),
    ChatMember(Box<RawChatMemberUpdated>),
    ChatJoinRequest(Value),
    ChatBoost(Value),
    RemovedChatBoost(Value),
}

impl UpdateKind {
    /// Deserializes `payload` into the variant for `ty`.
    pub fn from_payload(ty: UpdateType, payload: Value) -> Result<Self, serde_json::Error> {
        use serde_json::from_value;
        Ok(match ty {
            UpdateType::Message => UpdateKind::Message(from_value(payload)?),
            UpdateType::EditedMessage => UpdateKind::EditedMessage(from_value(payload)?),
            UpdateType::ChannelPost => UpdateKind::ChannelPost(from_value(payload)?),
            UpdateType::EditedChannelPost => UpdateKind::EditedChannelPost(from_value(payload)?),
            UpdateType::BusinessConnection => UpdateKind::BusinessConnection(payload),
            UpdateType::BusinessMessage => UpdateKind::BusinessMessage(from_value(payload)?),
            UpdateType::EditedBusinessMessage => {
                UpdateKind::EditedBusinessMessage(from_value(payload)?)
            }
            UpdateType::DeletedBusinessMessages => UpdateKind::DeletedBusinessMessages(payload),
            UpdateType::MessageReaction => UpdateKind::MessageReaction(payload),
            UpdateType::MessageReactionCount => UpdateKind::MessageReactionCount(payload),
            UpdateType::InlineQuery => UpdateKind::InlineQuery(payload),
            UpdateType::ChosenInlineResult => UpdateKind::ChosenInlineResult(payload),
            UpdateType::CallbackQuery => UpdateKind::CallbackQuery(from_value(payload)?),
            UpdateType::ShippingQuery => UpdateKind::ShippingQuery(payload),
            UpdateType::PreCheckoutQuery => UpdateKind::PreCheckoutQuery(payload),
            UpdateType::PurchasedPaidMedia => UpdateKind::PurchasedPaidMedia(payload),
            UpdateType::Poll => UpdateKind::Poll(payload),
            UpdateType::PollAnswer => UpdateKind::PollAnswer(payload),
            UpdateType::MyChatMember => UpdateKind::MyChatMember(from_value(payload)?),
            UpdateType::ChatMember => UpdateKind::ChatMember(from_value(payload)?),
            UpdateType::ChatJoinRequest => UpdateKind::ChatJoinRequest(payload),
            UpdateType::ChatBoost => UpdateKind::ChatBoost(payload),
            UpdateType::RemovedChatBoost => UpdateKind::RemovedChatBoost(payload),
        })
    }

    pub fn update_type(&self) -> UpdateType {
        match self {
            UpdateKind::Message(_) => UpdateType::Message,
            UpdateKind::EditedMessage(_) => UpdateType::EditedMessage,
            UpdateKind::ChannelPost(_) => UpdateType::ChannelPost,
            UpdateKind::EditedChannelPost(_) => UpdateType::EditedChannelPost,
            UpdateKind::BusinessConnection(_) => UpdateType::BusinessConnection,
            UpdateKind::BusinessMessage(_) => UpdateType::BusinessMessage,
            UpdateKind::EditedBusinessMessage(_) => UpdateType::EditedBusinessMessage,
            UpdateKind::DeletedBusinessMessages(_) => UpdateType::DeletedBusinessMessages,
            UpdateKind::MessageReaction(_) => UpdateType::MessageReaction,
            UpdateKind::MessageReactionCount(_) => UpdateType::MessageReactionCount,
            UpdateKind::InlineQuery(_) => UpdateType::InlineQuery,
            UpdateKind::ChosenInlineResult(_) => UpdateType::ChosenInlineResult,
            UpdateKind::CallbackQuery(_) => UpdateType::CallbackQuery,
            UpdateKind::ShippingQuery(_) => UpdateType::ShippingQuery,
            UpdateKind::PreCheckoutQuery(_) => UpdateType::PreCheckoutQuery,
            UpdateKind::PurchasedPaidMedia(_) => UpdateType::PurchasedPaidMedia,
            UpdateKind::Poll(_) => UpdateType::Poll,
            UpdateKind::PollAnswer(_) => UpdateType::PollAnswer,
            UpdateKind::MyChatMember(_) => UpdateType::MyChatMember,
            UpdateKind::ChatMember(_) => UpdateType::ChatMember,
            UpdateKind::ChatJoinRequest(_) => UpdateType::ChatJoinRequest,
            UpdateKind::ChatBoost(_) => UpdateType::ChatBoost,
            UpdateKind::RemovedChatBoost(_) => UpdateType::RemovedChatBoost,
        }
    }
}

/// A recognized envelope.
#[derive(Debug, Clone)]
pub struct Update {
    pub update_id: Option<i64>,
    pub kind: UpdateKind,
}

impl Update {
    /// Recognizes the envelope kind and deserializes its payload.
    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let Value::Object(mut fields) = value else {
            return Err(EnvelopeError::NotAnObject);
        };
        let update_id = fields.get("update_id").and_then(Value::as_i64);

        let ty = UpdateType::ALL
            .into_iter()
            .find(|t| fields.get(t.as_str()).is_some_and(|v| !v.is_null()))
            .ok_or(EnvelopeError::Unrecognized { update_id })?;

        let payload = fields.remove(ty.as_str()).unwrap_or(Value::Null);
        let kind = UpdateKind::from_payload(ty, payload).map_err(|source| {
            EnvelopeError::Malformed {
                key: ty.as_str(),
                source,
            }
        })?;

        Ok(Self { update_id, kind })
    }

    pub fn update_type(&self) -> UpdateType {
        self.kind.update_type()
    }
}

/// `update_id` of a raw envelope, without recognizing it.
pub fn envelope_update_id(value: &Value) -> Option<i64> {
    value.get("update_id").and_then(Value::as_i64)
}
