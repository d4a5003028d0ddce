//! Core types: user, chat, message, entity, command, callback query and member status.
//!
//! One file per main type; wire-only payload shapes (`Raw*`) live next to the type they feed.

mod callback;
mod chat;
mod command;
mod entity;
mod member;
mod message;
mod user;

pub use callback::{CallbackData, CallbackQuery, RawCallbackQuery};
pub use chat::{Chat, ChatKind};
pub use command::Command;
pub use entity::{EntityKind, MessageEntity};
pub use member::{ChatMemberStatus, MembershipChange, RawChatMember, RawChatMemberUpdated};
pub use message::{Message, RawMessage};
pub use user::User;
