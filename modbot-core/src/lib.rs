//! # modbot-core
//!
//! Core model for the bot: the inbound [`Update`] envelope as a closed sum type, the normalized
//! [`Context`] built by [`ContextFactory`], entity parsing (commands, mentions, HTML rendering),
//! the outbound [`Bot`] trait, the [`UserDirectory`] lookup trait, errors and tracing
//! initialization. Transport-agnostic; used by `dispatcher`, `modbot-telegram` and `handlers`.

pub mod bot;
pub mod context;
pub mod directory;
pub mod entities;
pub mod error;
pub mod factory;
pub mod logger;
pub mod types;
pub mod update;

pub use bot::Bot;
pub use context::{Context, ContextBuilder, DEFAULT_LOCALE};
pub use directory::{InMemoryUserDirectory, UserDirectory};
pub use error::{EnvelopeError, HandlerError, ModbotError, Result};
pub use factory::ContextFactory;
pub use logger::init_tracing;
pub use types::{
    CallbackData, CallbackQuery, Chat, ChatKind, ChatMemberStatus, Command, EntityKind,
    MembershipChange, Message, MessageEntity, RawCallbackQuery, RawChatMember,
    RawChatMemberUpdated, RawMessage, User,
};
pub use update::{envelope_update_id, Update, UpdateKind, UpdateType};
