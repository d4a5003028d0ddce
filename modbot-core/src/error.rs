//! Error types for the bot core.
//!
//! [`ModbotError`] is the top-level error; [`HandlerError`] is used for handler failures and
//! [`EnvelopeError`] for inbound updates the factory cannot turn into a context.

use thiserror::Error;

/// Top-level error for modbot (bot transport, handler, envelope, storage, config, IO).
#[derive(Error, Debug)]
pub enum ModbotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors produced by handlers: an unusable command or a missing context part.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Context has no {0}")]
    MissingContext(&'static str),
}

/// Inbound envelope could not be recognized.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("update envelope is not a JSON object")]
    NotAnObject,

    #[error("unrecognized update envelope (update_id={update_id:?}): no known key is set")]
    Unrecognized { update_id: Option<i64> },

    #[error("malformed `{key}` payload: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for core operations; uses [`ModbotError`].
pub type Result<T> = std::result::Result<T, ModbotError>;
