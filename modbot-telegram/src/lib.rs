//! # modbot-telegram
//!
//! Telegram ingress for modbot: config, a raw Bot API client for update envelopes, the long-poll
//! loop, the webhook endpoint, and a teloxide-backed [`modbot_core::Bot`].

mod api;
mod bot_adapter;
mod config;
mod error;
mod poller;
mod runner;
pub mod webhook;

pub use api::{GetUpdates, TelegramApi, UpdateSource};
pub use bot_adapter::TelegramBotAdapter;
pub use config::{
    env_parse, TelegramConfig, UpdateMode, DEFAULT_ALLOWED_UPDATES, DEFAULT_API_URL,
};
pub use error::ApiError;
pub use poller::{Poller, PollerConfig};
pub use runner::{cache_bot_username, run, run_polling, run_webhook};
