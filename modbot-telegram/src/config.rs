//! Telegram ingress configuration.
//! Loaded from BOT_TOKEN, TELEGRAM_API_URL (or TELOXIDE_API_URL), UPDATE_MODE, POLL_*,
//! ALLOWED_UPDATES and WEBHOOK_* environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Result};
use modbot_core::UpdateType;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_POLL_TIMEOUT_SECS: u32 = 30;
pub const DEFAULT_POLL_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_POLL_RETRY_MAX_DELAY_MS: u64 = 30_000;
pub const DEFAULT_WEBHOOK_LISTEN_ADDR: &str = "0.0.0.0:8443";
pub const DEFAULT_WEBHOOK_PATH: &str = "/telegram/webhook";

/// Update kinds requested from Telegram unless ALLOWED_UPDATES says otherwise.
pub const DEFAULT_ALLOWED_UPDATES: [UpdateType; 6] = [
    UpdateType::Message,
    UpdateType::EditedMessage,
    UpdateType::ChannelPost,
    UpdateType::CallbackQuery,
    UpdateType::MyChatMember,
    UpdateType::ChatMember,
];

/// How updates reach the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    #[default]
    Polling,
    Webhook,
}

impl FromStr for UpdateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "polling" | "poll" => Ok(Self::Polling),
            "webhook" => Ok(Self::Webhook),
            other => bail!("unknown update mode: {} (expected polling or webhook)", other),
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polling => f.write_str("polling"),
            Self::Webhook => f.write_str("webhook"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    pub mode: UpdateMode,
    pub poll_timeout_secs: u32,
    pub poll_retry_delay_ms: u64,
    pub poll_retry_max_delay_ms: u64,
    pub allowed_updates: Vec<String>,
    pub webhook_listen_addr: String,
    pub webhook_path: String,
    /// Public URL registered with setWebhook; when unset the webhook is assumed to be managed elsewhere.
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
}

impl TelegramConfig {
    /// Loads from the environment. BOT_TOKEN is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Like [`from_env`](Self::from_env), but `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let mut config = Self::with_token(bot_token);

        config.telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        if let Ok(mode) = env::var("UPDATE_MODE") {
            config.mode = mode.parse()?;
        }
        config.poll_timeout_secs = env_parse("POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS);
        config.poll_retry_delay_ms = env_parse("POLL_RETRY_DELAY_MS", DEFAULT_POLL_RETRY_DELAY_MS);
        config.poll_retry_max_delay_ms =
            env_parse("POLL_RETRY_MAX_DELAY_MS", DEFAULT_POLL_RETRY_MAX_DELAY_MS);
        if let Ok(list) = env::var("ALLOWED_UPDATES") {
            config.allowed_updates = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(addr) = env::var("WEBHOOK_LISTEN_ADDR") {
            config.webhook_listen_addr = addr;
        }
        if let Ok(path) = env::var("WEBHOOK_PATH") {
            config.webhook_path = path;
        }
        config.webhook_url = env::var("WEBHOOK_URL").ok().filter(|s| !s.is_empty());
        config.webhook_secret = env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty());
        Ok(config)
    }

    /// Defaults for everything except the token.
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            telegram_api_url: None,
            mode: UpdateMode::default(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            poll_retry_delay_ms: DEFAULT_POLL_RETRY_DELAY_MS,
            poll_retry_max_delay_ms: DEFAULT_POLL_RETRY_MAX_DELAY_MS,
            allowed_updates: DEFAULT_ALLOWED_UPDATES
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            webhook_listen_addr: DEFAULT_WEBHOOK_LISTEN_ADDR.to_string(),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            webhook_url: None,
            webhook_secret: None,
        }
    }

    /// Bot API base URL without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.telegram_api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.poll_retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.poll_retry_max_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            bail!("BOT_TOKEN is empty");
        }
        if let Some(url) = &self.telegram_api_url {
            reqwest::Url::parse(url)
                .map_err(|e| anyhow::anyhow!("invalid TELEGRAM_API_URL {}: {}", url, e))?;
        }
        if self.poll_retry_delay_ms == 0 {
            bail!("POLL_RETRY_DELAY_MS must be positive");
        }
        if self.poll_retry_max_delay_ms < self.poll_retry_delay_ms {
            bail!("POLL_RETRY_MAX_DELAY_MS must not be below POLL_RETRY_DELAY_MS");
        }
        for key in &self.allowed_updates {
            if UpdateType::from_key(key).is_none() {
                bail!("unknown update kind in ALLOWED_UPDATES: {}", key);
            }
        }
        if self.mode == UpdateMode::Webhook {
            if !self.webhook_path.starts_with('/') {
                bail!("WEBHOOK_PATH must start with '/': {}", self.webhook_path);
            }
            if self.webhook_listen_addr.parse::<std::net::SocketAddr>().is_err() {
                bail!("invalid WEBHOOK_LISTEN_ADDR: {}", self.webhook_listen_addr);
            }
            if let Some(url) = &self.webhook_url {
                let parsed = reqwest::Url::parse(url)
                    .map_err(|e| anyhow::anyhow!("invalid WEBHOOK_URL {}: {}", url, e))?;
                if parsed.scheme() != "https" {
                    bail!("WEBHOOK_URL must use https: {}", url);
                }
            }
        }
        Ok(())
    }
}

/// Reads `key` and parses it, falling back to `default` when unset or unparsable.
pub fn env_parse<T: FromStr + fmt::Display>(key: &str, default: T) -> T {
    parse_or_default(key, env::var(key).ok().as_deref(), default)
}

fn parse_or_default<T: FromStr + fmt::Display>(key: &str, raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = raw, default = %default, "Ignoring unparsable env value, using default");
            default
        }
    }
}
