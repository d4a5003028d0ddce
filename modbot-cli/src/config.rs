//! Bot config: Telegram ingress plus database, logging, locale and dispatch limits. Loaded from env.

use std::env;

use anyhow::Result;
use dispatcher::DEFAULT_MAX_INFLIGHT;
use modbot_core::{ModbotError, DEFAULT_LOCALE};
use modbot_telegram::{env_parse, TelegramConfig, UpdateMode};

pub const DEFAULT_DATABASE_URL: &str = "./modbot.db";
pub const DEFAULT_LOG_FILE: &str = "logs/modbot.log";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    /// DATABASE_URL: SQLite file path or `sqlite:` URL
    pub database_url: String,
    /// LOG_FILE
    pub log_file: String,
    /// DEFAULT_LOCALE: used when the acting user has no language
    pub default_locale: String,
    /// MAX_INFLIGHT_ACTIONS: cap on concurrently running async actions
    pub max_inflight_actions: usize,
}

impl BotConfig {
    /// Loads from environment variables. `token` overrides BOT_TOKEN and `mode` overrides
    /// UPDATE_MODE when provided. Call validate() after load to fail fast before init.
    pub fn load(token: Option<String>, mode: Option<&str>) -> Result<Self> {
        let mut telegram = TelegramConfig::load(token)?;
        if let Some(mode) = mode {
            telegram.mode = mode.parse::<UpdateMode>()?;
        }
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let default_locale = env::var("DEFAULT_LOCALE")
            .ok()
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        let max_inflight_actions = env_parse("MAX_INFLIGHT_ACTIONS", DEFAULT_MAX_INFLIGHT);

        Ok(Self {
            telegram,
            database_url,
            log_file,
            default_locale,
            max_inflight_actions,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.telegram.validate()?;
        if self.max_inflight_actions == 0 {
            return Err(config_error("MAX_INFLIGHT_ACTIONS must be positive"));
        }
        if !self.default_locale.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(config_error(format!(
                "DEFAULT_LOCALE must be a language code like 'en': {}",
                self.default_locale
            )));
        }
        if self.database_url.trim().is_empty() {
            return Err(config_error("DATABASE_URL is empty"));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> anyhow::Error {
    ModbotError::Config(message.into()).into()
}
