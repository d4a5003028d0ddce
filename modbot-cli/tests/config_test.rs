//! Config loading tests. They mutate process env, so each runs serially.

use std::env;

use modbot_cli::BotConfig;
use modbot_core::ModbotError;
use modbot_telegram::UpdateMode;
use serial_test::serial;

const KEYS: [&str; 8] = [
    "BOT_TOKEN",
    "UPDATE_MODE",
    "DATABASE_URL",
    "LOG_FILE",
    "DEFAULT_LOCALE",
    "MAX_INFLIGHT_ACTIONS",
    "WEBHOOK_URL",
    "TELEGRAM_API_URL",
];

fn clear_env() {
    for key in KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_config_with_defaults() {
    clear_env();
    env::set_var("BOT_TOKEN", "test_token");

    let config = BotConfig::load(None, None).unwrap();
    clear_env();

    assert_eq!(config.telegram.bot_token, "test_token");
    assert_eq!(config.telegram.mode, UpdateMode::Polling);
    assert_eq!(config.database_url, "./modbot.db");
    assert_eq!(config.log_file, "logs/modbot.log");
    assert_eq!(config.default_locale, "en");
    assert_eq!(config.max_inflight_actions, 64);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_cli_arguments_override_env() {
    clear_env();
    env::set_var("BOT_TOKEN", "env_token");
    env::set_var("UPDATE_MODE", "polling");
    env::set_var("WEBHOOK_URL", "https://bot.example.com/telegram/webhook");

    let config = BotConfig::load(Some("cli_token".to_string()), Some("webhook")).unwrap();
    clear_env();

    assert_eq!(config.telegram.bot_token, "cli_token");
    assert_eq!(config.telegram.mode, UpdateMode::Webhook);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_missing_token_and_bad_mode_fail() {
    clear_env();
    assert!(BotConfig::load(None, None).is_err());
    assert!(BotConfig::load(Some("t".to_string()), Some("carrier-pigeon")).is_err());
}

#[test]
#[serial]
fn test_env_overrides_and_validation() {
    clear_env();
    env::set_var("BOT_TOKEN", "t");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("DEFAULT_LOCALE", " DE ");
    env::set_var("MAX_INFLIGHT_ACTIONS", "0");

    let config = BotConfig::load(None, None).unwrap();
    clear_env();

    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.default_locale, "de");
    assert_eq!(config.max_inflight_actions, 0);
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ModbotError>(),
        Some(ModbotError::Config(msg)) if msg.contains("MAX_INFLIGHT_ACTIONS")
    ));
}

#[test]
#[serial]
fn test_malformed_max_inflight_uses_default() {
    clear_env();
    env::set_var("BOT_TOKEN", "t");
    env::set_var("MAX_INFLIGHT_ACTIONS", "lots");

    let config = BotConfig::load(None, None).unwrap();
    clear_env();

    assert_eq!(config.max_inflight_actions, 64);
    assert!(config.validate().is_ok());
}
