//! End-to-end: raw envelopes through the default dispatcher wiring, with a recording bot and an
//! in-memory user directory standing in for Telegram and SQLite.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dispatcher::HandleOutcome;
use modbot_cli::{build_dispatcher, BotConfig};
use modbot_core::{Bot, InMemoryUserDirectory, Result, User};
use modbot_telegram::TelegramConfig;
use serde_json::json;

#[derive(Default)]
struct RecordingBot {
    calls: Mutex<Vec<String>>,
}

impl RecordingBot {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("send {} {}", chat_id, text));
        Ok(())
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("html {} {}", chat_id, html));
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str, _text: Option<&str>) -> Result<()> {
        self.calls.lock().unwrap().push(format!("answer {}", query_id));
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete {} {}", chat_id, message_id));
        Ok(())
    }

    async fn get_me(&self) -> Result<User> {
        Ok(User {
            id: 1,
            is_bot: true,
            first_name: "Modbot".to_string(),
            last_name: None,
            username: Some("modbot".to_string()),
            language_code: None,
        })
    }
}

fn config() -> BotConfig {
    BotConfig {
        telegram: TelegramConfig::with_token("t"),
        database_url: "sqlite::memory:".to_string(),
        log_file: "logs/test.log".to_string(),
        default_locale: "en".to_string(),
        max_inflight_actions: 4,
    }
}

/// **Test: a user seen in one update resolves as a mention in the next `/id`.**
#[tokio::test]
async fn test_mention_resolves_after_user_was_seen() {
    let bot = Arc::new(RecordingBot::default());
    let directory = Arc::new(InMemoryUserDirectory::new());
    let dispatcher = build_dispatcher(&config(), bot.clone(), directory);
    modbot_telegram::cache_bot_username(bot.as_ref(), &dispatcher).await;

    dispatcher
        .handle(json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "chat": {"id": -5, "type": "group"},
                "from": {"id": 77, "first_name": "Eve", "username": "eve"},
                "text": "hello"
            }
        }))
        .await;

    let outcome = dispatcher
        .handle(json!({
            "update_id": 2,
            "message": {
                "message_id": 2,
                "chat": {"id": -5, "type": "group"},
                "from": {"id": 10, "first_name": "Mod"},
                "text": "/id@modbot @eve",
                "entities": [
                    {"type": "bot_command", "offset": 0, "length": 10},
                    {"type": "mention", "offset": 11, "length": 4}
                ]
            }
        }))
        .await;

    assert!(matches!(outcome, HandleOutcome::Dispatched(ref r) if r.commands_run == 1 && r.failed == 0));
    // Default reply_to: plain message to the same chat.
    assert_eq!(bot.calls(), vec!["send -5 Eve: 77".to_string()]);
}

/// **Test: commands addressed to another bot are not answered once the username is cached.**
#[tokio::test]
async fn test_command_for_other_bot_is_ignored() {
    let bot = Arc::new(RecordingBot::default());
    let dispatcher = build_dispatcher(&config(), bot.clone(), Arc::new(InMemoryUserDirectory::new()));
    let username = modbot_telegram::cache_bot_username(bot.as_ref(), &dispatcher).await;
    assert_eq!(username.as_deref(), Some("modbot"));

    dispatcher
        .handle(json!({
            "update_id": 3,
            "message": {
                "message_id": 3,
                "chat": {"id": -5, "type": "group"},
                "text": "/help@otherbot",
                "entities": [{"type": "bot_command", "offset": 0, "length": 14}]
            }
        }))
        .await;
    assert!(bot.calls().is_empty());
}

/// **Test: the close button answers the query and deletes its message.**
#[tokio::test]
async fn test_close_button() {
    let bot = Arc::new(RecordingBot::default());
    let dispatcher = build_dispatcher(&config(), bot.clone(), Arc::new(InMemoryUserDirectory::new()));

    dispatcher
        .handle(json!({
            "update_id": 4,
            "callback_query": {
                "id": "cb",
                "from": {"id": 10, "first_name": "Mod"},
                "message": {"message_id": 9, "chat": {"id": -5, "type": "group"}},
                "data": handlers::close_button_data()
            }
        }))
        .await;

    assert_eq!(bot.calls(), vec!["answer cb".to_string(), "delete -5 9".to_string()]);
}

