//! Wiring: storage, outbound bot, handlers and dispatcher, then the configured ingress.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use dispatcher::Dispatcher;
use handlers::{BuiltinCommands, CloseCallback, LoggingAction, RememberUsersAction};
use modbot_core::{init_tracing, Bot, ContextFactory, UserDirectory};
use modbot_telegram::{cache_bot_username, TelegramBotAdapter};
use storage::UserRepository;
use tracing::{info, instrument};

use crate::config::BotConfig;

/// Dispatcher with the built-in handlers registered. Actions run in this order: logging
/// (detached), then user bookkeeping, so commands already see the sender in the directory.
pub fn build_dispatcher(
    config: &BotConfig,
    bot: Arc<dyn Bot>,
    directory: Arc<dyn UserDirectory>,
) -> Dispatcher {
    Dispatcher::new(ContextFactory::new(config.default_locale.clone()))
        .with_max_inflight(config.max_inflight_actions)
        .add_action(Arc::new(LoggingAction))
        .add_action(Arc::new(RememberUsersAction::new(directory.clone())))
        .add_command(Arc::new(BuiltinCommands::new(bot.clone(), directory)))
        .add_callback(Arc::new(CloseCallback::new(bot)))
}

/// Validates config, initializes tracing and storage, then runs until the ingress stops.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;

    info!(
        database_url = %config.database_url,
        mode = %config.telegram.mode,
        default_locale = %config.default_locale,
        "Initializing bot"
    );

    let directory: Arc<dyn UserDirectory> = Arc::new(
        UserRepository::new(&config.database_url)
            .await
            .context("open user database")?,
    );
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::from_config(&config.telegram)?);
    let dispatcher = build_dispatcher(&config, bot.clone(), directory);
    cache_bot_username(bot.as_ref(), &dispatcher).await;

    info!("Bot started successfully");
    modbot_telegram::run(&config.telegram, Arc::new(dispatcher)).await
}
