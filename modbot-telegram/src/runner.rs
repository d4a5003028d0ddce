//! Startup and the two ingress modes.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use dispatcher::Dispatcher;
use modbot_core::Bot;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::api::TelegramApi;
use crate::config::{TelegramConfig, UpdateMode};
use crate::poller::{Poller, PollerConfig};
use crate::webhook;

/// Calls getMe and caches the bot username for command suffix matching. A failure is logged and
/// leaves the username unknown, in which case any `@suffix` is accepted.
pub async fn cache_bot_username(bot: &dyn Bot, dispatcher: &Dispatcher) -> Option<String> {
    match bot.get_me().await {
        Ok(me) => {
            let username = me.username?;
            dispatcher.set_bot_username(username.clone()).await;
            info!(username = %username, "Bot username set");
            Some(username)
        }
        Err(e) => {
            warn!(error = %e, "getMe failed, bot username unknown");
            None
        }
    }
}

/// Runs the configured ingress until the process exits or the webhook server fails.
#[instrument(skip(config, dispatcher), fields(mode = %config.mode))]
pub async fn run(config: &TelegramConfig, dispatcher: Arc<Dispatcher>) -> Result<()> {
    match config.mode {
        UpdateMode::Polling => run_polling(config, dispatcher).await,
        UpdateMode::Webhook => run_webhook(config, dispatcher).await,
    }
}

pub async fn run_polling(config: &TelegramConfig, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let api = TelegramApi::from_config(config).context("build Bot API client")?;
    // A registered webhook makes getUpdates fail with 409.
    if let Err(e) = api.delete_webhook(false).await {
        warn!(error = %e, "deleteWebhook failed, polling may be rejected");
    }
    Poller::new(api, dispatcher, PollerConfig::from(config))
        .run()
        .await;
    Ok(())
}

pub async fn run_webhook(config: &TelegramConfig, dispatcher: Arc<Dispatcher>) -> Result<()> {
    if let Some(url) = &config.webhook_url {
        let api = TelegramApi::from_config(config).context("build Bot API client")?;
        api.set_webhook(url, &config.allowed_updates, config.webhook_secret.as_deref())
            .await
            .context("setWebhook")?;
        info!(url = %url, "Webhook registered");
    }
    let listener = TcpListener::bind(&config.webhook_listen_addr)
        .await
        .with_context(|| format!("bind {}", config.webhook_listen_addr))?;
    let router = webhook::router(
        &config.webhook_path,
        dispatcher,
        config.webhook_secret.clone(),
    );
    webhook::serve(listener, router)
        .await
        .context("webhook server")?;
    Ok(())
}
