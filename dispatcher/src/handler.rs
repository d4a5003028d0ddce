//! Handler traits for the three dispatch passes.

use async_trait::async_trait;
use modbot_core::{CallbackQuery, Command, Context, Result, UpdateType};

/// How the dispatcher runs an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    /// Awaited before the next action starts.
    Sync,
    /// Spawned on the runtime; no ordering relative to later actions.
    Async,
}

/// Runs unconditionally for every context.
#[async_trait]
pub trait Action: Send + Sync {
    fn mode(&self) -> ActionMode {
        ActionMode::Sync
    }

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, ctx: &Context) -> Result<()>;
}

/// Runs when the message carries one of the declared `/commands`.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command names this handler answers to, without the leading slash.
    fn commands(&self) -> &[&'static str];

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Update kinds whose commands are considered. Edits are skipped so editing a command
    /// message does not run it again.
    fn accepts_kind(&self, kind: UpdateType) -> bool {
        !matches!(
            kind,
            UpdateType::EditedMessage
                | UpdateType::EditedChannelPost
                | UpdateType::EditedBusinessMessage
        )
    }

    /// First parsed command matching a declared name and addressed to this bot (no `@suffix`,
    /// or a suffix equal to `bot_username`).
    fn is_called<'a>(&self, ctx: &'a Context, bot_username: Option<&str>) -> Option<&'a Command> {
        if !self.accepts_kind(ctx.kind()) {
            return None;
        }
        ctx.commands().iter().find(|command| {
            command.is_addressed_to(bot_username)
                && self
                    .commands()
                    .iter()
                    .any(|name| command.is(name.trim_start_matches('/')))
        })
    }

    async fn run(&self, ctx: &Context, command: &Command) -> Result<()>;
}

/// Runs when an inline button's `c` discriminator names one of the declared callbacks.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    fn callbacks(&self) -> &[&'static str];

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// False when there is no callback query or its data did not decode.
    fn is_called(&self, ctx: &Context) -> bool {
        ctx.callback_query()
            .and_then(CallbackQuery::name)
            .is_some_and(|name| self.callbacks().iter().any(|c| *c == name))
    }

    async fn run(&self, ctx: &Context, query: &CallbackQuery) -> Result<()>;
}
