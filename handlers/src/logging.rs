//! Logs every update that produced a context.

use async_trait::async_trait;
use dispatcher::{Action, ActionMode};
use modbot_core::{Context, Result};
use tracing::{info, instrument};

/// Detached action; never fails and never delays the rest of the dispatch.
pub struct LoggingAction;

#[async_trait]
impl Action for LoggingAction {
    fn mode(&self) -> ActionMode {
        ActionMode::Async
    }

    #[instrument(skip(self, ctx))]
    async fn run(&self, ctx: &Context) -> Result<()> {
        info!(
            update_id = ?ctx.update_id(),
            kind = %ctx.kind(),
            chat_id = ?ctx.chat_id(),
            user_id = ?ctx.user_id(),
            username = %ctx.user().and_then(|u| u.username.as_deref()).unwrap_or("unknown"),
            commands = ctx.commands().len(),
            text = %ctx.text().unwrap_or(""),
            "Received update"
        );
        Ok(())
    }
}
