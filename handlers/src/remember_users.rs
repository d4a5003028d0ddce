//! Records every user an update reveals, so later `@username` mentions resolve.

use std::sync::Arc;

use async_trait::async_trait;
use dispatcher::Action;
use modbot_core::{Context, EntityKind, Result, User, UserDirectory};
use tracing::debug;

/// Sync action: runs before commands, so a command in the same message already sees the sender.
pub struct RememberUsersAction {
    directory: Arc<dyn UserDirectory>,
}

impl RememberUsersAction {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }
}

/// Sender, joined/left members, the replied-to author and text-mentioned users, deduplicated by id.
fn users_in(ctx: &Context) -> Vec<&User> {
    let mut candidates: Vec<&User> = Vec::new();
    candidates.extend(ctx.user());
    candidates.extend(ctx.new_chat_member());
    candidates.extend(ctx.left_chat_member());
    if let Some(message) = ctx.message() {
        candidates.extend(message.new_chat_members());
        candidates.extend(message.reply_to().and_then(|m| m.from()));
        candidates.extend(
            message
                .entities()
                .iter()
                .filter(|e| e.kind == EntityKind::TextMention)
                .filter_map(|e| e.user.as_ref()),
        );
    }
    let mut users: Vec<&User> = Vec::new();
    for user in candidates {
        if !users.iter().any(|u| u.id == user.id) {
            users.push(user);
        }
    }
    users
}

#[async_trait]
impl Action for RememberUsersAction {
    async fn run(&self, ctx: &Context) -> Result<()> {
        let users = users_in(ctx);
        for user in &users {
            self.directory.remember(user).await?;
        }
        debug!(count = users.len(), "Users remembered");
        Ok(())
    }
}
