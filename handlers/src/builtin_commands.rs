//! `/start`, `/help` and `/id`.

use std::sync::Arc;

use async_trait::async_trait;
use dispatcher::CommandHandler;
use modbot_core::{Bot, Command, Context, HandlerError, Message, Result, User, UserDirectory};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCommand {
    Start,
    Help,
    Id,
}

impl BuiltinCommand {
    pub const ALL: [BuiltinCommand; 3] = [Self::Start, Self::Help, Self::Id];

    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Id => "id",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Start => "introduce the bot",
            Self::Help => "list available commands",
            Self::Id => "show ids of you, the chat, a replied-to or mentioned user",
        }
    }

    /// Case-insensitive, as command names are matched by the dispatcher.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

pub struct BuiltinCommands {
    bot: Arc<dyn Bot>,
    directory: Arc<dyn UserDirectory>,
}

impl BuiltinCommands {
    pub fn new(bot: Arc<dyn Bot>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { bot, directory }
    }

    fn start_text(ctx: &Context) -> String {
        let name = ctx
            .user()
            .map(|u| u.first_name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("there");
        format!(
            "Hi {}! I help moderate this chat. Send /help for the command list.",
            name
        )
    }

    fn help_text() -> String {
        let mut text = String::from("Commands:");
        for command in BuiltinCommand::ALL {
            text.push_str(&format!("\n/{} - {}", command.name(), command.description()));
        }
        text
    }

    async fn id_text(&self, ctx: &Context, message: &Message) -> String {
        let mentioned = message.mentions(self.directory.as_ref()).await;
        if !mentioned.is_empty() {
            return mentioned.iter().map(describe).collect::<Vec<_>>().join("\n");
        }
        if let Some(author) = message.reply_to().and_then(|m| m.from()) {
            return describe(author);
        }
        let mut lines = Vec::new();
        if let Some(user) = ctx.user() {
            lines.push(format!("Your id: {}", user.id));
        }
        if let Some(chat_id) = ctx.chat_id() {
            lines.push(format!("Chat id: {}", chat_id));
        }
        lines.join("\n")
    }
}

fn describe(user: &User) -> String {
    format!("{}: {}", user.full_name(), user.id)
}

#[async_trait]
impl CommandHandler for BuiltinCommands {
    fn commands(&self) -> &[&'static str] {
        &["start", "help", "id"]
    }

    #[instrument(skip(self, ctx, command), fields(command = %command.name, chat_id = ?ctx.chat_id()))]
    async fn run(&self, ctx: &Context, command: &Command) -> Result<()> {
        let which = BuiltinCommand::from_name(&command.name)
            .ok_or_else(|| HandlerError::InvalidCommand(command.name.clone()))?;
        let message = ctx.message().ok_or(HandlerError::MissingContext("message"))?;

        let text = match which {
            BuiltinCommand::Start => Self::start_text(ctx),
            BuiltinCommand::Help => Self::help_text(),
            BuiltinCommand::Id => self.id_text(ctx, message).await,
        };
        if text.is_empty() {
            return Err(HandlerError::MissingContext("user").into());
        }

        self.bot.reply_to(message, &text).await?;
        info!(command = which.name(), "Builtin command answered");
        Ok(())
    }
}
