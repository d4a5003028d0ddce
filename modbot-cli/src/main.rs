//! modbot CLI: run the bot or inspect saved envelopes. Config from env, `.env` and CLI args.

use anyhow::Result;
use clap::Parser;
use modbot_cli::{inspect_file, run_bot, BotConfig, Cli, Commands};
use modbot_core::ContextFactory;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token, mode } => {
            let config = BotConfig::load(token, mode.as_deref())?;
            run_bot(config).await
        }
        Commands::Inspect { path } => {
            let locale = std::env::var("DEFAULT_LOCALE")
                .unwrap_or_else(|_| modbot_core::DEFAULT_LOCALE.to_string());
            for line in inspect_file(&path, &ContextFactory::new(locale))? {
                println!("{}", line);
            }
            Ok(())
        }
    }
}
