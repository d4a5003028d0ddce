//! CLI parser.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "modbot")]
#[command(about = "Telegram moderation bot: run, inspect", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (config from env; token and mode override BOT_TOKEN and UPDATE_MODE).
    Run {
        #[arg(short, long)]
        token: Option<String>,
        /// polling or webhook
        #[arg(short, long)]
        mode: Option<String>,
    },
    /// Print how saved update envelopes are recognized (a JSON object, an array, or a getUpdates response).
    Inspect { path: PathBuf },
}
