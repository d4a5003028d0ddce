//! # modbot-cli
//!
//! CLI for modbot: argument parsing, config loading, wiring, and envelope inspection.

pub mod app;
pub mod cli;
pub mod config;
pub mod inspect;

pub use app::{build_dispatcher, run_bot};
pub use cli::{Cli, Commands};
pub use config::BotConfig;
pub use inspect::{describe_envelope, inspect_file};
