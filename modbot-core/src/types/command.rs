//! Parsed `/command` value object.

use serde::{Deserialize, Serialize};

/// A `/name[@botusername] [params...]` command found in message text.
///
/// `start` and `end` are inclusive UTF-16 offsets of the command token in the owning message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command name without the leading slash and without the `@botusername` suffix.
    pub name: String,
    /// The `@botusername` suffix, without `@`, when present.
    pub bot_username: Option<String>,
    pub start: usize,
    pub end: usize,
    /// Whitespace-split tokens following the command.
    pub params: Vec<String>,
}

impl Command {
    /// True when `name` equals this command's name, ignoring ASCII case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// True when the command carries no suffix, the suffix names `bot_username`, or the bot's
    /// own username is not known yet.
    pub fn is_addressed_to(&self, bot_username: Option<&str>) -> bool {
        match (&self.bot_username, bot_username) {
            (None, _) | (Some(_), None) => true,
            (Some(suffix), Some(own)) => suffix.eq_ignore_ascii_case(own.trim_start_matches('@')),
        }
    }
}
