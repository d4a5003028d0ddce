//! # Built-in handlers for modbot
//!
//! Handlers registered by default: update logging, user bookkeeping for mention resolution,
//! `/start` `/help` `/id`, and the "close" inline button.

mod builtin_commands;
mod close_callback;
mod logging;
mod remember_users;

#[cfg(test)]
mod test;

pub use builtin_commands::{BuiltinCommand, BuiltinCommands};
pub use close_callback::{close_button_data, CloseCallback, CLOSE_CALLBACK};
pub use logging::LoggingAction;
pub use remember_users::RememberUsersAction;
