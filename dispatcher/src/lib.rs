//! # Dispatcher
//!
//! Routes each normalized [`modbot_core::Context`] through three independent registries:
//! actions (every context; sync ones awaited in order, async ones spawned behind a bounded pool),
//! command handlers (matched on parsed `/commands`) and callback handlers (matched on the
//! callback `c` discriminator). A failing handler never stops its siblings.

mod dispatcher;
mod handler;

pub use dispatcher::{DispatchReport, Dispatcher, HandleOutcome, DEFAULT_MAX_INFLIGHT};
pub use handler::{Action, ActionMode, CallbackHandler, CommandHandler};

// Integration tests live in tests/dispatcher_test.rs
