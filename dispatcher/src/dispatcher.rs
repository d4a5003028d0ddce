//! Dispatcher: runs actions, then command handlers, then callback handlers for each context.
//!
//! Every handler is isolated: an error is logged and counted, and the remaining handlers still
//! run. Async actions are spawned behind a semaphore so the number in flight stays bounded.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use modbot_core::{envelope_update_id, Context, ContextFactory, Update, UpdateType};
use serde_json::Value;
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, error, info, instrument, warn};

use crate::handler::{Action, ActionMode, CallbackHandler, CommandHandler};

/// Default cap on concurrently running async actions.
pub const DEFAULT_MAX_INFLIGHT: usize = 64;

/// What happened to one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A context was built and dispatched.
    Dispatched(DispatchReport),
    /// Known kind with no context constructor; nothing ran.
    Ignored(UpdateType),
    /// Unrecognized or malformed envelope; nothing ran.
    Rejected(String),
}

/// Counters for one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Sync actions awaited.
    pub actions_run: usize,
    /// Async actions spawned (their errors are logged by the task, not counted here).
    pub actions_spawned: usize,
    pub commands_run: usize,
    pub callbacks_run: usize,
    /// Awaited handlers that returned an error or panicked.
    pub failed: usize,
}

/// Three handler registries plus the factory that feeds them.
#[derive(Clone)]
pub struct Dispatcher {
    factory: ContextFactory,
    actions: Vec<Arc<dyn Action>>,
    commands: Vec<Arc<dyn CommandHandler>>,
    callbacks: Vec<Arc<dyn CallbackHandler>>,
    bot_username: Arc<RwLock<Option<String>>>,
    async_permits: Arc<Semaphore>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ContextFactory::default())
    }
}

impl Dispatcher {
    /// Creates a dispatcher with empty registries.
    pub fn new(factory: ContextFactory) -> Self {
        Self {
            factory,
            actions: Vec::new(),
            commands: Vec::new(),
            callbacks: Vec::new(),
            bot_username: Arc::new(RwLock::new(None)),
            async_permits: Arc::new(Semaphore::new(DEFAULT_MAX_INFLIGHT)),
        }
    }

    /// Appends an action (runs for every context, in registration order).
    pub fn add_action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Appends a command handler.
    pub fn add_command(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.commands.push(handler);
        self
    }

    /// Appends a callback handler.
    pub fn add_callback(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callbacks.push(handler);
        self
    }

    /// Caps concurrently running async actions (minimum 1).
    pub fn with_max_inflight(mut self, max: usize) -> Self {
        self.async_permits = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    /// Shares a bot-username cache, e.g. one filled by `getMe` at startup.
    pub fn with_bot_username(mut self, bot_username: Arc<RwLock<Option<String>>>) -> Self {
        self.bot_username = bot_username;
        self
    }

    pub async fn set_bot_username(&self, username: impl Into<String>) {
        *self.bot_username.write().await = Some(username.into());
    }

    pub fn bot_username(&self) -> Arc<RwLock<Option<String>>> {
        Arc::clone(&self.bot_username)
    }

    pub fn factory(&self) -> &ContextFactory {
        &self.factory
    }

    /// Async actions currently allowed to start without waiting.
    pub fn available_permits(&self) -> usize {
        self.async_permits.available_permits()
    }

    /// Recognizes one raw envelope and dispatches its context. Never fails: envelope errors are
    /// logged and reported as [`HandleOutcome::Rejected`].
    #[instrument(skip(self, envelope), fields(update_id = ?envelope_update_id(&envelope)))]
    pub async fn handle(&self, envelope: Value) -> HandleOutcome {
        let update = match Update::from_value(envelope) {
            Ok(update) => update,
            Err(e) => {
                error!(error = %e, "step: update rejected");
                return HandleOutcome::Rejected(e.to_string());
            }
        };
        let kind = update.update_type();
        match self.factory.from_update(update) {
            Some(ctx) => HandleOutcome::Dispatched(self.dispatch(Arc::new(ctx)).await),
            None => {
                debug!(kind = %kind, "step: no context for update kind, nothing to do");
                HandleOutcome::Ignored(kind)
            }
        }
    }

    /// Runs the actions, commands and callbacks passes for `ctx`.
    #[instrument(skip(self, ctx), fields(kind = %ctx.kind(), chat_id = ?ctx.chat_id(), user_id = ?ctx.user_id()))]
    pub async fn dispatch(&self, ctx: Arc<Context>) -> DispatchReport {
        let mut report = DispatchReport::default();
        info!("step: dispatch started");

        for action in &self.actions {
            match action.mode() {
                ActionMode::Sync => {
                    report.actions_run += 1;
                    match guarded(action.run(&ctx)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            report.failed += 1;
                            error!(action = action.name(), error = %e, details = ?e, "Action failed");
                        }
                        Err(panic) => {
                            report.failed += 1;
                            error!(action = action.name(), panic = %panic, "Action panicked");
                        }
                    }
                }
                ActionMode::Async => {
                    let permit = match Arc::clone(&self.async_permits).acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            warn!(action = action.name(), error = %e, "Async action pool closed");
                            continue;
                        }
                    };
                    let action = Arc::clone(action);
                    let ctx = Arc::clone(&ctx);
                    tokio::spawn(async move {
                        let _permit = permit;
                        if let Err(e) = action.run(&ctx).await {
                            error!(action = action.name(), error = %e, details = ?e, "Async action failed");
                        }
                    });
                    report.actions_spawned += 1;
                }
            }
        }

        let bot_username = self.bot_username.read().await.clone();
        for handler in &self.commands {
            let Some(command) = handler.is_called(&ctx, bot_username.as_deref()) else {
                continue;
            };
            debug!(handler = handler.name(), command = %command.name, "step: command matched");
            report.commands_run += 1;
            match guarded(handler.run(&ctx, command)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    error!(handler = handler.name(), command = %command.name, error = %e, details = ?e, "Command failed");
                }
                Err(panic) => {
                    report.failed += 1;
                    error!(handler = handler.name(), command = %command.name, panic = %panic, "Command panicked");
                }
            }
        }

        if let Some(query) = ctx.callback_query() {
            for handler in &self.callbacks {
                if !handler.is_called(&ctx) {
                    continue;
                }
                debug!(handler = handler.name(), callback = ?query.name(), "step: callback matched");
                report.callbacks_run += 1;
                match guarded(handler.run(&ctx, query)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        report.failed += 1;
                        error!(handler = handler.name(), error = %e, details = ?e, "Callback failed");
                    }
                    Err(panic) => {
                        report.failed += 1;
                        error!(handler = handler.name(), panic = %panic, "Callback panicked");
                    }
                }
            }
        }

        info!(
            actions_run = report.actions_run,
            actions_spawned = report.actions_spawned,
            commands_run = report.commands_run,
            callbacks_run = report.callbacks_run,
            failed = report.failed,
            "step: dispatch finished"
        );
        report
    }
}

/// Awaits a handler future, turning a panic into its message.
async fn guarded<F: Future>(fut: F) -> Result<F::Output, String> {
    AssertUnwindSafe(fut).catch_unwind().await.map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
