//! Offline recognition of saved envelopes, for debugging what a given update turns into.

use std::path::Path;

use anyhow::{Context as _, Result};
use modbot_core::{Context, ContextFactory, Update};
use serde_json::Value;

/// One summary line per envelope in the file at `path`.
pub fn inspect_file(path: &Path, factory: &ContextFactory) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(envelopes(value)
        .into_iter()
        .map(|envelope| describe_envelope(envelope, factory))
        .collect())
}

/// A single envelope, an array of them, or a saved `{ok, result: [...]}` getUpdates response.
fn envelopes(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) if !map.contains_key("update_id") && map.contains_key("result") => {
            match map.remove("result") {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            }
        }
        other => vec![other],
    }
}

pub fn describe_envelope(envelope: Value, factory: &ContextFactory) -> String {
    let update = match Update::from_value(envelope) {
        Ok(update) => update,
        Err(e) => return format!("rejected: {}", e),
    };
    let id = update
        .update_id
        .map_or_else(|| "?".to_string(), |id| id.to_string());
    let kind = update.update_type();
    match factory.from_update(update) {
        Some(ctx) => format!("update {}: {}", id, summarize(&ctx)),
        None => format!("update {}: {} (no context)", id, kind),
    }
}

fn summarize(ctx: &Context) -> String {
    let mut parts = vec![ctx.kind().to_string()];
    if let Some(chat_id) = ctx.chat_id() {
        parts.push(format!("chat={}", chat_id));
    }
    if let Some(user_id) = ctx.user_id() {
        parts.push(format!("user={}", user_id));
    }
    parts.push(format!("locale={}", ctx.locale()));
    if let Some(user) = ctx.new_chat_member() {
        parts.push(format!("joined={}", user.id));
    }
    if let Some(user) = ctx.left_chat_member() {
        parts.push(format!("left={}", user.id));
    }
    for command in ctx.commands() {
        let mut text = format!("/{}", command.name);
        if let Some(bot) = &command.bot_username {
            text.push('@');
            text.push_str(bot);
        }
        if !command.params.is_empty() {
            text.push(' ');
            text.push_str(&command.params.join(" "));
        }
        parts.push(format!("command=[{}]", text));
    }
    if let Some(query) = ctx.callback_query() {
        parts.push(format!("callback={}", query.name().unwrap_or("-")));
    }
    parts.join(" ")
}
