//! Inline-button callback queries and the `{ c, d }` payload convention.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{message::RawMessage, user::User};

/// `callback_query` payload as sent by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<RawMessage>,
    #[serde(default)]
    pub inline_message_id: Option<String>,
    #[serde(default)]
    pub chat_instance: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Callback query as seen by handlers. `data` is the decoded JSON payload; it is `None` when the
/// button carried no data or the data was not valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub chat_instance: Option<String>,
    pub inline_message_id: Option<String>,
    pub raw_data: Option<String>,
    pub data: Option<Value>,
}

impl CallbackQuery {
    /// Builds the handler view; malformed JSON in `data` degrades to `None`.
    pub fn from_raw(raw: &RawCallbackQuery) -> Self {
        let data = raw
            .data
            .as_deref()
            .and_then(|s| serde_json::from_str::<Value>(s).ok());
        Self {
            id: raw.id.clone(),
            from: raw.from.clone(),
            chat_instance: raw.chat_instance.clone(),
            inline_message_id: raw.inline_message_id.clone(),
            raw_data: raw.data.clone(),
            data,
        }
    }

    /// The `c` discriminator selecting a callback handler.
    pub fn name(&self) -> Option<&str> {
        self.data.as_ref()?.get("c")?.as_str()
    }

    /// The `d` argument.
    pub fn argument(&self) -> Option<&Value> {
        self.data.as_ref()?.get("d")
    }

    /// Numeric ids carried in `d`: a comma-joined string, a single number or an array of numbers.
    /// Tokens that do not parse are skipped.
    pub fn ids(&self) -> Vec<i64> {
        match self.argument() {
            Some(Value::String(s)) => s
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
            Some(Value::Number(n)) => n.as_i64().into_iter().collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_i64().or_else(|| v.as_str()?.trim().parse().ok()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Outbound `{ c, d }` payload for an inline button.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackData {
    pub c: String,
    pub d: Value,
}

impl CallbackData {
    pub fn new(name: impl Into<String>, argument: impl Into<Value>) -> Self {
        Self {
            c: name.into(),
            d: argument.into(),
        }
    }

    /// `d` as a comma-joined id list.
    pub fn with_ids(name: impl Into<String>, ids: &[i64]) -> Self {
        let joined = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self::new(name, joined)
    }

    /// Compact JSON string for `callback_data`. The platform caps this at 64 bytes.
    pub fn encode(&self) -> String {
        json!({ "c": self.c, "d": self.d }).to_string()
    }
}
