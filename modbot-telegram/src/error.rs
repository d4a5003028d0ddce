//! Errors from the raw Bot API client.

use thiserror::Error;

/// Failure of a Bot API call (transport, HTTP status, or `ok: false`).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Telegram API error (code {code:?}): {description}")]
    Telegram {
        code: Option<i64>,
        description: String,
    },

    #[error("response has no result")]
    MissingResult,

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}
