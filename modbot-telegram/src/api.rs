//! Raw Bot API client for the calls that carry untyped update envelopes.
//!
//! Envelopes stay as `serde_json::Value` so the envelope recognizer in modbot-core sees exactly
//! what Telegram sent, including kinds newer than any typed client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::TelegramConfig;
use crate::error::ApiError;

/// Extra client-side slack on top of the server-side long-poll timeout.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// Parameters of one `getUpdates` long poll.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u32,
    pub allowed_updates: Vec<String>,
}

/// Anything that can answer a long poll with a batch of raw envelopes.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn get_updates(&self, request: &GetUpdates) -> Result<Vec<Value>, ApiError>;
}

#[async_trait]
impl<T: UpdateSource + ?Sized> UpdateSource for std::sync::Arc<T> {
    async fn get_updates(&self, request: &GetUpdates) -> Result<Vec<Value>, ApiError> {
        (**self).get_updates(request).await
    }
}

/// `{ok, result, description, error_code}` wrapper of every Bot API response.
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Serialize)]
struct SetWebhook<'a> {
    url: &'a str,
    allowed_updates: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteWebhook {
    drop_pending_updates: bool,
}

#[derive(Debug, Clone)]
pub struct TelegramApi {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl TelegramApi {
    /// `api_url` is the Bot API base (e.g. `https://api.telegram.org`); `long_poll_timeout` is the
    /// server-side getUpdates timeout the client timeout is derived from.
    pub fn new(
        api_url: &str,
        token: impl Into<String>,
        long_poll_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(long_poll_timeout + CLIENT_TIMEOUT_SLACK)
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &TelegramConfig) -> Result<Self, ApiError> {
        Self::new(
            config.api_url(),
            config.bot_token.clone(),
            Duration::from_secs(u64::from(config.poll_timeout_secs)),
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: TelegramResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(ApiError::Decode(e)),
            Err(_) => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body: text,
                })
            }
        };
        if !parsed.ok {
            return Err(ApiError::Telegram {
                code: parsed.error_code,
                description: parsed.description.unwrap_or_default(),
            });
        }
        parsed.result.ok_or(ApiError::MissingResult)
    }

    /// Registers `url` as the webhook target.
    #[instrument(skip(self, secret_token))]
    pub async fn set_webhook(
        &self,
        url: &str,
        allowed_updates: &[String],
        secret_token: Option<&str>,
    ) -> Result<bool, ApiError> {
        let body = SetWebhook {
            url,
            allowed_updates,
            secret_token,
        };
        self.call("setWebhook", &body).await
    }

    /// Removes any webhook so getUpdates works.
    #[instrument(skip(self))]
    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<bool, ApiError> {
        self.call(
            "deleteWebhook",
            &DeleteWebhook {
                drop_pending_updates,
            },
        )
        .await
    }
}

#[async_trait]
impl UpdateSource for TelegramApi {
    async fn get_updates(&self, request: &GetUpdates) -> Result<Vec<Value>, ApiError> {
        let updates: Vec<Value> = self.call("getUpdates", request).await?;
        debug!(offset = ?request.offset, count = updates.len(), "getUpdates returned");
        Ok(updates)
    }
}
