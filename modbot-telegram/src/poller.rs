//! Long-poll loop: fetch a batch, dispatch every envelope, advance the offset.
//!
//! Delivery is at-least-once. A failed fetch keeps the offset so the same batch is fetched again;
//! the offset only moves once a batch has been fully dispatched.

use std::sync::Arc;
use std::time::Duration;

use dispatcher::Dispatcher;
use modbot_core::envelope_update_id;
use tracing::{debug, info, instrument, warn};

use crate::api::{GetUpdates, UpdateSource};
use crate::config::TelegramConfig;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub timeout_secs: u32,
    pub allowed_updates: Vec<String>,
    /// First delay after a failed poll; doubles per consecutive failure.
    pub retry_delay: Duration,
    pub max_retry_delay: Duration,
}

impl From<&TelegramConfig> for PollerConfig {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            timeout_secs: config.poll_timeout_secs,
            allowed_updates: config.allowed_updates.clone(),
            retry_delay: config.retry_delay(),
            max_retry_delay: config.max_retry_delay(),
        }
    }
}

pub struct Poller<S> {
    source: S,
    dispatcher: Arc<Dispatcher>,
    config: PollerConfig,
    offset: Option<i64>,
}

impl<S: UpdateSource> Poller<S> {
    pub fn new(source: S, dispatcher: Arc<Dispatcher>, config: PollerConfig) -> Self {
        Self {
            source,
            dispatcher,
            config,
            offset: None,
        }
    }

    /// Starts from a known offset instead of letting Telegram pick the oldest pending update.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Offset sent with the next poll.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// One long poll. Returns how many envelopes were dispatched.
    #[instrument(skip(self), fields(offset = ?self.offset))]
    pub async fn poll_once(&mut self) -> Result<usize, ApiError> {
        let request = GetUpdates {
            offset: self.offset,
            timeout: self.config.timeout_secs,
            allowed_updates: self.config.allowed_updates.clone(),
        };
        let updates = self.source.get_updates(&request).await?;
        let count = updates.len();

        let mut max_id: Option<i64> = None;
        for envelope in updates {
            if let Some(id) = envelope_update_id(&envelope) {
                max_id = Some(max_id.map_or(id, |m| m.max(id)));
            }
            let outcome = self.dispatcher.handle(envelope).await;
            debug!(outcome = ?outcome, "step: envelope handled");
        }

        if let Some(max_id) = max_id {
            let next = max_id + 1;
            if self.offset.map_or(true, |current| next > current) {
                self.offset = Some(next);
            }
        }
        Ok(count)
    }

    /// Polls until the process exits. Failures back off exponentially up to the configured cap;
    /// the delay resets after the next successful poll.
    pub async fn run(mut self) {
        info!(
            timeout_secs = self.config.timeout_secs,
            allowed_updates = ?self.config.allowed_updates,
            "Polling started"
        );
        let mut delay = self.config.retry_delay;
        loop {
            match self.poll_once().await {
                Ok(count) => {
                    if count > 0 {
                        debug!(count, next_offset = ?self.offset, "step: batch dispatched");
                    }
                    delay = self.config.retry_delay;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        offset = ?self.offset,
                        retry_in_ms = delay.as_millis() as u64,
                        "Polling failed, keeping offset"
                    );
                    tokio::time::sleep(delay).await;
                    delay = next_delay(delay, self.config.max_retry_delay);
                }
            }
        }
    }
}

fn next_delay(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}
