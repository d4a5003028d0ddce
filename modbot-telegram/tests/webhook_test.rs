//! Integration tests for the webhook endpoint, served on an ephemeral local port.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dispatcher::{Action, Dispatcher};
use modbot_core::Context;
use modbot_telegram::webhook::{self, SECRET_HEADER};
use serde_json::json;

struct Counter(Arc<AtomicUsize>);

#[async_trait]
impl Action for Counter {
    async fn run(&self, _ctx: &Context) -> modbot_core::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn start(secret: Option<&str>) -> (String, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let dispatcher = Arc::new(Dispatcher::default().add_action(Arc::new(Counter(count.clone()))));
    let router = webhook::router("/hook", dispatcher, secret.map(str::to_string));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(webhook::serve(listener, router));
    (format!("http://{}/hook", addr), count)
}

fn envelope() -> serde_json::Value {
    json!({
        "update_id": 100,
        "message": {"message_id": 1, "chat": {"id": 1, "type": "private"}, "text": "hi"}
    })
}

/// **Test: a valid envelope is dispatched before the 200 is returned.**
#[tokio::test]
async fn test_valid_envelope_is_dispatched() {
    let (url, count) = start(None).await;
    let response = reqwest::Client::new()
        .post(&url)
        .json(&envelope())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

/// **Test: missing or negative update_id is a 400 and nothing runs.**
#[tokio::test]
async fn test_missing_update_id_is_bad_request() {
    let (url, count) = start(None).await;
    let client = reqwest::Client::new();

    let no_id = json!({"message": {"message_id": 1, "chat": {"id": 1, "type": "private"}}});
    let response = client.post(&url).json(&no_id).send().await.unwrap();
    assert_eq!(response.status(), 400);

    let mut negative = envelope();
    negative["update_id"] = json!(-1);
    let response = client.post(&url).json(&negative).send().await.unwrap();
    assert_eq!(response.status(), 400);

    let mut text_id = envelope();
    text_id["update_id"] = json!("100");
    let response = client.post(&url).json(&text_id).send().await.unwrap();
    assert_eq!(response.status(), 400);

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

/// **Test: with a secret configured, requests without the matching header are 401.**
#[tokio::test]
async fn test_secret_token_is_enforced() {
    let (url, count) = start(Some("s3cret")).await;
    let client = reqwest::Client::new();

    let response = client.post(&url).json(&envelope()).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .post(&url)
        .header(SECRET_HEADER, "wrong")
        .json(&envelope())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .post(&url)
        .header(SECRET_HEADER, "s3cret")
        .json(&envelope())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

/// **Test: an unrecognized envelope with a valid id is acknowledged so Telegram does not retry it.**
#[tokio::test]
async fn test_unrecognized_envelope_is_acknowledged() {
    let (url, count) = start(None).await;
    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"update_id": 5, "brand_new_kind": {}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
