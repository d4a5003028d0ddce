//! Webhook ingress: one POST route feeding envelopes into the same dispatcher as the poll loop.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use dispatcher::Dispatcher;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Header Telegram echoes the `secret_token` from setWebhook in.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct WebhookState {
    dispatcher: Arc<Dispatcher>,
    secret: Option<Arc<str>>,
}

/// Router with a single `POST {path}` route.
pub fn router(path: &str, dispatcher: Arc<Dispatcher>, secret: Option<String>) -> Router {
    let state = WebhookState {
        dispatcher,
        secret: secret.map(Arc::from),
    };
    Router::new()
        .route(path, post(receive_update))
        .with_state(state)
}

async fn receive_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    Json(envelope): Json<Value>,
) -> StatusCode {
    if let Some(expected) = &state.secret {
        let given = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if given != Some(expected.as_ref()) {
            warn!("Webhook request with missing or wrong secret token");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let update_id = envelope.get("update_id").and_then(Value::as_i64);
    match update_id {
        Some(id) if id >= 0 && envelope.is_object() => {
            let outcome = state.dispatcher.handle(envelope).await;
            debug!(update_id = id, outcome = ?outcome, "step: webhook envelope handled");
            StatusCode::OK
        }
        _ => {
            warn!("Webhook body without a valid update_id");
            StatusCode::BAD_REQUEST
        }
    }
}

/// Serves `router` on `listener` until the server fails.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Webhook listening");
    }
    axum::serve(listener, router).await
}
