//! Webhook HTTP server
//!
//! A small axum app: one POST endpoint receiving GitHub webhook deliveries
//! and a health probe. Deliveries are acknowledged immediately and handled
//! on a spawned task, so a slow GitHub API call never holds the hook open.

use crate::context::BotContext;
use crate::events::{self, EventKind};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use board_bot_config::ServerConfig;
use log::{debug, info};
use std::sync::Arc;

pub fn router(ctx: Arc<BotContext>) -> Router {
    Router::new()
        .route("/webhook", post(receive_event))
        .route("/healthz", get(health))
        .with_state(ctx)
}

/// Bind and serve until the process is stopped
pub async fn serve(ctx: Arc<BotContext>, server: &ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening for webhooks on {}", addr);
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

async fn receive_event(
    State(ctx): State<Arc<BotContext>>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let Some(event_name) = headers
        .get("x-github-event")
        .and_then(|value| value.to_str().ok())
    else {
        return StatusCode::BAD_REQUEST;
    };

    let Some(kind) = EventKind::from_header(event_name) else {
        debug!("No handler registered for '{}' events, ignoring", event_name);
        return StatusCode::NO_CONTENT;
    };

    let Some(handler) = events::handler_for(kind) else {
        return StatusCode::NO_CONTENT;
    };

    debug!("Received '{}' event", event_name);
    tokio::spawn(handler(ctx, payload));
    StatusCode::ACCEPTED
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
