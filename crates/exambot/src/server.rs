//! Webhook HTTP server.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::bot::BotContext;
use crate::error::Result;
use crate::gateway::{self, GatewayRequest, GatewayResponse};
use crate::handlers;

pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Routes:
/// - `POST /webhook`: raw Telegram update
/// - `POST /invoke`: API gateway event, answered with a gateway response
/// - `GET /healthz`
pub fn router(context: Arc<BotContext>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/invoke", post(invoke))
        .route("/healthz", get(healthz))
        .with_state(context)
}

/// Serves the router on `bind` until Ctrl-C.
///
/// # Errors
/// Fails if the address cannot be bound or the server stops with an I/O error.
pub async fn serve(context: Arc<BotContext>, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "exambot listening");
    axum::serve(listener, router(context))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn webhook(
    State(context): State<Arc<BotContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !secret_matches(context.webhook_secret(), &headers) {
        warn!("rejecting webhook call with wrong secret token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match handlers::handle_webhook_body(&context, &body).await {
        Ok(outcome) => {
            debug!(?outcome, "update handled");
            Json(GatewayResponse::ok()).into_response()
        }
        Err(err) => {
            error!(error = %err, "webhook handling failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn invoke(State(context): State<Arc<BotContext>>, body: Bytes) -> Response {
    let event: GatewayRequest = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "malformed gateway event");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match gateway::handle_event(&context, &event).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            error!(error = %err, "gateway event failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

fn secret_matches(expected: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected)
}
