//! API gateway invocation envelope.
//!
//! In the serverless deployment the gateway wraps the Telegram webhook body
//! in an event and expects a fixed-shape response back. Only `body` and
//! `isBase64Encoded` matter to the handler; the rest is kept for logging.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::bot::BotContext;
use crate::error::Result;
use crate::handlers::{self, Outcome};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayRequest {
    pub operation_id: Option<String>,
    pub resource: Option<String>,
    pub http_method: Option<String>,
    pub path: Option<String>,
    pub path_parameters: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub query_string_parameters: HashMap<String, String>,
    pub multi_value_query_string_parameters: HashMap<String, Vec<String>>,
    pub parameters: HashMap<String, String>,
    pub multi_value_parameters: HashMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
    pub request_context: Value,
}

impl GatewayRequest {
    /// The webhook body, base64-decoded when the gateway flagged it.
    ///
    /// # Errors
    /// Fails if a flagged body is not valid base64.
    pub fn decoded_body(&self) -> Result<Vec<u8>> {
        if self.is_base64_encoded {
            Ok(BASE64.decode(self.body.trim())?)
        } else {
            Ok(self.body.clone().into_bytes())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub body: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_base64_encoded: bool,
}

impl GatewayResponse {
    /// The acknowledgment returned on every handled path.
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            headers: HashMap::new(),
            multi_value_headers: HashMap::new(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }
}

/// Handles one gateway event.
///
/// # Errors
/// Returns the handler's fatal errors (malformed body, failed photo
/// pipeline, failed send); the gateway reports those as invocation failures.
pub async fn handle_event(context: &BotContext, event: &GatewayRequest) -> Result<GatewayResponse> {
    debug!(
        method = event.http_method.as_deref().unwrap_or("-"),
        path = event.path.as_deref().unwrap_or("-"),
        request_context = %event.request_context,
        "gateway event"
    );
    let body = event.decoded_body()?;
    let outcome: Outcome = handlers::handle_webhook_body(context, &body).await?;
    debug!(?outcome, "update handled");
    Ok(GatewayResponse::ok())
}
