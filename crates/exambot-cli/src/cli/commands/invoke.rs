//! One-shot gateway invocation.
//!
//! The serverless runtime hands the function one event at a time; this
//! command is that entry point for a single event.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use exambot::gateway::{self, GatewayRequest};
use exambot::{BotContext, Config};
use tracing::debug;

pub async fn run(config: &Config, event_path: Option<&Path>) -> Result<()> {
    let raw = match event_path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("read event from {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("read event from stdin")?;
            buf
        }
    };
    let event: GatewayRequest = serde_json::from_slice(&raw).context("parse gateway event")?;
    debug!(bytes = raw.len(), base64 = event.is_base64_encoded, "read gateway event");

    let context = BotContext::from_config(config).context("build bot context")?;
    let response = gateway::handle_event(&context, &event)
        .await
        .context("handle update")?;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
