//! Webhook server command.

use std::sync::Arc;

use anyhow::{Context, Result};
use exambot::{BotContext, Config, server};
use tracing::info;

pub async fn run(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()) {
        config.server.bind = bind;
    }

    let context = BotContext::from_config(&config).context("build bot context")?;
    info!(
        bind = %config.server.bind,
        scratch_dir = %context.scratch_dir().display(),
        "starting webhook server"
    );
    server::serve(Arc::new(context), &config.server.bind)
        .await
        .with_context(|| format!("serve on {}", config.server.bind))
}
