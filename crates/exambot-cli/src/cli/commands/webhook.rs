//! Webhook registration.

use anyhow::{Context, Result, bail};
use exambot::commands::telegram_command_specs;
use exambot::telegram::{TelegramClient, TelegramSettings};
use exambot::Config;
use tracing::info;

pub async fn set(config: &Config, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        bail!("webhook URL must not be empty");
    }

    let settings = TelegramSettings::from_config(config)?;
    if settings.bot_token.is_empty() {
        bail!("Telegram bot token is not set (config telegram.bot_token or TG_API_KEY)");
    }

    let client = TelegramClient::new(&settings)?;
    client
        .set_webhook(url, settings.webhook_secret.as_deref())
        .await
        .context("set webhook")?;
    info!(url, secret = settings.webhook_secret.is_some(), "webhook registered");
    client
        .set_my_commands(&telegram_command_specs())
        .await
        .context("set bot commands")?;

    println!("Webhook set to {url}");
    Ok(())
}
