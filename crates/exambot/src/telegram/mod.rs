use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::http;

mod chunk;
mod types;

pub use chunk::{MAX_MESSAGE_LEN, split_message};
pub use types::{BotCommandSpec, Chat, Message, PhotoSize, TelegramFile, Update};

const TELEGRAM_PARSE_MODE: &str = "Markdown";

pub struct TelegramSettings {
    pub bot_token: String,
    pub base_url: String,
    pub webhook_secret: Option<String>,
    pub timeout: Duration,
}

impl TelegramSettings {
    /// # Errors
    /// Returns an error if the configured base URL is malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let bot_token = config::resolve_secret(config.telegram.bot_token.as_deref(), "TG_API_KEY");
        let base_url = config::resolve_endpoint(
            config.telegram.base_url.as_deref(),
            "EXAMBOT_TELEGRAM_BASE_URL",
            config::DEFAULT_TELEGRAM_BASE_URL,
            "Telegram",
        )?;
        let webhook_secret = config
            .telegram
            .webhook_secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .map(str::to_string);

        Ok(Self {
            bot_token,
            base_url,
            webhook_secret,
            timeout: config.request_timeout(),
        })
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &TelegramSettings) -> Result<Self> {
        Ok(Self {
            http: http::client("Telegram", settings.timeout)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.bot_token.clone(),
        })
    }

    /// Looks up file metadata and returns the URL the file can be fetched from.
    ///
    /// # Errors
    /// Fails on transport errors, on a malformed response and when Telegram
    /// returns no `file_path`.
    pub async fn resolve_file_url(&self, file_id: &str) -> Result<String> {
        let url = self.method_url("getFile");
        let response = self
            .http
            .get(url)
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(|err| Error::network("Telegram getFile", err))?;

        let payload: TelegramResponse<TelegramFile> =
            http::read_json("Telegram getFile response", response).await?;
        let file_path = payload
            .result
            .and_then(|file| file.file_path)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| Error::MissingFilePath {
                file_id: file_id.to_string(),
            })?;

        Ok(format!(
            "{}/file/bot{}/{}",
            self.base_url,
            self.token,
            file_path.trim_start_matches('/')
        ))
    }

    /// Downloads `url` and writes the bytes to `destination`.
    ///
    /// # Errors
    /// Fails on transport errors, non-success statuses and write errors.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| Error::network("Telegram file download", err))?;

        if !response.status().is_success() {
            return Err(Error::from_response("Telegram file download", response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| Error::network("Telegram file download", err))?;
        std::fs::write(destination, &bytes)?;
        debug!(bytes = bytes.len(), path = %destination.display(), "downloaded file");
        Ok(())
    }

    /// Sends one message. Any non-2xx answer is an error carrying status and body.
    ///
    /// # Errors
    /// Fails on transport errors and non-success statuses.
    pub async fn send_message(&self, chat_id: i64, text: &str, reply_to_message_id: i64) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_to_message_id,
            parse_mode: Some(TELEGRAM_PARSE_MODE),
        };
        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|err| Error::network("Telegram sendMessage", err))?;

        if !response.status().is_success() {
            return Err(Error::from_response("Telegram sendMessage", response).await);
        }
        Ok(())
    }

    /// Sends `text` as a reply, split into as many messages as the length
    /// limit requires. Stops at the first failed chunk.
    ///
    /// # Errors
    /// Returns the first [`TelegramClient::send_message`] failure.
    pub async fn send_reply(&self, chat_id: i64, text: &str, reply_to_message_id: i64) -> Result<()> {
        let chunks = split_message(text, MAX_MESSAGE_LEN);
        debug!(chat_id, chunks = chunks.len(), "sending reply");
        for chunk in chunks {
            self.send_message(chat_id, chunk, reply_to_message_id).await?;
        }
        Ok(())
    }

    /// Points Telegram at the deployed webhook.
    ///
    /// # Errors
    /// Fails on transport errors or when Telegram rejects the call.
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let request = SetWebhookRequest {
            url,
            secret_token,
            allowed_updates: &["message"],
        };
        let _: bool = self.call("setWebhook", &request).await?;
        Ok(())
    }

    /// Publishes the command menu shown in Telegram clients.
    ///
    /// # Errors
    /// Fails on transport errors or when Telegram rejects the call.
    pub async fn set_my_commands(&self, commands: &[BotCommandSpec]) -> Result<()> {
        let request = SetMyCommandsRequest { commands };
        let _: bool = self.call("setMyCommands", &request).await?;
        Ok(())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<T: DeserializeOwned, B: Serialize>(&self, method: &'static str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|err| Error::network("Telegram", err))?;

        if !response.status().is_success() {
            return Err(Error::from_response("Telegram", response).await);
        }

        let payload: TelegramResponse<T> = http::read_json("Telegram response", response).await?;
        match payload.result {
            Some(result) if payload.ok => Ok(result),
            _ => Err(Error::Rejected {
                method,
                description: payload
                    .description
                    .unwrap_or_else(|| "Telegram API error".to_string()),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    #[serde(default)]
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    reply_to_message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SetMyCommandsRequest<'a> {
    commands: &'a [BotCommandSpec],
}
