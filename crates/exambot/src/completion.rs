//! Language model completion client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{self, AuthScheme, Config};
use crate::error::{Error, Result};
use crate::http;

const SERVICE: &str = "Completion";

/// Returned when the model answers successfully but with no alternatives.
pub const NO_ANSWER: &str = "no answer :(";

pub struct CompletionSettings {
    pub api_key: String,
    pub url: String,
    pub model_uri: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub auth_scheme: AuthScheme,
    pub timeout: Duration,
}

impl CompletionSettings {
    /// # Errors
    /// Returns an error if the configured endpoint is malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let completion = &config.completion;
        Ok(Self {
            api_key: config::resolve_secret(completion.api_key.as_deref(), "YAGPT_API_KEY"),
            url: config::resolve_endpoint(
                completion.url.as_deref(),
                "EXAMBOT_COMPLETION_URL",
                config::DEFAULT_COMPLETION_URL,
                SERVICE,
            )?,
            model_uri: completion.model_uri(),
            temperature: completion.temperature,
            max_tokens: completion.max_tokens,
            auth_scheme: completion.auth_scheme,
            timeout: config.request_timeout(),
        })
    }
}

pub struct CompletionClient {
    http: reqwest::Client,
    settings: CompletionSettings,
}

impl CompletionClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: CompletionSettings) -> Result<Self> {
        Ok(Self {
            http: http::client(SERVICE, settings.timeout)?,
            settings,
        })
    }

    /// Runs a two-message conversation and returns the first alternative.
    ///
    /// # Errors
    /// Fails on transport errors, non-success statuses and undecodable answers.
    /// An empty alternatives list is not an error: it yields [`NO_ANSWER`].
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            model_uri: &self.settings.model_uri,
            completion_options: CompletionOptions {
                stream: false,
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens.to_string(),
            },
            messages: [
                ChatMessage {
                    role: "system",
                    text: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    text: user_prompt,
                },
            ],
        };

        let response = self
            .http
            .post(&self.settings.url)
            .header(
                reqwest::header::AUTHORIZATION,
                self.settings.auth_scheme.header_value(&self.settings.api_key),
            )
            .json(&request)
            .send()
            .await
            .map_err(|err| Error::network(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(Error::from_response(SERVICE, response).await);
        }

        let payload: CompletionResponse = http::read_json("completion response", response).await?;
        Ok(first_alternative(payload))
    }
}

fn first_alternative(payload: CompletionResponse) -> String {
    let Some(alternative) = payload.result.alternatives.into_iter().next() else {
        debug!("completion returned no alternatives");
        return NO_ANSWER.to_string();
    };
    if let Some(tokens) = payload.result.usage.and_then(|usage| usage.total_tokens) {
        debug!(total_tokens = %tokens, "completion usage");
    }
    alternative.message.text
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    model_uri: &'a str,
    completion_options: CompletionOptions,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    /// Sent as a string, as the API declares int64 fields.
    max_tokens: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionResult {
    alternatives: Vec<Alternative>,
    usage: Option<Usage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AlternativeMessage {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Usage {
    total_tokens: Option<String>,
}
