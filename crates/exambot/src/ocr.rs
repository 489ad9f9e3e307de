//! Text recognition client.
//!
//! Sends a base64 image to the recognition endpoint and returns the full
//! recognized text. Layout and bounding boxes in the answer are ignored.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::http;

const SERVICE: &str = "OCR";

pub struct OcrSettings {
    pub api_key: String,
    pub url: String,
    pub mime_type: String,
    pub language_codes: Vec<String>,
    pub model: String,
    pub data_logging: bool,
    pub timeout: Duration,
}

impl OcrSettings {
    /// # Errors
    /// Returns an error if the configured endpoint is malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let ocr = &config.ocr;
        Ok(Self {
            api_key: config::resolve_secret(ocr.api_key.as_deref(), "OCR_API_KEY"),
            url: config::resolve_endpoint(
                ocr.url.as_deref(),
                "EXAMBOT_OCR_URL",
                config::DEFAULT_OCR_URL,
                SERVICE,
            )?,
            mime_type: ocr.mime_type.clone(),
            language_codes: ocr.language_codes.clone(),
            model: ocr.model.clone(),
            data_logging: ocr.data_logging,
            timeout: config.request_timeout(),
        })
    }
}

pub struct OcrClient {
    http: reqwest::Client,
    settings: OcrSettings,
}

impl OcrClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: OcrSettings) -> Result<Self> {
        Ok(Self {
            http: http::client(SERVICE, settings.timeout)?,
            settings,
        })
    }

    /// Recognizes the text on an image.
    ///
    /// An answer without text yields an empty string.
    ///
    /// # Errors
    /// Fails on transport errors, non-success statuses and undecodable answers.
    pub async fn recognize(&self, image: &[u8]) -> Result<String> {
        let request = RecognizeRequest {
            mime_type: &self.settings.mime_type,
            language_codes: &self.settings.language_codes,
            model: &self.settings.model,
            content: BASE64.encode(image),
        };

        let response = self
            .http
            .post(&self.settings.url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Api-Key {}", self.settings.api_key),
            )
            .header(
                "x-data-logging-enabled",
                if self.settings.data_logging { "true" } else { "false" },
            )
            .json(&request)
            .send()
            .await
            .map_err(|err| Error::network(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(Error::from_response(SERVICE, response).await);
        }

        let payload: RecognizeResponse = http::read_json("OCR response", response).await?;
        let text = payload.result.text_annotation.full_text;
        debug!(chars = text.chars().count(), "recognized text");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    mime_type: &'a str,
    language_codes: &'a [String],
    model: &'a str,
    content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecognizeResponse {
    result: RecognizeResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RecognizeResult {
    text_annotation: TextAnnotation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TextAnnotation {
    full_text: String,
}
