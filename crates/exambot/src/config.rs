//! Configuration management for exambot.
//!
//! Loads configuration from ${EXAMBOT_HOME}/config.toml with sensible defaults.
//! Secrets and endpoints may also come from the environment, which is how the
//! serverless deployment supplies them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_TELEGRAM_BASE_URL: &str = "https://api.telegram.org";
pub const DEFAULT_OCR_URL: &str = "https://ocr.api.cloud.yandex.net/ocr/v1/recognizeText";
pub const DEFAULT_COMPLETION_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../default_config.toml");

pub mod paths {
    //! Path resolution for exambot configuration.
    //!
    //! EXAMBOT_HOME resolution order:
    //! 1. EXAMBOT_HOME environment variable (if set)
    //! 2. ~/.config/exambot (default)

    use std::path::PathBuf;

    /// Returns the exambot home directory.
    pub fn exambot_home() -> PathBuf {
        if let Ok(home) = std::env::var("EXAMBOT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("exambot")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        exambot_home().join("config.toml")
    }
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token. Falls back to `TG_API_KEY`.
    pub bot_token: Option<String>,
    /// API root, overridable for tests and self-hosted Bot API servers.
    pub base_url: Option<String>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` header on webhook calls.
    pub webhook_secret: Option<String>,
}

/// Text recognition service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// API key. Falls back to `OCR_API_KEY`.
    pub api_key: Option<String>,
    pub url: Option<String>,
    pub mime_type: String,
    pub language_codes: Vec<String>,
    pub model: String,
    /// Value of the `x-data-logging-enabled` header.
    pub data_logging: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: None,
            mime_type: "JPEG".to_string(),
            language_codes: vec!["ru".to_string()],
            model: "page".to_string(),
            data_logging: true,
        }
    }
}

/// How the completion API key is presented in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>` (IAM tokens)
    #[default]
    Bearer,
    /// `Authorization: Api-Key <key>` (service account API keys)
    ApiKey,
}

impl AuthScheme {
    pub fn header_value(self, key: &str) -> String {
        match self {
            AuthScheme::Bearer => format!("Bearer {key}"),
            AuthScheme::ApiKey => format!("Api-Key {key}"),
        }
    }
}

/// Language model completion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// API key. Falls back to `YAGPT_API_KEY`.
    pub api_key: Option<String>,
    pub url: Option<String>,
    /// Cloud folder that owns the model.
    pub folder_id: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub auth_scheme: AuthScheme,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: None,
            folder_id: "b1g163vdicpkeevao9ga".to_string(),
            model: "yandexgpt-lite".to_string(),
            temperature: 0.4,
            max_tokens: 1500,
            auth_scheme: AuthScheme::default(),
        }
    }
}

impl CompletionConfig {
    /// Model URI in the `gpt://<folder>/<model>` form the API expects.
    pub fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.folder_id, self.model)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File holding the system prompt; re-read for every question.
    pub system_prompt_file: Option<PathBuf>,

    /// Directory for downloaded photos (default: OS temp dir)
    pub scratch_dir: Option<PathBuf>,

    /// Timeout applied to every outbound HTTP call
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system_prompt_file: None,
            scratch_dir: None,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            telegram: TelegramConfig::default(),
            ocr: OcrConfig::default(),
            completion: CompletionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))
    }

    /// Writes the commented default template to `path`.
    ///
    /// # Errors
    /// Fails if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(Error::Config(format!(
                "config file already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// System prompt file, `EXAMBOT_SYSTEM_PROMPT_FILE` taking precedence.
    pub fn resolved_system_prompt_file(&self) -> Option<PathBuf> {
        env_value("EXAMBOT_SYSTEM_PROMPT_FILE")
            .map(PathBuf::from)
            .or_else(|| self.system_prompt_file.clone())
    }

    /// Scratch directory, `EXAMBOT_SCRATCH_DIR` taking precedence.
    pub fn resolved_scratch_dir(&self) -> PathBuf {
        env_value("EXAMBOT_SCRATCH_DIR")
            .map(PathBuf::from)
            .or_else(|| self.scratch_dir.clone())
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Resolves a secret with precedence: config > env.
///
/// A missing secret resolves to an empty string; the upstream service then
/// rejects the call, which is where the operator sees it.
pub fn resolve_secret(config_value: Option<&str>, env_var: &str) -> String {
    pick_secret(config_value, env_value(env_var))
}

fn pick_secret(config_value: Option<&str>, env_value: Option<String>) -> String {
    config_value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or(env_value)
        .unwrap_or_default()
}

/// Resolves an endpoint with precedence: env > config > default.
///
/// # Errors
/// Returns an error if the chosen URL is not well-formed.
pub fn resolve_endpoint(
    config_value: Option<&str>,
    env_var: &str,
    default_url: &str,
    service: &str,
) -> Result<String> {
    let chosen = env_value(env_var)
        .or_else(|| {
            config_value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| default_url.to_string());
    validate_url(&chosen, service)?;
    Ok(chosen)
}

fn validate_url(url: &str, service: &str) -> Result<()> {
    url::Url::parse(url).map_err(|err| Error::Config(format!("invalid {service} URL {url}: {err}")))?;
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
