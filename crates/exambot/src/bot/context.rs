use std::path::{Path, PathBuf};

use crate::completion::{CompletionClient, CompletionSettings};
use crate::config::Config;
use crate::error::Result;
use crate::ocr::{OcrClient, OcrSettings};
use crate::telegram::{TelegramClient, TelegramSettings};

/// Everything one update needs: the three upstream clients plus the
/// handler's own settings. Built once at startup and shared by reference.
pub struct BotContext {
    telegram: TelegramClient,
    ocr: OcrClient,
    completion: CompletionClient,
    system_prompt_file: Option<PathBuf>,
    scratch_dir: PathBuf,
    webhook_secret: Option<String>,
}

impl BotContext {
    pub fn new(
        telegram: TelegramClient,
        ocr: OcrClient,
        completion: CompletionClient,
        system_prompt_file: Option<PathBuf>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            telegram,
            ocr,
            completion,
            system_prompt_file,
            scratch_dir,
            webhook_secret: None,
        }
    }

    /// Resolves settings for every client from `config` and the environment.
    ///
    /// # Errors
    /// Returns an error if an endpoint is malformed or a client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let telegram_settings = TelegramSettings::from_config(config)?;
        let webhook_secret = telegram_settings.webhook_secret.clone();
        let context = Self::new(
            TelegramClient::new(&telegram_settings)?,
            OcrClient::new(OcrSettings::from_config(config)?)?,
            CompletionClient::new(CompletionSettings::from_config(config)?)?,
            config.resolved_system_prompt_file(),
            config.resolved_scratch_dir(),
        );
        Ok(context.with_webhook_secret(webhook_secret))
    }

    #[must_use]
    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret;
        self
    }

    pub fn telegram(&self) -> &TelegramClient {
        &self.telegram
    }

    pub fn ocr(&self) -> &OcrClient {
        &self.ocr
    }

    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }

    pub fn system_prompt_file(&self) -> Option<&Path> {
        self.system_prompt_file.as_deref()
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch_dir.as_path()
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref()
    }
}
