//! Error types for the webhook handler and its upstream clients.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The inbound payload or an upstream response body could not be decoded.
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Transport-level failure talking to an upstream service.
    #[error("{service} request failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// An upstream service answered with a non-success status.
    #[error("{service} returned {status}: {body}")]
    Request {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The Bot API answered `ok: false`.
    #[error("Telegram {method} rejected: {description}")]
    Rejected {
        method: &'static str,
        description: String,
    },

    #[error("Telegram file {file_id} has no file_path")]
    MissingFilePath { file_id: String },

    #[error("inbound body is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(what: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { what, source }
    }

    /// Telegram URLs embed the bot token, so the URL is dropped from the source.
    pub(crate) fn network(service: &'static str, source: reqwest::Error) -> Self {
        Self::Network {
            service,
            source: source.without_url(),
        }
    }

    /// Builds a [`Error::Request`] from a failed response, draining its body.
    pub(crate) async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::Request {
            service,
            status,
            body,
        }
    }
}
