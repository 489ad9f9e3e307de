use std::time::Duration;

use crate::error::{Error, Result};

/// User-Agent sent with every upstream request.
pub const USER_AGENT: &str = concat!("exambot/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by one upstream service.
///
/// Every call made through it is bounded by `timeout`.
pub(crate) fn client(service: &'static str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|err| Error::network(service, err))
}

/// Reads a JSON body, keeping transport and decoding failures apart.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| Error::network(service, err))?;
    serde_json::from_slice(&bytes).map_err(|err| Error::parse(service, err))
}
