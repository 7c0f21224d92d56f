use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use thiserror::Error;

/// Default timeout for subscription requests in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to send request: {0}")]
    Transport(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Blocking HTTP GET used by the synchronizer.
///
/// Implementations must connect directly, never through the proxy this crate
/// feeds, and must honour both timeouts.
pub trait HttpFetcher {
    /// Fetch `url` and return the status code and the raw body.
    ///
    /// Non-2xx responses are not errors here; the caller inspects the status.
    fn fetch(
        &self,
        url: &str,
        user_agent: &str,
        headers: &HashMap<String, String>,
        connect_timeout_ms: u64,
        read_timeout_ms: u64,
    ) -> Result<(u16, Vec<u8>), FetchError>;
}

/// [`HttpFetcher`] backed by a direct `reqwest` blocking client.
#[derive(Debug, Default, Clone)]
pub struct ReqwestFetcher;

impl ReqwestFetcher {
    pub fn new() -> Self {
        ReqwestFetcher
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn fetch(
        &self,
        url: &str,
        user_agent: &str,
        headers: &HashMap<String, String>,
        connect_timeout_ms: u64,
        read_timeout_ms: u64,
    ) -> Result<(u16, Vec<u8>), FetchError> {
        // never through a system proxy
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_millis(connect_timeout_ms))
            .timeout(Duration::from_millis(read_timeout_ms))
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        let mut request_builder = client.get(url);
        for (key, value) in headers {
            request_builder = request_builder.header(key.as_str(), value.as_str());
        }

        let response = request_builder
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        debug!("GET {} -> {}", url, status);

        let body = response
            .bytes()
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok((status, body.to_vec()))
    }
}

/// True for 2xx status codes.
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
