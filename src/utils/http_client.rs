//! Shared outbound HTTP client
//!
//! One `reqwest::Client` (and therefore one connection pool) is constructed
//! at startup and reference-shared by every probe task. The per-request
//! timeout lives on the client itself so individual probes fail fast while
//! the resolver's own deadline governs the overall attempt.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::FetchConfig;
use crate::errors::{FetchError, FetchResult};

/// HTTP client wrapper used for candidate probing and page discovery
#[derive(Debug, Clone)]
pub struct IconHttpClient {
    client: Client,
}

impl IconHttpClient {
    /// Build the shared client with pool tuning suited to many short-lived
    /// requests against many distinct hosts.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .pool_max_idle_per_host(30)
            .pool_idle_timeout(Duration::from_secs(60))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Issue a GET with extra headers, succeeding only on HTTP 200.
    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> FetchResult<Response> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Fetch and parse a JSON document.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        debug!("Fetching JSON from: {url}");
        let response = self.get(url, &[]).await?;
        Ok(response.json().await?)
    }

    /// Fetch a text body, reading at most `max_bytes`.
    ///
    /// Oversized bodies are truncated rather than rejected; the caller only
    /// scans for markup near the top of the document anyway.
    pub async fn fetch_text_capped(&self, url: &str, max_bytes: usize) -> FetchResult<String> {
        debug!("Fetching text from: {url} (cap {max_bytes} bytes)");
        let response = self.get(url, &[]).await?;
        let body = Self::read_body_capped(response, max_bytes).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Drain a response body into memory, stopping at `max_bytes`.
    pub async fn read_body_capped(
        mut response: Response,
        max_bytes: usize,
    ) -> FetchResult<Vec<u8>> {
        let mut body: Vec<u8> = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            let remaining = max_bytes - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}
