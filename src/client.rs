//! HTTP Client
//!
//! Typed client for a running cache server.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::config::DEFAULT_PORT;
use crate::error::{CacheError, Result};
use crate::models::PutRequest;

/// Client for the cache server's HTTP API.
#[derive(Debug, Clone)]
pub struct CacheClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CacheClient {
    /// Client for the server at `base_url`, e.g. `http://127.0.0.1:8182`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Client for a server on this host at the default port.
    pub fn local() -> Result<Self> {
        Self::new(&format!("http://127.0.0.1:{DEFAULT_PORT}"))
    }

    /// Uses a preconfigured `reqwest` client for transport.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| CacheError::Config(format!("invalid server address {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::Config(format!(
                "invalid server address {base_url}"
            )));
        }
        Ok(Self { http, base_url })
    }

    /// Fetches the value stored under `key`, `None` on a miss.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let response = self.http.get(self.url(&["get", key])).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(remote_error(response).await),
        }
    }

    /// Stores `value` under `key` for `ttl`.
    pub async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let body = PutRequest {
            key: key.to_string(),
            value,
            ttl: humantime::format_duration(ttl).to_string(),
        };
        let response = self.http.put(self.url(&["put"])).json(&body).send().await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            _ => Err(remote_error(response).await),
        }
    }

    /// Removes `key`, returning the value it held.
    pub async fn delete(&self, key: &str) -> Result<Option<Value>> {
        let response = self.http.delete(self.url(&["del", key])).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(remote_error(response).await),
        }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base URLs are rejected on construction
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn remote_error(response: reqwest::Response) -> CacheError {
    let status = response.status();
    match status {
        StatusCode::TOO_MANY_REQUESTS => CacheError::QueueFull,
        StatusCode::SERVICE_UNAVAILABLE => CacheError::DispatcherClosed,
        _ => {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| body.get("error")?.as_str().map(str::to_string))
                .unwrap_or(text);
            CacheError::Remote {
                status: status.as_u16(),
                message,
            }
        }
    }
}
