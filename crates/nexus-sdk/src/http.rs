//! HTTP backend abstraction for the engine API.
//!
//! The client only ever needs "send this method to this URL with an optional
//! JSON body, give me status and text back". Status handling lives in the
//! client so every backend behaves the same.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::SdkResult;

/// Request methods the engine API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Raw engine answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResponse {
    pub status: u16,
    pub body: String,
}

impl EngineResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport used by [`NexusClient`](crate::NexusClient).
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Send one request. Only transport failures are errors; any status is a response.
    async fn send(&self, method: Method, url: &Url, body: Option<&Value>)
    -> SdkResult<EngineResponse>;
}

/// Production backend using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for ReqwestBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> SdkResult<EngineResponse> {
        let mut request = match method {
            Method::Get => self.client.get(url.as_str()),
            Method::Post => self.client.post(url.as_str()),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(EngineResponse { status, body })
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
