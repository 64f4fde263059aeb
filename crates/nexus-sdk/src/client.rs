//! Low-level engine client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{SdkError, SdkResult};
use crate::http::{HttpBackend, Method, ReqwestBackend};

/// Variable `nexus dev` sets to the engine base URL.
pub const ENGINE_URL_VAR: &str = "NEXUS_ENGINE_URL";

/// Engine address when [`ENGINE_URL_VAR`] is unset.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:4000";

/// Sends requests to one engine.
#[derive(Clone)]
pub struct NexusClient {
    base_url: String,
    backend: Arc<dyn HttpBackend>,
}

impl NexusClient {
    /// Client for `engine_url`; one trailing `/` is dropped.
    pub fn new(engine_url: impl Into<String>) -> Self {
        Self::with_backend(engine_url, Arc::new(ReqwestBackend::new()))
    }

    /// Client for the engine named by `NEXUS_ENGINE_URL`, or the default address.
    pub fn from_env() -> Self {
        let url = std::env::var(ENGINE_URL_VAR).unwrap_or_else(|_| DEFAULT_ENGINE_URL.to_string());
        Self::new(url)
    }

    pub fn with_backend(engine_url: impl Into<String>, backend: Arc<dyn HttpBackend>) -> Self {
        let mut base_url = engine_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, backend }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/kv/get?key=a`.
    pub fn url(&self, path: &str) -> SdkResult<Url> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    /// Send a request and decode the answer.
    ///
    /// A 2xx answer with an empty body is `Ok(None)`. Any other status is
    /// `SdkError::EngineRequest` carrying the status and body text.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> SdkResult<Option<T>> {
        let url = self.url(path)?;
        let response = self.backend.send(method, &url, body).await?;

        if !response.is_success() {
            return Err(SdkError::EngineRequest {
                status: response.status,
                body: response.body,
            });
        }

        if response.body.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&response.body)?))
    }
}

impl std::fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
