//! Key-value store operations.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::client::NexusClient;
use crate::error::{SdkError, SdkResult};
use crate::http::Method;

/// Options for [`Kv::set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Lifetime in seconds. `None` keeps the value until overwritten.
    pub ttl: Option<u64>,
}

/// The engine's key-value store.
#[derive(Debug, Clone)]
pub struct Kv {
    client: NexusClient,
}

impl Kv {
    pub const fn new(client: NexusClient) -> Self {
        Self { client }
    }

    /// Value stored under `key`, or `None` if the engine has no such key.
    ///
    /// Only a 404 means "absent"; every other error status is returned as an error.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> SdkResult<Option<T>> {
        let path = format!("/kv/get?key={}", urlencoding::encode(key));
        match self.client.request(Method::Get, &path, None).await {
            Err(SdkError::EngineRequest { status: 404, .. }) => Ok(None),
            other => other,
        }
    }

    /// Store `value` under `key`.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        options: SetOptions,
    ) -> SdkResult<()> {
        let body = json!({
            "key": key,
            "value": serde_json::to_value(value)?,
            "ttl": options.ttl.unwrap_or(0),
        });
        self.client
            .request::<serde_json::Value>(Method::Post, "/kv/set", Some(&body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeBackend;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        name: String,
        role: String,
    }

    fn kv(backend: FakeBackend) -> (Kv, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let client = NexusClient::with_backend("http://localhost:4000", backend.clone());
        (Kv::new(client), backend)
    }

    #[tokio::test]
    async fn test_get_404_is_none() {
        let (kv, backend) = kv(FakeBackend::new().with_response("/kv/get", 404, "Not found"));
        let value: Option<User> = kv.get("user:a@example.com").await.unwrap();
        assert_eq!(value, None);

        assert_eq!(
            backend.requests()[0].url,
            "http://localhost:4000/kv/get?key=user%3Aa%40example.com"
        );
    }

    #[tokio::test]
    async fn test_get_500_is_error() {
        let (kv, _) = kv(FakeBackend::new().with_response("/kv/get", 500, "boom"));
        let err = kv.get::<User>("k").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_get_decodes_value() {
        let (kv, _) = kv(FakeBackend::new().with_response(
            "/kv/get",
            200,
            r#"{"name":"Ada","role":"user"}"#,
        ));
        let value: Option<User> = kv.get("user:ada").await.unwrap();
        assert_eq!(
            value,
            Some(User {
                name: "Ada".into(),
                role: "user".into()
            })
        );
    }

    #[tokio::test]
    async fn test_set_sends_ttl() {
        let (kv, backend) =
            kv(FakeBackend::new().with_response("/kv/set", 200, r#"{"success":true}"#));
        let user = User {
            name: "Ada".into(),
            role: "user".into(),
        };

        kv.set("user:ada", &user, SetOptions { ttl: Some(3600) })
            .await
            .unwrap();
        kv.set("counter", &5, SetOptions::default()).await.unwrap();

        let requests = backend.requests();
        assert_eq!(
            requests[0].body,
            Some(json!({"key": "user:ada", "value": {"name": "Ada", "role": "user"}, "ttl": 3600}))
        );
        assert_eq!(
            requests[1].body,
            Some(json!({"key": "counter", "value": 5, "ttl": 0}))
        );
    }
}
