//! Publish/subscribe: tickets, publishing and WebSocket frames.
//!
//! Subscribing is a WebSocket connection to `/ws?ticket=<t>`. The ticket is
//! single-use and scoped to the channels it was issued for.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::client::NexusClient;
use crate::error::{SdkError, SdkResult};
use crate::http::Method;

/// Who a ticket is for and what it may subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketOptions {
    pub user_id: String,
    pub channels: Vec<String>,
}

#[derive(Deserialize)]
struct TicketResponse {
    ticket: String,
}

/// One frame pushed by the engine over the socket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope<T> {
    /// Channel the message was published to, when the engine includes it.
    #[serde(default)]
    pub channel: Option<String>,
    pub data: T,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a text frame.
    pub fn parse(frame: &str) -> SdkResult<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

/// The engine's publish/subscribe hub.
#[derive(Debug, Clone)]
pub struct PubSub {
    client: NexusClient,
}

impl PubSub {
    pub const fn new(client: NexusClient) -> Self {
        Self { client }
    }

    /// Issue a single-use ticket for a WebSocket connection.
    pub async fn create_ticket(&self, options: &TicketOptions) -> SdkResult<String> {
        let body = serde_json::to_value(options)?;
        let response: Option<TicketResponse> = self
            .client
            .request(Method::Post, "/pubsub/ticket", Some(&body))
            .await?;

        response
            .map(|r| r.ticket)
            .ok_or_else(|| SdkError::InvalidResponse {
                message: "ticket response had an empty body".to_string(),
            })
    }

    /// Publish `data` to every subscriber of `channel`.
    pub async fn publish<T: Serialize + ?Sized>(&self, channel: &str, data: &T) -> SdkResult<()> {
        let body = json!({
            "channel": channel,
            "data": serde_json::to_value(data)?,
        });
        self.client
            .request::<serde_json::Value>(Method::Post, "/pubsub/publish", Some(&body))
            .await?;
        Ok(())
    }

    /// WebSocket URL for `ticket`: `ws://` for an `http` engine, `wss://` for `https`.
    pub fn socket_url(&self, ticket: &str) -> SdkResult<Url> {
        let mut url = self.client.url("/ws")?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| SdkError::InvalidResponse {
                message: format!("cannot derive a WebSocket URL from {}", self.client.base_url()),
            })?;
        url.query_pairs_mut().append_pair("ticket", ticket);
        Ok(url)
    }
}
