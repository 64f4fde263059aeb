#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod error;
mod http;
mod kv;
mod pubsub;

pub use client::{DEFAULT_ENGINE_URL, ENGINE_URL_VAR, NexusClient};
pub use error::{SdkError, SdkResult};
pub use http::{EngineResponse, HttpBackend, Method, ReqwestBackend};
pub use kv::{Kv, SetOptions};
pub use pubsub::{Envelope, PubSub, TicketOptions};

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockito as _;

/// Entry point bundling every engine module over one client.
#[derive(Debug, Clone)]
pub struct Nexus {
    pub kv: Kv,
    pub pubsub: PubSub,
    client: NexusClient,
}

impl Nexus {
    pub fn new(engine_url: impl Into<String>) -> Self {
        Self::with_client(NexusClient::new(engine_url))
    }

    /// Engine from `NEXUS_ENGINE_URL`, default `http://localhost:4000`.
    pub fn from_env() -> Self {
        Self::with_client(NexusClient::from_env())
    }

    pub fn with_client(client: NexusClient) -> Self {
        Self {
            kv: Kv::new(client.clone()),
            pubsub: PubSub::new(client.clone()),
            client,
        }
    }

    pub const fn client(&self) -> &NexusClient {
        &self.client
    }
}
