//! Engine readiness checks.
//!
//! The engine answers `GET /health` with `200 OK` once its listeners are up.

use std::time::Duration;

use nexus_core::{ProcessError, ReadinessPolicy};
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, info};

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

fn health_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/health")
}

fn probe_client() -> Client {
    // Loopback only: never route the probe through HTTP_PROXY
    Client::builder()
        .timeout(PROBE_TIMEOUT)
        .no_proxy()
        .build()
        .unwrap_or_default()
}

async fn probe(client: &Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            debug!(status = %response.status(), "health check returned non-success status");
            false
        }
        Err(e) => {
            debug!(error = %e, "health check failed");
            false
        }
    }
}

/// Single request to the health endpoint on `port`.
pub async fn check_http_health(port: u16) -> bool {
    probe(&probe_client(), &health_url(port)).await
}

/// Poll the health endpoint until it answers 2xx.
///
/// The first attempt is immediate; `interval` separates the following ones.
///
/// # Errors
///
/// `ProcessError::EngineNotReady` after `max_attempts` failed probes.
pub async fn wait_for_http_health(
    port: u16,
    interval: Duration,
    max_attempts: u32,
) -> Result<(), ProcessError> {
    let url = health_url(port);
    let client = probe_client();
    info!("Waiting for engine to be ready at {url}");

    for attempt in 1..=max_attempts {
        if probe(&client, &url).await {
            info!(attempt, "engine is ready on port {port}");
            return Ok(());
        }
        debug!(attempt, max_attempts, "engine not ready yet, retrying...");
        if attempt < max_attempts {
            sleep(interval).await;
        }
    }

    Err(ProcessError::EngineNotReady {
        url,
        attempts: max_attempts,
    })
}

/// Block the startup sequence until the engine counts as ready under `policy`.
///
/// # Errors
///
/// Only the HTTP policy can fail; see [`wait_for_http_health`].
pub async fn wait_until_ready(policy: ReadinessPolicy, port: u16) -> Result<(), ProcessError> {
    match policy {
        ReadinessPolicy::Delay(grace) => {
            debug!(?grace, "waiting fixed startup grace period");
            sleep(grace).await;
            Ok(())
        }
        ReadinessPolicy::Http {
            interval,
            max_attempts,
        } => wait_for_http_health(port, interval, max_attempts).await,
    }
}
