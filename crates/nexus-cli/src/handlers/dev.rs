//! `nexus dev`: run the whole topology until interrupted.

use std::path::Path;
use std::sync::Arc;

use nexus_core::LogSink;
use nexus_runtime::{Coordinator, ShutdownOutcome, Supervisor, listen_for_interrupts};

use crate::bootstrap::load_topology;
use crate::error::CliError;

/// Start the group and block until Ctrl+C or a fatal self-exit.
pub async fn execute(config: Option<&Path>, sink: Arc<dyn LogSink>) -> Result<(), CliError> {
    let resolved = load_topology(config)?;

    let mut supervisor = Supervisor::new(resolved.topology, Arc::clone(&sink));
    let coordinator = Coordinator::new(listen_for_interrupts(), sink);

    match coordinator.run(&mut supervisor).await? {
        ShutdownOutcome::Interrupted => Ok(()),
        ShutdownOutcome::ServiceFailed { service, reason } => {
            Err(CliError::ServiceFailed { service, reason })
        }
    }
}
