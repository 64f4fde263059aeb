//! Port definitions shared between the runtime and its adapters.
//!
//! - [`LogSink`]: where framed log lines go (console, test collector).
//! - [`ProcessError`]: failures of the supervised startup sequence.

use thiserror::Error;

use crate::domain::{ExitReason, LogLine, ServiceLabel};

/// Destination for log lines.
///
/// Implementations must write each line atomically: two lines emitted from
/// different tasks may interleave with each other, but never mid-text.
pub trait LogSink: Send + Sync {
    fn emit(&self, line: LogLine);
}

/// Errors from starting or readying supervised processes.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// A required command string has no tokens.
    #[error("{service} command is empty")]
    EmptyCommand { service: ServiceLabel },

    /// The OS refused to create the child process.
    #[error("Failed to spawn {service} (`{command}`): {source}")]
    Spawn {
        service: ServiceLabel,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The readiness probe gave up.
    #[error("Engine did not become ready at {url} after {attempts} attempts")]
    EngineNotReady { url: String, attempts: u32 },

    /// The engine exited while the supervisor waited for it to become ready.
    #[error("Engine {reason} before becoming ready")]
    EngineExited { reason: ExitReason },

    /// A start was requested for a service that is still running.
    #[error("{service} is already running")]
    AlreadyRunning { service: ServiceLabel },

    /// A step needs a service that was never started.
    #[error("{service} has not been started")]
    NotStarted { service: ServiceLabel },
}

impl ProcessError {
    /// Service the failure is attributed to.
    pub const fn service(&self) -> ServiceLabel {
        match self {
            Self::EmptyCommand { service }
            | Self::Spawn { service, .. }
            | Self::AlreadyRunning { service }
            | Self::NotStarted { service } => *service,
            Self::EngineNotReady { .. } | Self::EngineExited { .. } => ServiceLabel::Engine,
        }
    }
}
