//! CLI-specific error types and exit codes.

use nexus_core::{ConfigError, ExitReason, ProcessError, ServiceLabel};
use thiserror::Error;

/// Everything that ends a `nexus` run unsuccessfully.
#[derive(Debug, Error)]
pub enum CliError {
    /// The topology could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The startup sequence failed; nothing is left running.
    #[error(transparent)]
    Startup(#[from] ProcessError),

    /// A service exited on its own after startup.
    #[error("{service} {reason}, all services were stopped")]
    ServiceFailed {
        service: ServiceLabel,
        reason: ExitReason,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// Every failure maps to `1`; `0` is reserved for an operator interrupt.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Startup(_) | Self::ServiceFailed { .. } | Self::Io(_) => 1,
        }
    }
}
