//! Log line values produced by the stream multiplexer and the orchestrator.

use super::ServiceLabel;

/// How a line should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    /// Ordinary output.
    #[default]
    Info,
    /// Failure reported by the orchestrator.
    Error,
}

/// One logical line of console output.
///
/// Ephemeral: created by a multiplexer or the orchestrator and handed straight
/// to a [`LogSink`](crate::LogSink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub service: ServiceLabel,
    pub text: String,
    pub severity: Severity,
}

impl LogLine {
    /// Create an ordinary line.
    pub fn new(service: ServiceLabel, text: impl Into<String>) -> Self {
        Self {
            service,
            text: text.into(),
            severity: Severity::Info,
        }
    }

    /// Create an error line.
    pub fn error(service: ServiceLabel, text: impl Into<String>) -> Self {
        Self {
            service,
            text: text.into(),
            severity: Severity::Error,
        }
    }
}
