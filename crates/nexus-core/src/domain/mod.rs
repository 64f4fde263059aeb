//! Domain types for the development orchestrator.
//!
//! Pure value types with no I/O: service labels, log lines, the per-process
//! state machine and command-line parsing.

mod command;
mod log;
mod process;
mod service;

pub use command::CommandLine;
pub use log::{LogLine, Severity};
pub use process::{ExitReason, ProcessState};
pub use service::ServiceLabel;
