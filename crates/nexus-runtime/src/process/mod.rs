//! Child process infrastructure.
//!
//! # Structure
//!
//! - `LineFramer` - Reassembles lines from arbitrarily chunked bytes
//! - `attach` - Drains one output channel into a `LogSink`
//! - `ConsoleSink` / `CollectingSink` - Sinks for the terminal and for tests
//! - `ManagedProcess` - One supervised child and its state machine
//! - `shutdown` - SIGTERM → SIGKILL escalation

mod console;
mod framer;
mod managed;
pub mod shutdown;
mod stream;

pub use console::{CollectingSink, ConsoleSink, format_line};
pub use framer::LineFramer;
pub use managed::{GroupEvent, ManagedProcess, SpawnSpec};
pub use shutdown::shutdown_child;
pub use stream::attach;
