#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

mod coordinator;
pub mod env;
mod health;
pub mod process;
mod supervisor;

pub use coordinator::{Coordinator, ShutdownOutcome, listen_for_interrupts};
pub use env::{ENGINE_URL_VAR, Environment, PORT_VAR};
pub use health::{check_http_health, wait_for_http_health, wait_until_ready};
pub use process::{CollectingSink, ConsoleSink, GroupEvent, LineFramer, ManagedProcess};
pub use supervisor::Supervisor;
