//! Command handlers.
//!
//! Each handler resolves what it needs, drives the runtime, and maps the
//! result onto `CliError`.

pub mod dev;
