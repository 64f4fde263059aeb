//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating the topology configuration.
///
/// A missing default config file is not an error; see [`resolve`](super::resolve).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The config file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, unknown keys, or a section missing a required field.
    #[error("Invalid config: {0}")]
    Parse(String),

    /// Well-formed but structurally invalid after defaulting.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
