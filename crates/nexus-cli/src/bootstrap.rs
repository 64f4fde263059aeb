//! Process-wide setup: diagnostics and topology resolution.

use std::path::Path;

use nexus_core::{ConfigSource, ResolvedConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Install the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolve the topology for this run.
///
/// An explicit path must exist; otherwise the default file in the working
/// directory is used, falling back to built-in defaults when it is absent.
pub fn load_topology(explicit: Option<&Path>) -> Result<ResolvedConfig, CliError> {
    let resolved = match explicit {
        Some(path) => nexus_core::load(path)?,
        None => nexus_core::resolve(&std::env::current_dir()?)?,
    };

    match &resolved.source {
        ConfigSource::File(path) => info!("Using topology from {}", path.display()),
        ConfigSource::Defaults => debug!("Using built-in topology"),
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::ConfigError;

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_topology(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[app]\nport = 3100\ncommand = \"bun run dev\"\n").unwrap();

        let resolved = load_topology(Some(&path)).unwrap();
        assert_eq!(resolved.topology.app.port, 3100);
        assert_eq!(resolved.source, ConfigSource::File(path));
    }
}
