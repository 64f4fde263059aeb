//! Loading `nexus.config.toml` and merging it over the built-in defaults.
//!
//! Merge policy is a shallow section replace: a section present in the file
//! replaces the whole default section, so it must carry every required field
//! of that section. Sections absent from the file keep their defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    ConfigError, DEFAULT_ENGINE_COMMAND, DEFAULT_ENGINE_LOG_LEVEL, DEFAULT_KV_DATA_DIR,
    DEFAULT_PROBE_ATTEMPTS, DEFAULT_PROBE_INTERVAL_MS, DEFAULT_SHUTDOWN_TIMEOUT_MS,
    DEFAULT_STARTUP_GRACE_MS, EngineDescriptor, ExitPolicy, ReadinessPolicy, ServiceDescriptor,
    SupervisorPolicy, TopologyDescriptor,
};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "nexus.config.toml";

/// Where a resolved topology came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No config file; built-in defaults.
    Defaults,
    /// Merged from this file.
    File(PathBuf),
}

/// A validated topology plus its origin.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub topology: TopologyDescriptor,
    pub source: ConfigSource,
}

/// Resolve the topology for a working directory.
///
/// Reads `<dir>/nexus.config.toml` when present. When it is absent, logs a
/// warning and returns the built-in defaults.
pub fn resolve(dir: &Path) -> Result<ResolvedConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        warn!(
            "{} not found in {}, using defaults",
            CONFIG_FILE_NAME,
            dir.display()
        );
        let topology = TopologyDescriptor::default();
        topology.validate()?;
        return Ok(ResolvedConfig {
            topology,
            source: ConfigSource::Defaults,
        });
    }
    load(&path)
}

/// Load an explicitly named config file. A missing file is an error here.
pub fn load(path: &Path) -> Result<ResolvedConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let base_dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let topology = parse(&content, base_dir).map_err(|e| match e {
        ConfigError::Parse(msg) => ConfigError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })?;

    debug!(path = %path.display(), "Loaded topology config");
    Ok(ResolvedConfig {
        topology,
        source: ConfigSource::File(path.to_path_buf()),
    })
}

/// Parse config text and merge it over the defaults.
///
/// Relative working directories are resolved against `base_dir` when given.
pub fn parse(content: &str, base_dir: Option<&Path>) -> Result<TopologyDescriptor, ConfigError> {
    let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let mut topology = TopologyDescriptor::default();

    if let Some(engine) = raw.engine {
        topology.engine = engine.into_descriptor(base_dir);
    }
    if let Some(app) = raw.app {
        topology.app = app.into_descriptor(base_dir);
    }
    if let Some(frontend) = raw.frontend {
        topology.frontend = Some(frontend.into_descriptor(base_dir));
    }
    if let Some(supervisor) = raw.supervisor {
        topology.supervisor = supervisor.into_policy();
    }

    topology.validate()?;
    Ok(topology)
}

fn rebase(path: PathBuf, base_dir: Option<&Path>) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    app: Option<RawService>,
    engine: Option<RawEngine>,
    frontend: Option<RawService>,
    supervisor: Option<RawSupervisor>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawService {
    port: u16,
    command: String,
    #[serde(default, alias = "path")]
    working_directory: Option<PathBuf>,
}

impl RawService {
    fn into_descriptor(self, base_dir: Option<&Path>) -> ServiceDescriptor {
        ServiceDescriptor {
            port: self.port,
            command: self.command,
            working_directory: self.working_directory.map(|p| rebase(p, base_dir)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngine {
    port: u16,
    path: PathBuf,
    #[serde(default = "default_engine_command")]
    command: String,
    #[serde(default = "default_kv_data_dir")]
    kv_data_dir: String,
    #[serde(default = "default_log_level")]
    log_level: u8,
    #[serde(default)]
    readiness: RawReadiness,
}

fn default_engine_command() -> String {
    DEFAULT_ENGINE_COMMAND.to_string()
}

fn default_kv_data_dir() -> String {
    DEFAULT_KV_DATA_DIR.to_string()
}

const fn default_log_level() -> u8 {
    DEFAULT_ENGINE_LOG_LEVEL
}

impl RawEngine {
    fn into_descriptor(self, base_dir: Option<&Path>) -> EngineDescriptor {
        EngineDescriptor {
            service: ServiceDescriptor {
                port: self.port,
                command: self.command,
                working_directory: Some(rebase(self.path, base_dir)),
            },
            kv_data_dir: self.kv_data_dir,
            log_level: self.log_level,
            readiness: self.readiness.into_policy(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ReadinessMode {
    Http,
    Delay,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawReadiness {
    mode: ReadinessMode,
    grace_ms: u64,
    interval_ms: u64,
    max_attempts: u32,
}

impl Default for RawReadiness {
    fn default() -> Self {
        Self {
            mode: ReadinessMode::Http,
            grace_ms: DEFAULT_STARTUP_GRACE_MS,
            interval_ms: DEFAULT_PROBE_INTERVAL_MS,
            max_attempts: DEFAULT_PROBE_ATTEMPTS,
        }
    }
}

impl RawReadiness {
    const fn into_policy(self) -> ReadinessPolicy {
        match self.mode {
            ReadinessMode::Delay => ReadinessPolicy::Delay(Duration::from_millis(self.grace_ms)),
            ReadinessMode::Http => ReadinessPolicy::Http {
                interval: Duration::from_millis(self.interval_ms),
                max_attempts: self.max_attempts,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSupervisor {
    on_exit: ExitPolicy,
    shutdown_timeout_ms: u64,
}

impl Default for RawSupervisor {
    fn default() -> Self {
        Self {
            on_exit: ExitPolicy::Shutdown,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }
}

impl RawSupervisor {
    const fn into_policy(self) -> SupervisorPolicy {
        SupervisorPolicy {
            on_exit: self.on_exit,
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_without_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve(dir.path()).unwrap();
        assert_eq!(resolved.source, ConfigSource::Defaults);
        assert_eq!(resolved.topology, TopologyDescriptor::default());
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = load(&dir.path().join("custom.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let topology = parse("", None).unwrap();
        assert_eq!(topology, TopologyDescriptor::default());
    }

    #[test]
    fn test_app_section_replaces_default_app() {
        let topology = parse(
            r#"
            [app]
            port = 3100
            command = "bun run index.ts"
            "#,
            None,
        )
        .unwrap();

        assert_eq!(topology.app.port, 3100);
        assert_eq!(topology.app.command, "bun run index.ts");
        assert_eq!(topology.app.working_directory, None);
        // Untouched sections keep their defaults
        assert_eq!(topology.engine, TopologyDescriptor::default().engine);
    }

    #[test]
    fn test_partial_section_is_rejected() {
        let result = parse(
            r"
            [engine]
            port = 4100
            ",
            None,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_engine_section_defaults_optional_fields() {
        let topology = parse(
            r#"
            [engine]
            port = 4100
            path = "../../engine"
            "#,
            None,
        )
        .unwrap();

        assert_eq!(topology.engine.service.port, 4100);
        assert_eq!(topology.engine.service.command, DEFAULT_ENGINE_COMMAND);
        assert_eq!(
            topology.engine.service.working_directory,
            Some(PathBuf::from("../../engine"))
        );
        assert_eq!(topology.engine.kv_data_dir, "data");
        assert_eq!(topology.engine.readiness, ReadinessPolicy::default());
    }

    #[test]
    fn test_readiness_delay_mode() {
        let topology = parse(
            r#"
            [engine]
            port = 4000
            path = "engine"

            [engine.readiness]
            mode = "delay"
            grace_ms = 1500
            "#,
            None,
        )
        .unwrap();

        assert_eq!(
            topology.engine.readiness,
            ReadinessPolicy::Delay(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_frontend_section_enables_frontend() {
        let topology = parse(
            r#"
            [frontend]
            port = 5173
            command = "bunx --bun vite"
            "#,
            None,
        )
        .unwrap();

        let frontend = topology.frontend.unwrap();
        assert_eq!(frontend.port, 5173);
        assert_eq!(frontend.command, "bunx --bun vite");
    }

    #[test]
    fn test_supervisor_section() {
        let topology = parse(
            r#"
            [supervisor]
            on_exit = "continue"
            "#,
            None,
        )
        .unwrap();

        assert_eq!(topology.supervisor.on_exit, ExitPolicy::Continue);
        assert_eq!(
            topology.supervisor.shutdown_timeout,
            Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS)
        );
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let result = parse("[database]\nurl = \"x\"\n", None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_values_rejected_after_merge() {
        let result = parse(
            r#"
            [app]
            port = 4000
            command = "bun run index.ts"
            "#,
            None,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_relative_paths_rebased_on_config_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
            [engine]
            port = 4000
            path = "engine"

            [app]
            port = 3000
            command = "bun run index.ts"
            working_directory = "/srv/app"
            "#,
        )
        .unwrap();

        let resolved = resolve(dir.path()).unwrap();
        assert_eq!(
            resolved.source,
            ConfigSource::File(dir.path().join(CONFIG_FILE_NAME))
        );
        assert_eq!(
            resolved.topology.engine.service.working_directory,
            Some(dir.path().join("engine"))
        );
        assert_eq!(
            resolved.topology.app.working_directory,
            Some(PathBuf::from("/srv/app"))
        );
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[app\nport = 1").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
