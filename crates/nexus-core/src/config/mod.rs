//! Topology configuration.
//!
//! The [`TopologyDescriptor`] is the validated, immutable description of one
//! development session: which commands to run, on which ports, in which
//! directories. It is produced once by [`resolve`]/[`load`] and then owned by
//! the supervisor.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{CONFIG_FILE_NAME, ConfigSource, ResolvedConfig, load, parse, resolve};

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default port for the application process.
pub const DEFAULT_APP_PORT: u16 = 3000;

/// Default command for the application process.
pub const DEFAULT_APP_COMMAND: &str = "bun run src/index.ts";

/// Default port for the engine.
pub const DEFAULT_ENGINE_PORT: u16 = 4000;

/// Default engine working directory.
pub const DEFAULT_ENGINE_PATH: &str = "./nexus/engine";

/// Default engine command, run inside the engine working directory.
pub const DEFAULT_ENGINE_COMMAND: &str = "go run cmd/nexus/main.go";

/// Default engine key-value data directory flag.
pub const DEFAULT_KV_DATA_DIR: &str = "data";

/// Default engine log level flag (0=Error, 1=Info, 2=Debug).
pub const DEFAULT_ENGINE_LOG_LEVEL: u8 = 2;

/// Legacy fixed grace interval after starting the engine.
pub const DEFAULT_STARTUP_GRACE_MS: u64 = 1000;

/// Delay between readiness probe attempts.
pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 250;

/// Readiness probe attempts before giving up.
pub const DEFAULT_PROBE_ATTEMPTS: u32 = 40;

/// SIGTERM grace period before a child is killed.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;

/// One launchable service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Port the service listens on.
    pub port: u16,
    /// Unsplit command string.
    pub command: String,
    /// Directory to run in (orchestrator's own directory when `None`).
    pub working_directory: Option<PathBuf>,
}

/// How the supervisor decides the engine is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessPolicy {
    /// Sleep a fixed interval and assume readiness.
    Delay(Duration),
    /// Poll the engine's `/health` endpoint.
    Http { interval: Duration, max_attempts: u32 },
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::Http {
            interval: Duration::from_millis(DEFAULT_PROBE_INTERVAL_MS),
            max_attempts: DEFAULT_PROBE_ATTEMPTS,
        }
    }
}

/// The engine service plus its engine-specific flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDescriptor {
    pub service: ServiceDescriptor,
    pub kv_data_dir: String,
    pub log_level: u8,
    pub readiness: ReadinessPolicy,
}

impl EngineDescriptor {
    /// Base URL handed to the app as `NEXUS_ENGINE_URL`.
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.service.port)
    }

    /// Flags appended to the engine command.
    pub fn flags(&self) -> Vec<String> {
        vec![
            "--port".to_string(),
            self.service.port.to_string(),
            "--kv-data-dir".to_string(),
            self.kv_data_dir.clone(),
            "--log-level".to_string(),
            self.log_level.to_string(),
        ]
    }
}

/// What to do when a service exits on its own after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Treat it as fatal: stop the rest of the group.
    #[default]
    Shutdown,
    /// Log it and keep the others running.
    Continue,
}

/// Group-wide supervision settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorPolicy {
    pub on_exit: ExitPolicy,
    pub shutdown_timeout: Duration,
}

impl Default for SupervisorPolicy {
    fn default() -> Self {
        Self {
            on_exit: ExitPolicy::Shutdown,
            shutdown_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
        }
    }
}

/// Validated description of the processes in one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyDescriptor {
    pub engine: EngineDescriptor,
    pub app: ServiceDescriptor,
    pub frontend: Option<ServiceDescriptor>,
    pub supervisor: SupervisorPolicy,
}

impl Default for TopologyDescriptor {
    fn default() -> Self {
        Self {
            engine: EngineDescriptor {
                service: ServiceDescriptor {
                    port: DEFAULT_ENGINE_PORT,
                    command: DEFAULT_ENGINE_COMMAND.to_string(),
                    working_directory: Some(PathBuf::from(DEFAULT_ENGINE_PATH)),
                },
                kv_data_dir: DEFAULT_KV_DATA_DIR.to_string(),
                log_level: DEFAULT_ENGINE_LOG_LEVEL,
                readiness: ReadinessPolicy::default(),
            },
            app: ServiceDescriptor {
                port: DEFAULT_APP_PORT,
                command: DEFAULT_APP_COMMAND.to_string(),
                working_directory: None,
            },
            frontend: None,
            supervisor: SupervisorPolicy::default(),
        }
    }
}

impl TopologyDescriptor {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ports = vec![("engine", self.engine.service.port), ("app", self.app.port)];
        if let Some(frontend) = &self.frontend {
            ports.push(("frontend", frontend.port));
        }

        for (name, port) in &ports {
            if *port == 0 {
                return Err(ConfigError::Invalid(format!("{name}.port must be non-zero")));
            }
        }

        for (i, (a, port_a)) in ports.iter().enumerate() {
            for (b, port_b) in &ports[i + 1..] {
                if port_a == port_b {
                    return Err(ConfigError::Invalid(format!(
                        "{a}.port and {b}.port are both {port_a}"
                    )));
                }
            }
        }

        if self.engine.service.command.trim().is_empty() {
            return Err(ConfigError::Invalid("engine.command is empty".to_string()));
        }

        if let ReadinessPolicy::Http {
            interval,
            max_attempts,
        } = self.engine.readiness
        {
            if max_attempts == 0 {
                return Err(ConfigError::Invalid(
                    "engine.readiness.max_attempts must be at least 1".to_string(),
                ));
            }
            if interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "engine.readiness.interval_ms must be at least 1".to_string(),
                ));
            }
        }

        Ok(())
    }

}
