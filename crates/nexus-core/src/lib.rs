#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod config;
pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{
    CONFIG_FILE_NAME, ConfigError, ConfigSource, EngineDescriptor, ExitPolicy, ReadinessPolicy,
    ResolvedConfig, ServiceDescriptor, SupervisorPolicy, TopologyDescriptor, load, parse, resolve,
};
pub use domain::{CommandLine, ExitReason, LogLine, ProcessState, ServiceLabel, Severity};
pub use ports::{LogSink, ProcessError};
