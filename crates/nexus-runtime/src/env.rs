//! Child environment composition.
//!
//! A child's environment is the orchestrator's full inherited environment with
//! per-service keys added on top. Keys are case-sensitive and added keys always
//! replace inherited ones of the same name.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// Engine base URL injected into the app.
pub const ENGINE_URL_VAR: &str = "NEXUS_ENGINE_URL";

/// Listening port injected into the app.
pub const PORT_VAR: &str = "PORT";

/// A complete environment for one child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Snapshot of the orchestrator's own environment.
    pub fn inherit() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    /// Build from explicit pairs. Later duplicates win.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add or override one variable.
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
