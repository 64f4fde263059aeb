//! Service labels used for log prefixes and process bookkeeping.

use std::fmt;

/// Label identifying who produced a log line.
///
/// `Engine`, `App` and `Frontend` name supervised child processes.
/// `Nexus` is the orchestrator itself and never names a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceLabel {
    /// The orchestrator's own messages.
    Nexus,
    /// The stateful engine process.
    Engine,
    /// The stateless application process.
    App,
    /// The optional frontend dev server.
    Frontend,
}

impl ServiceLabel {
    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nexus => "Nexus",
            Self::Engine => "Engine",
            Self::App => "App",
            Self::Frontend => "Frontend",
        }
    }
}

impl fmt::Display for ServiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_name() {
        assert_eq!(ServiceLabel::Engine.to_string(), "Engine");
        assert_eq!(ServiceLabel::Frontend.to_string(), "Frontend");
    }
}
