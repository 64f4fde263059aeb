//! Lifecycle state of a supervised process.
//!
//! `Unstarted -> Running -> (Terminating) -> Exited(reason)`. A process that was
//! never spawned stays `Unstarted`; once `Exited` no further transition happens.

use std::fmt;

/// Why a process reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The supervisor asked it to stop.
    Requested,
    /// It exited on its own. `code` is `None` when killed by a signal.
    SelfExited { code: Option<i32> },
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "stopped on request"),
            Self::SelfExited { code: Some(code) } => write!(f, "exited with code {code}"),
            Self::SelfExited { code: None } => write!(f, "killed by signal"),
        }
    }
}

/// Per-process state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessState {
    #[default]
    Unstarted,
    Running,
    Terminating,
    Exited(ExitReason),
}

impl ProcessState {
    #[must_use]
    pub const fn is_exited(&self) -> bool {
        matches!(self, Self::Exited(_))
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Exit reason, once terminal.
    #[must_use]
    pub const fn exit_reason(&self) -> Option<ExitReason> {
        match self {
            Self::Exited(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstarted => write!(f, "unstarted"),
            Self::Running => write!(f, "running"),
            Self::Terminating => write!(f, "terminating"),
            Self::Exited(reason) => write!(f, "exited ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classification() {
        assert!(ProcessState::Running.is_running());
        assert!(!ProcessState::Terminating.is_exited());
        assert!(ProcessState::Exited(ExitReason::Requested).is_exited());
        assert_eq!(ProcessState::default(), ProcessState::Unstarted);
    }

    #[test]
    fn test_exit_reason_is_carried() {
        let state = ProcessState::Exited(ExitReason::SelfExited { code: Some(3) });
        assert_eq!(
            state.exit_reason(),
            Some(ExitReason::SelfExited { code: Some(3) })
        );
        assert_eq!(ProcessState::Running.exit_reason(), None);
    }

    #[test]
    fn test_exit_reason_display() {
        assert_eq!(ExitReason::Requested.to_string(), "stopped on request");
        assert_eq!(
            ExitReason::SelfExited { code: Some(1) }.to_string(),
            "exited with code 1"
        );
        assert_eq!(
            ExitReason::SelfExited { code: None }.to_string(),
            "killed by signal"
        );
    }
}
