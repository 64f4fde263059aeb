//! Binds operator interrupts to group shutdown.

use std::sync::Arc;

use nexus_core::{ExitPolicy, ExitReason, LogLine, LogSink, ProcessError, ServiceLabel};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::supervisor::Supervisor;

/// How a supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The operator asked to stop.
    Interrupted,
    /// A service exited on its own and the policy made that fatal.
    ServiceFailed {
        service: ServiceLabel,
        reason: ExitReason,
    },
}

impl ShutdownOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Forward every Ctrl+C (and SIGTERM on Unix) into a channel.
///
/// Installing the handler replaces the default "terminate immediately"
/// disposition, so the orchestrator always gets to clean up. On Unix the
/// handlers are registered before this returns: a signal arriving once a
/// child has been spawned is always delivered to the channel.
///
/// Must be called from within a Tokio runtime.
pub fn listen_for_interrupts() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(4);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        for (kind, name) in [
            (SignalKind::interrupt(), "SIGINT"),
            (SignalKind::terminate(), "SIGTERM"),
        ] {
            let mut stream = match signal(kind) {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "failed to listen for {name}");
                    continue;
                }
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                while stream.recv().await.is_some() {
                    if tx.send(()).await.is_err() {
                        break;
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                break;
            }
            if tx.send(()).await.is_err() {
                break;
            }
        }
    });

    rx
}

/// Drives one supervised run from startup to shutdown.
pub struct Coordinator {
    interrupts: mpsc::Receiver<()>,
    sink: Arc<dyn LogSink>,
}

impl Coordinator {
    pub fn new(interrupts: mpsc::Receiver<()>, sink: Arc<dyn LogSink>) -> Self {
        Self { interrupts, sink }
    }

    /// Start the group, then wait for an interrupt or a fatal self-exit.
    ///
    /// An interrupt during startup stops what was already started. Every
    /// tracked process is `Exited` when this returns.
    ///
    /// # Errors
    ///
    /// The startup failure, if startup failed.
    pub async fn run(
        mut self,
        supervisor: &mut Supervisor,
    ) -> Result<ShutdownOutcome, ProcessError> {
        let startup = tokio::select! {
            result = supervisor.start_all() => Some(result),
            Some(()) = self.interrupts.recv() => None,
        };

        match startup {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                warn!(service = %e.service(), error = %e, "startup failed");
                return Err(e);
            }
            None => {
                info!("interrupted during startup");
                self.shutdown(supervisor).await;
                return Ok(ShutdownOutcome::Interrupted);
            }
        }

        self.say("All services started. Press Ctrl+C to stop.");
        let on_exit = supervisor.topology().supervisor.on_exit;

        let outcome = loop {
            tokio::select! {
                Some(()) = self.interrupts.recv() => break ShutdownOutcome::Interrupted,
                Some(event) = supervisor.next_event() => {
                    self.sink.emit(LogLine::error(
                        ServiceLabel::Nexus,
                        format!("{} {}", event.service, event.reason),
                    ));
                    match on_exit {
                        ExitPolicy::Shutdown => {
                            break ShutdownOutcome::ServiceFailed {
                                service: event.service,
                                reason: event.reason,
                            };
                        }
                        ExitPolicy::Continue => {}
                    }
                }
                else => break ShutdownOutcome::Interrupted,
            }
        };

        self.shutdown(supervisor).await;
        Ok(outcome)
    }

    async fn shutdown(&mut self, supervisor: &Supervisor) {
        self.say("Stopping services...");

        let terminate = supervisor.terminate_all();
        tokio::pin!(terminate);

        loop {
            tokio::select! {
                () = &mut terminate => break,
                Some(()) = self.interrupts.recv() => {
                    self.say("Shutdown already in progress");
                }
            }
        }

        self.say("All services stopped");
    }

    fn say(&self, text: &str) {
        self.sink.emit(LogLine::new(ServiceLabel::Nexus, text));
    }
}
