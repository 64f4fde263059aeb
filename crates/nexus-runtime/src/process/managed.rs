//! One supervised child process.
//!
//! Spawning hands the `Child` to a watcher task that owns it until reaping.
//! The handle kept by the supervisor only observes state through a watch
//! channel and requests termination through a cancellation token, so
//! terminating twice, or terminating a process that already exited, is a
//! no-op.
//!
//! A leader that exits on its own may leave members behind in its group. The
//! watcher sweeps the group before it publishes `Exited`, so an exited
//! process never has a live group.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use nexus_core::{CommandLine, ExitReason, LogSink, ProcessError, ProcessState, ServiceLabel};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::shutdown::shutdown_child;
#[cfg(unix)]
use super::shutdown::sweep_group;
use super::stream::attach;
use crate::env::Environment;

/// Everything needed to launch one service.
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub service: ServiceLabel,
    pub command: CommandLine,
    pub working_directory: Option<PathBuf>,
    pub environment: Environment,
}

/// A process left the group on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupEvent {
    pub service: ServiceLabel,
    pub reason: ExitReason,
}

/// Handle to a spawned child.
#[derive(Debug)]
pub struct ManagedProcess {
    service: ServiceLabel,
    command: CommandLine,
    working_directory: Option<PathBuf>,
    environment: Environment,
    pid: Option<u32>,
    state: watch::Receiver<ProcessState>,
    stop: CancellationToken,
}

impl ManagedProcess {
    /// Spawn the child, attach both output streams and start watching it.
    ///
    /// Self-exits are reported on `exits`. Requested terminations are not.
    pub(crate) fn spawn(
        spec: SpawnSpec,
        sink: &Arc<dyn LogSink>,
        exits: mpsc::UnboundedSender<GroupEvent>,
        shutdown_timeout: Duration,
    ) -> Result<Self, ProcessError> {
        let SpawnSpec {
            service,
            command,
            working_directory,
            environment,
        } = spec;

        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .env_clear()
            .envs(environment.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &working_directory {
            cmd.current_dir(dir);
        }

        // Own group: the terminal's Ctrl+C reaches only the orchestrator
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            service,
            command: command.to_string(),
            source,
        })?;

        let pid = child.id();
        debug!(%service, %command, ?pid, cwd = ?working_directory, "spawned child process");

        if let Some(stdout) = child.stdout.take() {
            attach(stdout, service, "stdout", Arc::clone(sink));
        }
        if let Some(stderr) = child.stderr.take() {
            attach(stderr, service, "stderr", Arc::clone(sink));
        }

        let (state_tx, state) = watch::channel(ProcessState::Running);
        let stop = CancellationToken::new();

        tokio::spawn(watch_child(
            child,
            service,
            state_tx,
            stop.clone(),
            exits,
            shutdown_timeout,
        ));

        info!(%service, ?pid, "{service} running");

        Ok(Self {
            service,
            command,
            working_directory,
            environment,
            pid,
            state,
            stop,
        })
    }

    /// Request termination and wait until the child has been reaped.
    ///
    /// Returns the terminal reason, which is `SelfExited` when the child was
    /// already gone before the request.
    pub async fn terminate(&self) -> ExitReason {
        if let Some(reason) = self.state().exit_reason() {
            return reason;
        }
        self.stop.cancel();
        self.exited().await
    }

    /// Wait for the terminal state without requesting it.
    pub async fn exited(&self) -> ExitReason {
        let mut state = self.state.clone();
        let reason = match state.wait_for(ProcessState::is_exited).await {
            Ok(current) => current.exit_reason(),
            // Watcher gone without a terminal state: treat as an unexplained exit
            Err(_) => None,
        };
        reason.unwrap_or(ExitReason::SelfExited { code: None })
    }

    pub fn state(&self) -> ProcessState {
        *self.state.borrow()
    }

    pub const fn service(&self) -> ServiceLabel {
        self.service
    }

    pub const fn command(&self) -> &CommandLine {
        &self.command
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    /// The full environment the child was started with.
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }
}

impl Drop for ManagedProcess {
    fn drop(&mut self) {
        // Best-effort: the watcher terminates the group if the runtime is still alive
        self.stop.cancel();
    }
}

async fn watch_child(
    mut child: Child,
    service: ServiceLabel,
    state: watch::Sender<ProcessState>,
    stop: CancellationToken,
    exits: mpsc::UnboundedSender<GroupEvent>,
    shutdown_timeout: Duration,
) {
    #[cfg(unix)]
    let leader = child.id();

    tokio::select! {
        status = child.wait() => {
            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(%service, error = %e, "failed to wait for child");
                    None
                }
            };
            let reason = ExitReason::SelfExited { code };
            info!(%service, %reason, "{service} exited on its own");
            #[cfg(unix)]
            if let Some(pid) = leader {
                sweep_group(pid, shutdown_timeout).await;
            }
            state.send_replace(ProcessState::Exited(reason));
            // Receiver is gone once the supervisor is dropped
            let _ = exits.send(GroupEvent { service, reason });
        }
        () = stop.cancelled() => {
            state.send_replace(ProcessState::Terminating);
            debug!(%service, "terminating child process group");
            if let Err(e) = shutdown_child(&mut child, shutdown_timeout).await {
                warn!(%service, error = %e, "failed to terminate child");
            }
            info!(%service, "{service} stopped");
            state.send_replace(ProcessState::Exited(ExitReason::Requested));
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::process::CollectingSink;
    use crate::process::shutdown::testing::is_gone_within;

    const GRACE: Duration = Duration::from_secs(5);

    fn sh(script: &str) -> SpawnSpec {
        SpawnSpec {
            service: ServiceLabel::App,
            command: CommandLine::parse("sh -c").unwrap().with_args([script]),
            working_directory: None,
            environment: Environment::inherit(),
        }
    }

    type Spawned = (
        ManagedProcess,
        Arc<CollectingSink>,
        mpsc::UnboundedReceiver<GroupEvent>,
    );

    fn spawn(spec: SpawnSpec) -> Spawned {
        let collector = Arc::new(CollectingSink::new());
        let sink: Arc<dyn LogSink> = collector.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        let process = ManagedProcess::spawn(spec, &sink, tx, GRACE).unwrap();
        (process, collector, rx)
    }

    #[tokio::test]
    async fn test_self_exit_is_reported() {
        let (process, _sink, mut events) = spawn(sh("exit 7"));

        let reason = process.exited().await;
        assert_eq!(reason, ExitReason::SelfExited { code: Some(7) });
        assert_eq!(process.state(), ProcessState::Exited(reason));

        let event = events.recv().await.unwrap();
        assert_eq!(event.service, ServiceLabel::App);
        assert_eq!(event.reason, reason);
    }

    #[tokio::test]
    async fn test_self_exit_sweeps_leftover_group() {
        let (process, sink, mut events) = spawn(sh("sleep 300 &\necho $!\nexit 3"));

        let reason = process.exited().await;
        assert_eq!(reason, ExitReason::SelfExited { code: Some(3) });
        assert_eq!(process.terminate().await, reason);
        assert_eq!(events.recv().await.unwrap().reason, reason);

        let printed = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if let Some(line) = sink.texts(ServiceLabel::App).first() {
                    break line.clone();
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });
        let background: i32 = printed.await.unwrap().parse().unwrap();
        assert!(is_gone_within(background, Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_terminate_is_requested_and_idempotent() {
        let (process, _sink, mut events) = spawn(sh("sleep 30"));
        assert_eq!(process.state(), ProcessState::Running);
        assert!(process.pid().is_some());

        assert_eq!(process.terminate().await, ExitReason::Requested);
        assert_eq!(process.terminate().await, ExitReason::Requested);
        assert_eq!(process.state(), ProcessState::Exited(ExitReason::Requested));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_terminate_after_self_exit_keeps_reason() {
        let (process, _sink, _events) = spawn(sh("exit 0"));
        process.exited().await;

        assert_eq!(
            process.terminate().await,
            ExitReason::SelfExited { code: Some(0) }
        );
    }

    #[tokio::test]
    async fn test_output_and_environment_reach_child() {
        let mut spec = sh("echo \"port=$PORT\"; echo oops >&2");
        let path = std::env::var_os("PATH").unwrap_or_default();
        spec.environment = Environment::from_vars([("PATH", path)]).with("PORT", "3000");
        let (process, sink, _events) = spawn(spec);
        process.exited().await;
        // Readers finish after the pipes close
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut texts = sink.texts(ServiceLabel::App);
        texts.sort();
        assert_eq!(texts, ["oops", "port=3000"]);
        assert_eq!(
            process.environment().get("PORT"),
            Some(std::ffi::OsStr::new("3000"))
        );
    }

    #[tokio::test]
    async fn test_working_directory_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut spec = sh("pwd");
        spec.working_directory = Some(dir.path().to_path_buf());
        let (process, sink, _events) = spawn(spec);
        process.exited().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let expected = dir.path().canonicalize().unwrap();
        let printed = sink.texts(ServiceLabel::App);
        assert_eq!(printed.len(), 1);
        assert_eq!(Path::new(&printed[0]).canonicalize().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let collector: Arc<dyn LogSink> = Arc::new(CollectingSink::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let spec = SpawnSpec {
            service: ServiceLabel::Frontend,
            command: CommandLine::parse("definitely-not-a-real-binary-nexus --flag").unwrap(),
            working_directory: None,
            environment: Environment::inherit(),
        };

        let err = ManagedProcess::spawn(spec, &collector, tx, GRACE).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Spawn {
                service: ServiceLabel::Frontend,
                ..
            }
        ));
    }
}
