//! Process supervisor: start order, environment wiring and group termination.
//!
//! The group is only mutated through `&mut self`, so start calls are
//! serialized. Every startup failure terminates whatever was already started
//! before it is returned: a failed startup never leaves a partial topology.

use std::sync::Arc;

use futures_util::future::join_all;
use nexus_core::{
    CommandLine, LogLine, LogSink, ProcessError, ProcessState, ServiceLabel, TopologyDescriptor,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::env::{ENGINE_URL_VAR, Environment, PORT_VAR};
use crate::health::wait_until_ready;
use crate::process::{GroupEvent, ManagedProcess, SpawnSpec};

/// Owner of the process group.
pub struct Supervisor {
    topology: Arc<TopologyDescriptor>,
    sink: Arc<dyn LogSink>,
    inherited: Environment,
    group: Vec<ManagedProcess>,
    events_tx: mpsc::UnboundedSender<GroupEvent>,
    events_rx: mpsc::UnboundedReceiver<GroupEvent>,
}

impl Supervisor {
    /// Children inherit the orchestrator's own environment.
    pub fn new(topology: TopologyDescriptor, sink: Arc<dyn LogSink>) -> Self {
        Self::with_environment(topology, sink, Environment::inherit())
    }

    /// Children inherit `inherited` instead of the orchestrator's environment.
    pub fn with_environment(
        topology: TopologyDescriptor,
        sink: Arc<dyn LogSink>,
        inherited: Environment,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            topology: Arc::new(topology),
            sink,
            inherited,
            group: Vec::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn topology(&self) -> &TopologyDescriptor {
        &self.topology
    }

    /// Full startup sequence: engine, readiness, app, then frontend.
    ///
    /// # Errors
    ///
    /// The first failing step's error, after the group has been terminated.
    pub async fn start_all(&mut self) -> Result<(), ProcessError> {
        self.announce("Starting development server...");
        self.start_engine().await?;
        self.wait_for_engine().await?;
        self.start_app().await?;
        self.start_frontend().await?;
        Ok(())
    }

    /// Spawn the engine in its directory with its port and storage flags.
    ///
    /// # Errors
    ///
    /// `EmptyCommand`, `Spawn`, or `AlreadyRunning` if an engine is live.
    pub async fn start_engine(&mut self) -> Result<&ManagedProcess, ProcessError> {
        let topology = Arc::clone(&self.topology);
        let engine = &topology.engine;

        let Some(command) = CommandLine::parse(&engine.service.command) else {
            self.terminate_all().await;
            return Err(ProcessError::EmptyCommand {
                service: ServiceLabel::Engine,
            });
        };

        self.announce(&format!("Starting Nexus Engine on port {}...", engine.service.port));

        let spec = SpawnSpec {
            service: ServiceLabel::Engine,
            command: command.with_args(engine.flags()),
            working_directory: engine.service.working_directory.clone(),
            environment: self.inherited.clone(),
        };
        self.launch(spec).await
    }

    /// Hold the sequence until the engine counts as ready.
    ///
    /// Races the readiness policy against the engine exiting.
    ///
    /// # Errors
    ///
    /// `NotStarted`, `EngineNotReady`, or `EngineExited`. On the last two the
    /// group is terminated.
    pub async fn wait_for_engine(&self) -> Result<(), ProcessError> {
        let Some(engine) = self.live(ServiceLabel::Engine) else {
            return Err(ProcessError::NotStarted {
                service: ServiceLabel::Engine,
            });
        };

        let policy = self.topology.engine.readiness;
        let port = self.topology.engine.service.port;

        let result = tokio::select! {
            ready = wait_until_ready(policy, port) => ready,
            reason = engine.exited() => Err(ProcessError::EngineExited { reason }),
        };

        if result.is_err() {
            self.terminate_all().await;
        }
        result
    }

    /// Spawn the app with the engine URL and its own port injected.
    ///
    /// # Errors
    ///
    /// `NotStarted` without a live engine; `EmptyCommand` or `Spawn`, after
    /// the engine has been terminated.
    pub async fn start_app(&mut self) -> Result<&ManagedProcess, ProcessError> {
        if self.live(ServiceLabel::Engine).is_none() {
            return Err(ProcessError::NotStarted {
                service: ServiceLabel::Engine,
            });
        }

        let topology = Arc::clone(&self.topology);
        let app = &topology.app;

        let Some(command) = CommandLine::parse(&app.command) else {
            self.terminate_all().await;
            return Err(ProcessError::EmptyCommand {
                service: ServiceLabel::App,
            });
        };

        self.announce(&format!("Starting App on port {}...", app.port));

        let environment = self
            .inherited
            .clone()
            .with(ENGINE_URL_VAR, topology.engine.base_url())
            .with(PORT_VAR, app.port.to_string());

        let spec = SpawnSpec {
            service: ServiceLabel::App,
            command,
            working_directory: app.working_directory.clone(),
            environment,
        };
        self.launch(spec).await
    }

    /// Spawn the frontend dev server if one is configured.
    ///
    /// A missing section or an empty command is not an error.
    ///
    /// # Errors
    ///
    /// `Spawn` or `AlreadyRunning`.
    pub async fn start_frontend(&mut self) -> Result<Option<&ManagedProcess>, ProcessError> {
        let topology = Arc::clone(&self.topology);
        let Some(frontend) = &topology.frontend else {
            return Ok(None);
        };
        let Some(command) = CommandLine::parse(&frontend.command) else {
            debug!("frontend command is empty, skipping");
            return Ok(None);
        };

        self.announce(&format!("Starting Frontend on port {}...", frontend.port));

        let spec = SpawnSpec {
            service: ServiceLabel::Frontend,
            command,
            working_directory: frontend.working_directory.clone(),
            environment: self.inherited.clone(),
        };
        self.launch(spec).await.map(Some)
    }

    /// Terminate every tracked process concurrently and wait for all of them.
    ///
    /// Processes that already exited are skipped, so this can be called any
    /// number of times.
    pub async fn terminate_all(&self) {
        let reasons = join_all(self.group.iter().map(|p| p.terminate())).await;
        for (process, reason) in self.group.iter().zip(reasons) {
            debug!(service = %process.service(), %reason, "process reached terminal state");
        }
    }

    /// Next self-exit of a tracked process.
    pub async fn next_event(&mut self) -> Option<GroupEvent> {
        self.events_rx.recv().await
    }

    /// Most recently started process for `service`.
    pub fn process(&self, service: ServiceLabel) -> Option<&ManagedProcess> {
        self.group.iter().rev().find(|p| p.service() == service)
    }

    /// `Unstarted` for services never spawned.
    pub fn state(&self, service: ServiceLabel) -> ProcessState {
        self.process(service)
            .map_or(ProcessState::Unstarted, ManagedProcess::state)
    }

    /// Every process ever started, in start order.
    pub fn processes(&self) -> impl Iterator<Item = &ManagedProcess> {
        self.group.iter()
    }

    fn live(&self, service: ServiceLabel) -> Option<&ManagedProcess> {
        self.process(service).filter(|p| !p.state().is_exited())
    }

    fn announce(&self, text: &str) {
        self.sink.emit(LogLine::new(ServiceLabel::Nexus, text));
    }

    async fn launch(&mut self, spec: SpawnSpec) -> Result<&ManagedProcess, ProcessError> {
        let service = spec.service;
        if self.live(service).is_some() {
            return Err(ProcessError::AlreadyRunning { service });
        }

        let spawned = ManagedProcess::spawn(
            spec,
            &self.sink,
            self.events_tx.clone(),
            self.topology.supervisor.shutdown_timeout,
        );

        match spawned {
            Ok(process) => {
                info!(%service, command = %process.command(), "started");
                self.group.push(process);
                Ok(&self.group[self.group.len() - 1])
            }
            Err(e) => {
                self.terminate_all().await;
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("topology", &self.topology)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}
