//! High-level runtime orchestrator.
//!
//! The runtime owns the session worker, wires up command and event channels,
//! and exposes a builder-based API for hosts to drive combat.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use combat_content::{ConfigLoader, ManeuverLoader};
use combat_core::{CombatConfig, CombatHost, DiceRoller, ManeuverCatalog, SessionRegistry};

use crate::api::{CombatHandle, Result, RuntimeError};
use crate::events::EventBus;
use crate::workers::{Command, DiceStreams, SessionWorker, SharedHost, SharedSink};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Base seed for the per-session dice streams used when no dice are
    /// injected.
    pub dice_seed: u64,
    /// How often stale sessions are swept. `None` disables the sweep.
    pub sweep_interval: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            dice_seed: 0,
            sweep_interval: None,
        }
    }
}

/// Runtime that owns the combat worker.
///
/// [`CombatHandle`] provides a cloneable façade for clients.
pub struct CombatRuntime {
    handle: CombatHandle,
    worker: JoinHandle<()>,
}

impl CombatRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> CombatHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully.
    ///
    /// The worker drains queued commands and stops once every handle clone
    /// has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`CombatRuntime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    catalog: Option<ManeuverCatalog>,
    content_dir: Option<PathBuf>,
    host: Option<SharedHost>,
    dice: Option<Box<dyn DiceRoller + Send>>,
    sink: Option<SharedSink>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            catalog: None,
            content_dir: None,
            host: None,
            dice: None,
            sink: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this catalog instead of the shipped one.
    pub fn catalog(mut self, catalog: ManeuverCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Load content from a directory holding `maneuvers/*.ron` and an optional
    /// `combat.toml`.
    pub fn content_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.content_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set the required host. The caller keeps its own clone to inspect
    /// character data between commands.
    pub fn host<H>(mut self, host: Arc<Mutex<H>>) -> Self
    where
        H: CombatHost + Send + 'static,
    {
        let host: SharedHost = host;
        self.host = Some(host);
        self
    }

    /// Inject dice shared by every session, e.g. scripted faces in tests.
    pub fn dice(mut self, dice: impl DiceRoller + Send + 'static) -> Self {
        self.dice = Some(Box::new(dice));
        self
    }

    /// Deliver event text to this sink as well as the event bus.
    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the runtime and spawn its worker.
    pub async fn build(self) -> Result<CombatRuntime> {
        let host = self.host.ok_or(RuntimeError::MissingHost)?;
        let mut combat = self.config.combat.clone();

        let catalog = match (self.catalog, &self.content_dir) {
            (Some(catalog), _) => catalog,
            (None, Some(dir)) => ManeuverLoader::load_dir(&dir.join("maneuvers"))
                .map_err(|e| RuntimeError::Content(e.into()))?,
            (None, None) => {
                ManeuverLoader::load_embedded().map_err(|e| RuntimeError::Content(e.into()))?
            }
        };
        if let Some(dir) = &self.content_dir {
            let path = dir.join("combat.toml");
            if path.is_file() {
                combat = ConfigLoader::load(&path).map_err(|e| RuntimeError::Content(e.into()))?;
            }
        }

        let catalog = Arc::new(catalog);
        let dice = match self.dice {
            Some(dice) => DiceStreams::Injected(dice),
            None => DiceStreams::seeded(self.config.dice_seed),
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = CombatHandle::new(
            command_tx,
            event_bus.clone(),
            Arc::clone(&catalog),
            Arc::clone(&host),
        );

        let registry = SessionRegistry::new(catalog, combat);
        let worker = SessionWorker::new(registry, host, dice, command_rx, event_bus)
            .with_sink(self.sink)
            .with_sweep_interval(self.config.sweep_interval);

        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(CombatRuntime { handle, worker })
    }
}
