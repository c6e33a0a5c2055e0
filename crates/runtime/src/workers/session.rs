//! Session worker that owns the authoritative [`SessionRegistry`].
//!
//! Receives commands from [`CombatHandle`](crate::api::CombatHandle), runs
//! them through the registry against the shared host, and publishes the
//! resulting events to the [`EventBus`] and the optional message sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use combat_core::{
    ActionOutcome, ClassifiedError, CombatAction, CombatEnv, CombatError, CombatEvent,
    CombatHost, CombatSession, EndReason, LocationId, MessageSink, ParticipantId, RemovalReason,
    SessionRegistry,
};

use super::DiceStreams;
use crate::api::Result;
use crate::events::EventBus;

/// Host shared between the worker and handles.
pub type SharedHost = Arc<Mutex<dyn CombatHost + Send>>;

/// Outbound text sink shared with the host application.
pub type SharedSink = Arc<dyn MessageSink + Send + Sync>;

type Reply<T> = oneshot::Sender<Result<T>>;

/// Commands that can be sent to the session worker.
pub enum Command {
    Begin {
        location: LocationId,
        initiator: ParticipantId,
        candidates: Vec<ParticipantId>,
        reply: Reply<Vec<CombatEvent>>,
    },
    Act {
        location: LocationId,
        actor: ParticipantId,
        action: CombatAction,
        reply: Reply<ActionOutcome>,
    },
    AddCombatant {
        location: LocationId,
        participant: ParticipantId,
        reply: Reply<Vec<CombatEvent>>,
    },
    RemoveCombatant {
        location: LocationId,
        participant: ParticipantId,
        reason: RemovalReason,
        reply: Reply<Vec<CombatEvent>>,
    },
    End {
        location: LocationId,
        reason: EndReason,
        reply: Reply<Vec<CombatEvent>>,
    },
    /// Read-only copy of the session at a location.
    Snapshot {
        location: LocationId,
        reply: oneshot::Sender<Option<CombatSession>>,
    },
    Locate {
        participant: ParticipantId,
        reply: oneshot::Sender<Option<LocationId>>,
    },
    Sweep {
        reply: oneshot::Sender<Vec<(LocationId, Vec<CombatEvent>)>>,
    },
}

/// Background task that processes combat commands.
pub struct SessionWorker {
    registry: SessionRegistry,
    host: SharedHost,
    dice: DiceStreams,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    sink: Option<SharedSink>,
    sweep_interval: Option<Duration>,
}

impl SessionWorker {
    pub fn new(
        registry: SessionRegistry,
        host: SharedHost,
        dice: DiceStreams,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: "combat::runtime",
            maneuvers = registry.catalog().len(),
            "session worker initialized"
        );
        Self {
            registry,
            host,
            dice,
            command_rx,
            event_bus,
            sink: None,
            sweep_interval: None,
        }
    }

    pub fn with_sink(mut self, sink: Option<SharedSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Periodically ends sessions left with one or no combatants.
    pub fn with_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Main worker loop. Exits once every command sender is dropped.
    pub async fn run(mut self) {
        let mut ticker = self.sweep_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                _ = next_tick(&mut ticker) => {
                    self.sweep();
                }
            }
        }

        debug!(
            target: "combat::runtime",
            sessions = self.registry.len(),
            "session worker stopped"
        );
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Begin {
                location,
                initiator,
                candidates,
                reply,
            } => {
                let result = self
                    .with_env(location, true, |registry, env| {
                        registry.start(env, location, initiator, &candidates)
                    })
                    .await;
                let result = self.settle(location, "begin", result, |events| events);
                send(reply, result, "Begin");
            }
            Command::Act {
                location,
                actor,
                action,
                reply,
            } => {
                let result = self
                    .with_env(location, false, |registry, env| {
                        registry.process_action(env, location, actor, &action)
                    })
                    .await;
                let result = self.settle(location, action.as_str(), result, |outcome| {
                    &outcome.events
                });
                send(reply, result, "Act");
            }
            Command::AddCombatant {
                location,
                participant,
                reply,
            } => {
                let result = self
                    .with_env(location, false, |registry, env| {
                        registry.add(env, location, participant)
                    })
                    .await;
                let result = self.settle(location, "add", result, |events| events);
                send(reply, result, "AddCombatant");
            }
            Command::RemoveCombatant {
                location,
                participant,
                reason,
                reply,
            } => {
                let result = self
                    .with_env(location, false, |registry, env| {
                        registry.remove(env, location, participant, reason)
                    })
                    .await;
                let result = self.settle(location, "remove", result, |events| events);
                send(reply, result, "RemoveCombatant");
            }
            Command::End {
                location,
                reason,
                reply,
            } => {
                let result = self.registry.end(location, reason);
                if !self.registry.is_active(location) {
                    self.dice.release(location);
                }
                let result = self.settle(location, "end", result, |events| events);
                send(reply, result, "End");
            }
            Command::Snapshot { location, reply } => {
                if reply.send(self.registry.session(location).cloned()).is_err() {
                    debug!(target: "combat::runtime", "Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Locate { participant, reply } => {
                if reply.send(self.registry.locate(participant)).is_err() {
                    debug!(target: "combat::runtime", "Locate reply channel closed (caller dropped)");
                }
            }
            Command::Sweep { reply } => {
                let ended = self.sweep();
                if reply.send(ended).is_err() {
                    debug!(target: "combat::runtime", "Sweep reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Runs `op` with the host locked and the dice for `location`.
    async fn with_env<T>(
        &mut self,
        location: LocationId,
        opening: bool,
        op: impl FnOnce(&mut SessionRegistry, &mut CombatEnv<'_>) -> std::result::Result<T, CombatError>,
    ) -> std::result::Result<T, CombatError> {
        let mut host = self.host.lock().await;
        let opening = opening && !self.registry.is_active(location);
        let dice = self.dice.for_location(location, opening);
        let mut env = CombatEnv::new(&mut *host, dice);
        let result = op(&mut self.registry, &mut env);
        if !self.registry.is_active(location) {
            self.dice.release(location);
        }
        result
    }

    /// Publishes the events of a successful operation; logs rejections.
    fn settle<T>(
        &self,
        location: LocationId,
        operation: &str,
        result: std::result::Result<T, CombatError>,
        events: impl FnOnce(&T) -> &Vec<CombatEvent>,
    ) -> Result<T> {
        match result {
            Ok(value) => {
                self.publish(location, events(&value));
                Ok(value)
            }
            Err(error) => {
                warn!(
                    target: "combat::runtime",
                    %location,
                    operation,
                    code = error.error_code(),
                    severity = error.severity().as_str(),
                    %error,
                    "combat operation rejected"
                );
                Err(error.into())
            }
        }
    }

    fn publish(&self, location: LocationId, events: &[CombatEvent]) {
        if events.is_empty() {
            return;
        }
        self.event_bus.publish_all(location, events);
        if let Some(sink) = &self.sink {
            combat_core::env::deliver(location, events, sink.as_ref());
        }
    }

    fn sweep(&mut self) -> Vec<(LocationId, Vec<CombatEvent>)> {
        let ended = self.registry.sweep();
        for (location, events) in &ended {
            info!(target: "combat::runtime", %location, "swept stale session");
            self.dice.release(*location);
            self.publish(*location, events);
        }
        ended
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn send<T>(reply: Reply<T>, result: Result<T>, command: &str) {
    if reply.send(result).is_err() {
        debug!(target: "combat::runtime", command, "reply channel closed (caller dropped)");
    }
}
