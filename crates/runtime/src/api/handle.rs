//! Cloneable façade for issuing commands to the runtime.
//!
//! [`CombatHandle`] hides channel plumbing and offers async helpers for
//! starting sessions, submitting actions and streaming events from specific
//! topics.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{
    ActionOutcome, CatalogFilter, CombatAction, CombatEvent, CombatSession, CombatantProfile,
    EndReason, LocationId, ManeuverCatalog, ManeuverCategory, ManeuverDefinition, ParticipantId,
    RemovalReason,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, SharedHost};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct CombatHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    catalog: Arc<ManeuverCatalog>,
    host: SharedHost,
}

impl CombatHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        catalog: Arc<ManeuverCatalog>,
        host: SharedHost,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            catalog,
            host,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Begin combat at `location`, initiated by `initiator` against
    /// `candidates`. Returns the opening events, initiative included.
    pub async fn begin(
        &self,
        location: LocationId,
        initiator: ParticipantId,
        candidates: &[ParticipantId],
    ) -> Result<Vec<CombatEvent>> {
        let candidates = candidates.to_vec();
        self.request(|reply| Command::Begin {
            location,
            initiator,
            candidates,
            reply,
        })
        .await?
    }

    /// Submit an action on behalf of `actor`.
    pub async fn process_action(
        &self,
        location: LocationId,
        actor: ParticipantId,
        action: CombatAction,
    ) -> Result<ActionOutcome> {
        self.request(|reply| Command::Act {
            location,
            actor,
            action,
            reply,
        })
        .await?
    }

    /// Join an ongoing fight.
    pub async fn add(
        &self,
        location: LocationId,
        participant: ParticipantId,
    ) -> Result<Vec<CombatEvent>> {
        self.request(|reply| Command::AddCombatant {
            location,
            participant,
            reply,
        })
        .await?
    }

    pub async fn remove(
        &self,
        location: LocationId,
        participant: ParticipantId,
        reason: RemovalReason,
    ) -> Result<Vec<CombatEvent>> {
        self.request(|reply| Command::RemoveCombatant {
            location,
            participant,
            reason,
            reply,
        })
        .await?
    }

    /// End the fight at `location` on request.
    pub async fn end(&self, location: LocationId) -> Result<Vec<CombatEvent>> {
        self.request(|reply| Command::End {
            location,
            reason: EndReason::Requested,
            reply,
        })
        .await?
    }

    /// Query the session at `location` (read-only snapshot).
    pub async fn snapshot(&self, location: LocationId) -> Result<Option<CombatSession>> {
        self.request(|reply| Command::Snapshot { location, reply })
            .await
    }

    /// Location of the fight `participant` is in, if any.
    pub async fn locate(&self, participant: ParticipantId) -> Result<Option<LocationId>> {
        self.request(|reply| Command::Locate { participant, reply })
            .await
    }

    /// End sessions left with one or no combatants.
    pub async fn sweep(&self) -> Result<Vec<(LocationId, Vec<CombatEvent>)>> {
        self.request(|reply| Command::Sweep { reply }).await
    }

    /// Maneuvers `participant` currently qualifies for, optionally narrowed
    /// by `filter`.
    pub async fn list_available(
        &self,
        participant: ParticipantId,
        filter: Option<&CatalogFilter>,
    ) -> Vec<ManeuverDefinition> {
        let host = self.host.lock().await;
        let profile = CombatantProfile::gather(&*host, participant, self.catalog.iter());
        self.catalog
            .list_available(&profile, filter)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn list_by_category(&self, category: ManeuverCategory) -> Vec<ManeuverDefinition> {
        self.catalog
            .list_by_category(category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn catalog(&self) -> &ManeuverCatalog {
        &self.catalog
    }

    /// The host the worker resolves against.
    pub fn host(&self) -> SharedHost {
        Arc::clone(&self.host)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Session` - Combat begun or ended, combatants joining and leaving
    /// - `Topic::Turn` - Initiative, rounds and turn management
    /// - `Topic::Resolution` - Maneuvers, damage, status effects and spends
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
