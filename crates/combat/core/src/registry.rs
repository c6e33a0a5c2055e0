//! Location-keyed ownership of combat sessions.
//!
//! The registry enforces one active session per location and one session per
//! participant. Every mutating call runs the engine against a working copy of
//! the session and commits it only on success, so a rejected or failed action
//! never leaves a half-applied session behind. Sessions are destroyed as soon
//! as they become inactive.

use std::collections::HashMap;
use std::sync::Arc;

use crate::action::CombatAction;
use crate::catalog::{
    CatalogFilter, CombatantProfile, ManeuverCatalog, ManeuverCategory, ManeuverDefinition,
};
use crate::config::CombatConfig;
use crate::engine::{ActionOutcome, CombatEngine};
use crate::env::{CombatEnv, CombatHost};
use crate::error::CombatError;
use crate::events::{CombatEvent, EndReason, RemovalReason};
use crate::state::{CombatSession, LocationId, ParticipantId, SessionId};

pub struct SessionRegistry {
    sessions: HashMap<LocationId, CombatSession>,
    catalog: Arc<ManeuverCatalog>,
    config: CombatConfig,
    next_session: u64,
}

impl SessionRegistry {
    pub fn new(catalog: Arc<ManeuverCatalog>, config: CombatConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            catalog,
            config,
            next_session: 1,
        }
    }

    pub fn catalog(&self) -> &ManeuverCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn session(&self, location: LocationId) -> Option<&CombatSession> {
        self.sessions.get(&location)
    }

    pub fn is_active(&self, location: LocationId) -> bool {
        self.sessions.get(&location).is_some_and(|s| s.active)
    }

    /// Location of the session `participant` is fighting in.
    pub fn locate(&self, participant: ParticipantId) -> Option<LocationId> {
        self.sessions
            .values()
            .find(|s| s.contains(participant))
            .map(|s| s.location)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Begins combat at `location` and rolls the first initiative round.
    ///
    /// Candidates already fighting elsewhere are not eligible.
    pub fn start(
        &mut self,
        env: &mut CombatEnv<'_>,
        location: LocationId,
        initiator: ParticipantId,
        candidates: &[ParticipantId],
    ) -> Result<Vec<CombatEvent>, CombatError> {
        if self.is_active(location) {
            return Err(CombatError::SessionAlreadyActive { location });
        }
        if let Some(elsewhere) = self.locate(initiator) {
            tracing::debug!(target: "combat::engine", %initiator, %elsewhere, "initiator busy");
            return Err(CombatError::AlreadyInCombat {
                participant: initiator,
            });
        }
        let free: Vec<ParticipantId> = candidates
            .iter()
            .copied()
            .filter(|&p| self.locate(p).is_none())
            .collect();

        let id = SessionId(self.next_session);
        let mut session = CombatSession::new(id, location);
        let events = {
            let mut engine = CombatEngine::new(&mut session, &self.catalog, &self.config);
            let mut events = engine.begin(env, initiator, &free)?;
            events.extend(engine.roll_initiative(env)?);
            events
        };
        self.next_session += 1;

        if session.active {
            self.sessions.insert(location, session);
        }
        Ok(events)
    }

    pub fn process_action(
        &mut self,
        env: &mut CombatEnv<'_>,
        location: LocationId,
        actor: ParticipantId,
        action: &CombatAction,
    ) -> Result<ActionOutcome, CombatError> {
        let (catalog, config) = (&self.catalog, &self.config);
        Self::transact(&mut self.sessions, location, |session| {
            CombatEngine::new(session, catalog, config).process_action(env, actor, action)
        })
    }

    pub fn add(
        &mut self,
        env: &mut CombatEnv<'_>,
        location: LocationId,
        participant: ParticipantId,
    ) -> Result<Vec<CombatEvent>, CombatError> {
        if let Some(current) = self.locate(participant) {
            if current != location {
                return Err(CombatError::AlreadyInCombat { participant });
            }
        }
        let (catalog, config) = (&self.catalog, &self.config);
        Self::transact(&mut self.sessions, location, |session| {
            CombatEngine::new(session, catalog, config).add_combatant(env, participant)
        })
    }

    pub fn remove(
        &mut self,
        env: &mut CombatEnv<'_>,
        location: LocationId,
        participant: ParticipantId,
        reason: RemovalReason,
    ) -> Result<Vec<CombatEvent>, CombatError> {
        let (catalog, config) = (&self.catalog, &self.config);
        Self::transact(&mut self.sessions, location, |session| {
            CombatEngine::new(session, catalog, config).remove_combatant(env, participant, reason)
        })
    }

    pub fn end(
        &mut self,
        location: LocationId,
        reason: EndReason,
    ) -> Result<Vec<CombatEvent>, CombatError> {
        let (catalog, config) = (&self.catalog, &self.config);
        Self::transact(&mut self.sessions, location, |session| {
            CombatEngine::new(session, catalog, config).end(reason)
        })
    }

    /// Housekeeping: ends sessions with one or no combatants and drops any
    /// inactive leftovers.
    pub fn sweep(&mut self) -> Vec<(LocationId, Vec<CombatEvent>)> {
        let stale: Vec<LocationId> = self
            .sessions
            .values()
            .filter(|s| !s.active || s.len() <= 1)
            .map(|s| s.location)
            .collect();

        let mut ended = Vec::new();
        for location in stale {
            let Some(mut session) = self.sessions.remove(&location) else {
                continue;
            };
            if session.active {
                let mut engine = CombatEngine::new(&mut session, &self.catalog, &self.config);
                match engine.end(EndReason::TooFewCombatants) {
                    Ok(events) => ended.push((location, events)),
                    Err(error) => tracing::warn!(
                        target: "combat::engine",
                        %location,
                        %error,
                        "sweep could not end session"
                    ),
                }
            }
        }
        ended
    }

    /// Maneuvers `participant` can use right now.
    pub fn list_available(
        &self,
        host: &dyn CombatHost,
        participant: ParticipantId,
        filter: Option<&CatalogFilter>,
    ) -> Vec<&ManeuverDefinition> {
        let profile = CombatantProfile::gather(host, participant, self.catalog.iter());
        self.catalog.list_available(&profile, filter)
    }

    pub fn list_by_category(&self, category: ManeuverCategory) -> Vec<&ManeuverDefinition> {
        self.catalog.list_by_category(category)
    }

    /// Runs `op` on a working copy of the session at `location` and commits it
    /// on success. Inactive sessions are destroyed.
    fn transact<T>(
        sessions: &mut HashMap<LocationId, CombatSession>,
        location: LocationId,
        op: impl FnOnce(&mut CombatSession) -> Result<T, CombatError>,
    ) -> Result<T, CombatError> {
        let Some(current) = sessions.get(&location) else {
            return Err(CombatError::SessionInactive { location });
        };

        let mut working = current.clone();
        let result = op(&mut working);
        match &result {
            Ok(_) if working.active => {
                sessions.insert(location, working);
            }
            Ok(_) => {
                sessions.remove(&location);
                tracing::info!(target: "combat::engine", %location, "session destroyed");
            }
            Err(error @ CombatError::Internal(_)) => {
                tracing::error!(
                    target: "combat::engine",
                    %location,
                    %error,
                    "internal failure, session rolled back"
                );
            }
            Err(error) => {
                tracing::debug!(target: "combat::engine", %location, %error, "action rejected");
            }
        }
        result
    }
}
