use std::collections::BTreeMap;

use super::{Combatant, LocationId, ParticipantId, SessionId};

/// Lifecycle phase of a combat session.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Inactive,
    Forming,
    RollingInitiative,
    Acting,
    Ending,
}

/// Combat bound to a single location.
///
/// # Invariants
///
/// - `turn_order` holds exactly the keys of `combatants`
/// - while `active` and `turn_order` is non-empty, `current_turn < turn_order.len()`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSession {
    pub id: SessionId,
    pub location: LocationId,
    pub active: bool,
    /// Number of initiative rounds rolled so far.
    pub turn_number: u32,
    pub phase: SessionPhase,
    pub combatants: BTreeMap<ParticipantId, Combatant>,
    pub turn_order: Vec<ParticipantId>,
    pub current_turn: usize,
    next_registration: u32,
}

impl CombatSession {
    pub fn new(id: SessionId, location: LocationId) -> Self {
        Self {
            id,
            location,
            active: false,
            turn_number: 0,
            phase: SessionPhase::Inactive,
            combatants: BTreeMap::new(),
            turn_order: Vec::new(),
            current_turn: 0,
            next_registration: 0,
        }
    }

    pub fn combatant(&self, participant: ParticipantId) -> Option<&Combatant> {
        self.combatants.get(&participant)
    }

    pub fn combatant_mut(&mut self, participant: ParticipantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&participant)
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.combatants.contains_key(&participant)
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Participant whose turn it is, if the session is acting.
    pub fn current_actor(&self) -> Option<ParticipantId> {
        if !self.active || self.phase != SessionPhase::Acting {
            return None;
        }
        self.turn_order.get(self.current_turn).copied()
    }

    /// Combatants in registration order.
    pub fn by_registration(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self
            .combatants
            .values()
            .map(|c| (c.registration, c.participant))
            .collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Creates a combatant record and appends it to `turn_order`. Registering a
    /// present participant returns the existing record untouched.
    pub(crate) fn register(&mut self, participant: ParticipantId) -> &mut Combatant {
        let next_registration = &mut self.next_registration;
        let turn_order = &mut self.turn_order;
        self.combatants.entry(participant).or_insert_with(|| {
            let registration = *next_registration;
            *next_registration += 1;
            turn_order.push(participant);
            Combatant::new(participant, registration)
        })
    }

    /// Removes a combatant and repairs `current_turn` without clamping.
    ///
    /// Entries before the current index shift it down by one. Removing the
    /// current entry leaves the index on whoever followed it, which may be one
    /// past the end.
    pub(crate) fn detach(&mut self, participant: ParticipantId) -> Option<(Combatant, usize)> {
        let combatant = self.combatants.remove(&participant)?;
        let index = self.turn_order.iter().position(|&id| id == participant)?;
        self.turn_order.remove(index);
        if index < self.current_turn {
            self.current_turn -= 1;
        }
        Some((combatant, index))
    }

    /// Checks the session invariants.
    pub fn is_consistent(&self) -> bool {
        let order_matches = self.turn_order.len() == self.combatants.len()
            && self.turn_order.iter().all(|id| self.combatants.contains_key(id));
        let index_valid =
            !self.active || self.turn_order.is_empty() || self.current_turn < self.turn_order.len();
        order_matches && index_valid
    }
}
