//! Canonical combat state.
//!
//! Everything the engine mutates lives here: sessions, their combatants, and
//! the status effects attached to them. Character sheets and health tracks are
//! owned by the host and reached through [`crate::env`].

mod combatant;
mod common;
mod session;
mod status;

pub use combatant::{Combatant, InitiativeRoll};
pub use common::{DamageType, LocationId, ManeuverId, ParticipantId, SessionId};
pub use session::{CombatSession, SessionPhase};
pub use status::{CombatFlags, EffectPayload, StatusEffect, StatusEffectKind, StatusEffects};
