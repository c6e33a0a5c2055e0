//! Turn-based combat resolution shared by every host.
//!
//! `combat-core` owns the rules: initiative and turn order, per-turn action
//! budgets, opposed dice-pool resolution, status effects, and the resource
//! economy for bonus actions. It performs no I/O. Character sheets, health
//! tracks and message delivery belong to the host and are reached through the
//! collaborator traits in [`env`]. All session mutation flows through
//! [`engine::CombatEngine`].
pub mod action;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod registry;
pub mod state;

pub use action::{
    ActionResolver, CombatAction, DamageDealt, ManeuverResolution, PoolRoll, ResolutionOutcome,
    ResourceEconomy, StatusEffectTracker, TickReport,
};
pub use catalog::{
    CatalogError, CatalogFilter, CombatantProfile, ManeuverCatalog, ManeuverCategory,
    ManeuverDefinition, ManeuverRole, Requirements, SpecialEffect, check_requirements,
};
pub use config::{CombatConfig, HealthPenaltyTable};
pub use engine::{ActionOutcome, CombatEngine};
pub use env::{
    AttributeCategory, AttributeProvider, CombatEnv, CombatHost, DamageSink, DiceRoller,
    InjuryTier, MessageSink, ResourceLedger, ResourcePool, ResourceScope,
};
pub use error::{ClassifiedError, CombatError, CombatErrorKind, ErrorSeverity};
pub use events::{Audience, CombatEvent, EndReason, RemovalReason};
pub use registry::SessionRegistry;
pub use state::{
    CombatFlags, CombatSession, Combatant, DamageType, LocationId, ManeuverId, ParticipantId,
    SessionId, SessionPhase, StatusEffect, StatusEffectKind,
};
