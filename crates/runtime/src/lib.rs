//! Async runtime around the turn-based combat core.
//!
//! A single worker task owns every [`combat_core::CombatSession`] through a
//! [`combat_core::SessionRegistry`]; clients talk to it through the cloneable
//! [`CombatHandle`] and follow the fight on the topic-based [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{CombatHandle, Result, RuntimeError};
pub use events::{Event, EventBus, Topic};
pub use runtime::{CombatRuntime, RuntimeBuilder, RuntimeConfig};
pub use workers::{SharedHost, SharedSink};
