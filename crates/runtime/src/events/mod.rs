//! Topic-based event bus for combat events.
//!
//! Every batch of [`combat_core::CombatEvent`]s the worker produces is
//! published here, tagged with its location, so consumers can follow only the
//! topics they need.

mod bus;

pub use bus::{Event, EventBus, Topic};
