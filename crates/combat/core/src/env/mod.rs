//! Collaborators the combat core reads from and writes through.
//!
//! The core owns no character data. Ratings, resource balances and health
//! tracks live with the host and are reached through the traits here;
//! [`CombatEnv`] bundles them with the dice for a single call into the engine.
mod attributes;
mod damage;
mod dice;
mod memory;
mod messaging;
mod resources;

pub use attributes::{AttributeCategory, AttributeProvider, names};
pub use damage::{DamageSink, InjuryTier};
pub use dice::{DiceRoller, ScriptedDice, SeededDice, session_seed};
pub use memory::{CharacterSheet, DamageRecord, InMemoryHost};
pub use messaging::{Message, MessageSink, RecordingSink, deliver};
pub use resources::{ResourceLedger, ResourcePool, ResourceScope};

/// Everything the host provides about characters.
pub trait CombatHost: AttributeProvider + ResourceLedger + DamageSink {}

impl<T> CombatHost for T where T: AttributeProvider + ResourceLedger + DamageSink + ?Sized {}

/// Mutable view of the host and dice for one engine call.
pub struct CombatEnv<'a> {
    pub host: &'a mut dyn CombatHost,
    pub dice: &'a mut dyn DiceRoller,
}

impl<'a> CombatEnv<'a> {
    pub fn new(host: &'a mut dyn CombatHost, dice: &'a mut dyn DiceRoller) -> Self {
        Self { host, dice }
    }

    /// Shorthand for an attribute-category rating.
    pub fn attribute(&self, participant: crate::state::ParticipantId, name: &str) -> i32 {
        self.host
            .get_attribute(participant, AttributeCategory::Attribute, name)
    }

    /// Shorthand for an ability-category rating.
    pub fn ability(&self, participant: crate::state::ParticipantId, name: &str) -> i32 {
        self.host
            .get_attribute(participant, AttributeCategory::Ability, name)
    }

    /// Shorthand for an equipment modifier.
    pub fn equipment(&self, participant: crate::state::ParticipantId, name: &str) -> i32 {
        self.host
            .get_attribute(participant, AttributeCategory::Equipment, name)
    }
}
