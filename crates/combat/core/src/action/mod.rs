//! Action vocabulary and the rules that resolve it.
//!
//! [`CombatAction`] is the closed set of requests a combatant can submit. The
//! submodules hold the stateless pieces the engine composes: dice arithmetic,
//! maneuver resolution, the resource economy and status-effect ticking.

mod dice;
mod economy;
mod resolve;
mod tracker;

pub use dice::{PoolRoll, dice_pool, net_successes, roll_pool, roll_successes};
pub use economy::{ResourceEconomy, SpendReport};
pub use resolve::{ActionResolver, DamageDealt, ManeuverResolution, ResolutionOutcome};
pub use tracker::{PeriodicDamage, StatusEffectTracker, TickReport};

use crate::state::{ManeuverId, ParticipantId};

/// A request submitted by a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatAction {
    /// Declares an attack maneuver. Consumes one action.
    Attack {
        maneuver: ManeuverId,
        target: Option<ParticipantId>,
    },
    /// Queues a defense against the next incoming attack. Allowed at any time.
    Defense { maneuver: ManeuverId },
    /// Spends the economy pool for extra actions this turn.
    SpendResource { amount: u32 },
    /// Gives up one action.
    Pass,
    /// Gives up every remaining action.
    EndTurn,
}

impl CombatAction {
    pub fn attack(maneuver: impl Into<ManeuverId>, target: ParticipantId) -> Self {
        Self::Attack {
            maneuver: maneuver.into(),
            target: Some(target),
        }
    }

    pub fn defense(maneuver: impl Into<ManeuverId>) -> Self {
        Self::Defense {
            maneuver: maneuver.into(),
        }
    }

    /// Defense-setting is the only action accepted outside the actor's turn.
    pub const fn requires_turn(&self) -> bool {
        !matches!(self, Self::Defense { .. })
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attack { .. } => "attack",
            Self::Defense { .. } => "defense",
            Self::SpendResource { .. } => "spend_resource",
            Self::Pass => "pass",
            Self::EndTurn => "end_turn",
        }
    }
}
