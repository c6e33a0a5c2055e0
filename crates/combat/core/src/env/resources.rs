//! Spendable resource pools.

use crate::state::ParticipantId;

/// Pools a combatant can draw on.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ResourcePool {
    /// Spent for bonus actions.
    #[default]
    Rage,
    Gnosis,
    Willpower,
}

/// Which track of a pool to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceScope {
    /// Permanent rating (the pool's maximum).
    Permanent,
    /// Points currently available to spend.
    Current,
}

/// Resource balances owned by the host.
pub trait ResourceLedger {
    fn get_resource(&self, participant: ParticipantId, pool: ResourcePool, scope: ResourceScope)
    -> i32;

    /// Removes `amount` from the current track. Callers validate the balance
    /// first; implementations may saturate at zero.
    fn deduct_resource(&mut self, participant: ParticipantId, pool: ResourcePool, amount: u32);
}
