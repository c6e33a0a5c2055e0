//! Health-track collaborator.

use crate::state::{DamageType, ParticipantId};

/// Coarse injury level reported by the damage collaborator.
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
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum InjuryTier {
    #[default]
    Healthy,
    Bruised,
    Hurt,
    Injured,
    Wounded,
    Mauled,
    Crippled,
    Incapacitated,
    Dead,
}

impl InjuryTier {
    /// Whether a character at this tier may keep fighting.
    pub const fn can_fight(self) -> bool {
        !matches!(self, Self::Incapacitated | Self::Dead)
    }
}

/// Applies damage and reports injury levels. The combat core keeps no health
/// bookkeeping of its own.
pub trait DamageSink {
    /// Applies `amount` levels of `damage_type` and returns the resulting tier.
    fn apply_damage(
        &mut self,
        participant: ParticipantId,
        amount: u32,
        damage_type: DamageType,
    ) -> InjuryTier;

    fn injury_tier(&self, participant: ParticipantId) -> InjuryTier;

    /// Fight-capability signal used for eligibility and incapacitation.
    fn can_fight(&self, participant: ParticipantId) -> bool {
        self.injury_tier(participant).can_fight()
    }
}
