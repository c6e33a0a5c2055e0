use crate::env::{InjuryTier, ResourcePool};

/// Dice removed from every pool at each injury tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HealthPenaltyTable {
    pub healthy: u32,
    pub bruised: u32,
    pub hurt: u32,
    pub injured: u32,
    pub wounded: u32,
    pub mauled: u32,
    pub crippled: u32,
    /// Applies to incapacitated, dead, and anything equivalent.
    pub incapacitated: u32,
}

impl HealthPenaltyTable {
    pub const fn penalty(&self, tier: InjuryTier) -> u32 {
        match tier {
            InjuryTier::Healthy => self.healthy,
            InjuryTier::Bruised => self.bruised,
            InjuryTier::Hurt => self.hurt,
            InjuryTier::Injured => self.injured,
            InjuryTier::Wounded => self.wounded,
            InjuryTier::Mauled => self.mauled,
            InjuryTier::Crippled => self.crippled,
            InjuryTier::Incapacitated | InjuryTier::Dead => self.incapacitated,
        }
    }
}

impl Default for HealthPenaltyTable {
    fn default() -> Self {
        Self {
            healthy: 0,
            bruised: 0,
            hurt: 1,
            injured: 1,
            wounded: 2,
            mauled: 2,
            crippled: 5,
            incapacitated: 10,
        }
    }
}

/// Combat rules constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CombatConfig {
    /// Difficulty before maneuver and equipment modifiers.
    pub base_difficulty: u32,
    pub min_difficulty: u32,
    pub max_difficulty: u32,

    /// Faces on the initiative die.
    pub initiative_die: u32,
    /// Faces on every pool die.
    pub pool_die: u32,

    /// Damage base for maneuvers that do not add Strength.
    pub fixed_base_damage: u32,
    /// Difficulty of damage rolls (successes only, no 1-cancellation).
    pub damage_difficulty: u32,
    /// Difficulty of the self-damage soak roll.
    pub soak_difficulty: u32,

    /// Difficulty added to the next maneuver after passing the speed limit.
    pub speed_limit_penalty: u32,
    pub knockdown_penalty: u32,
    pub blinded_penalty: u32,

    /// Pool spent for bonus actions.
    pub economy_pool: ResourcePool,

    pub health_penalties: HealthPenaltyTable,
}

impl CombatConfig {
    // ===== compile-time constants =====
    /// Abilities whose maneuvers add the attacker's Strength to damage.
    pub const STRENGTH_DAMAGE_ABILITIES: [&'static str; 3] = ["brawl", "melee", "martial_arts"];
    /// Style requirement that any (or no) style satisfies.
    pub const ANY_STYLE: &'static str = "any";

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BASE_DIFFICULTY: u32 = 6;
    pub const DEFAULT_MIN_DIFFICULTY: u32 = 2;
    pub const DEFAULT_MAX_DIFFICULTY: u32 = 10;
    pub const DEFAULT_DIE: u32 = 10;
    pub const DEFAULT_FIXED_BASE_DAMAGE: u32 = 2;
    pub const DEFAULT_SPEED_LIMIT_PENALTY: u32 = 3;
    pub const DEFAULT_CONDITION_PENALTY: u32 = 2;

    pub fn new() -> Self {
        Self {
            base_difficulty: Self::DEFAULT_BASE_DIFFICULTY,
            min_difficulty: Self::DEFAULT_MIN_DIFFICULTY,
            max_difficulty: Self::DEFAULT_MAX_DIFFICULTY,
            initiative_die: Self::DEFAULT_DIE,
            pool_die: Self::DEFAULT_DIE,
            fixed_base_damage: Self::DEFAULT_FIXED_BASE_DAMAGE,
            damage_difficulty: Self::DEFAULT_BASE_DIFFICULTY,
            soak_difficulty: Self::DEFAULT_BASE_DIFFICULTY,
            speed_limit_penalty: Self::DEFAULT_SPEED_LIMIT_PENALTY,
            knockdown_penalty: Self::DEFAULT_CONDITION_PENALTY,
            blinded_penalty: Self::DEFAULT_CONDITION_PENALTY,
            economy_pool: ResourcePool::Rage,
            health_penalties: HealthPenaltyTable::default(),
        }
    }

    /// Clamps a raw difficulty into the configured range.
    pub fn clamp_difficulty(&self, raw: i32) -> u32 {
        raw.max(self.min_difficulty as i32)
            .min(self.max_difficulty as i32)
            .max(1) as u32
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
