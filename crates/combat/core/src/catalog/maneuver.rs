use super::{Requirements, SpecialEffect};
use crate::config::CombatConfig;
use crate::state::{DamageType, ManeuverId};

/// Catalog section a maneuver belongs to.
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
pub enum ManeuverCategory {
    /// Brawling moves anyone can attempt.
    #[default]
    Standard,
    MartialArts,
    /// Moves that need a weapon in hand; equipment modifiers apply.
    Weapon,
}

/// Whether a maneuver is declared on the actor's turn or queued as a defense.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ManeuverRole {
    #[default]
    Attack,
    Defense,
}

/// Immutable catalog entry describing how a maneuver is rolled and what it does.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManeuverDefinition {
    pub id: ManeuverId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: ManeuverCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: ManeuverRole,

    /// Attribute half of the dice pool (e.g. `"dexterity"`).
    pub attribute: String,
    /// Ability half of the dice pool (e.g. `"brawl"`).
    pub ability: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub difficulty_mod: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_mod: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_type: DamageType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra_damage_dice: u32,

    #[cfg_attr(feature = "serde", serde(default))]
    pub special_effects: Vec<SpecialEffect>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: Requirements,
}

impl ManeuverDefinition {
    /// Bare attack with no modifiers, effects or requirements.
    pub fn attack(id: &str, name: &str, attribute: &str, ability: &str) -> Self {
        Self {
            id: ManeuverId::new(id),
            name: name.to_owned(),
            description: String::new(),
            category: ManeuverCategory::Standard,
            role: ManeuverRole::Attack,
            attribute: attribute.to_owned(),
            ability: ability.to_owned(),
            difficulty_mod: 0,
            damage_mod: 0,
            damage_type: DamageType::Bashing,
            extra_damage_dice: 0,
            special_effects: Vec::new(),
            requirements: Requirements::default(),
        }
    }

    /// Bare defense with no modifiers, effects or requirements.
    pub fn defense(id: &str, name: &str, attribute: &str, ability: &str) -> Self {
        Self {
            role: ManeuverRole::Defense,
            ..Self::attack(id, name, attribute, ability)
        }
    }

    pub fn with_category(mut self, category: ManeuverCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_effect(mut self, effect: SpecialEffect) -> Self {
        self.special_effects.push(effect);
        self
    }

    pub fn with_damage(mut self, damage_mod: i32, damage_type: DamageType) -> Self {
        self.damage_mod = damage_mod;
        self.damage_type = damage_type;
        self
    }

    pub fn with_difficulty(mut self, difficulty_mod: i32) -> Self {
        self.difficulty_mod = difficulty_mod;
        self
    }

    pub fn is_defense(&self) -> bool {
        self.role == ManeuverRole::Defense
    }

    pub fn has_effect(&self, effect: SpecialEffect) -> bool {
        self.special_effects.contains(&effect)
    }

    pub fn redirects(&self) -> bool {
        self.has_effect(SpecialEffect::Redirect)
    }

    pub fn success_scaled(&self) -> bool {
        self.has_effect(SpecialEffect::SuccessScaledDamage)
    }

    pub fn self_damage_on_miss(&self) -> bool {
        self.has_effect(SpecialEffect::SelfDamageOnMiss)
    }

    /// Brawl, melee and martial-arts maneuvers add Strength to damage; the rest
    /// use a fixed base.
    pub fn uses_strength_damage(&self) -> bool {
        CombatConfig::STRENGTH_DAMAGE_ABILITIES
            .iter()
            .any(|a| a.eq_ignore_ascii_case(&self.ability))
    }

    /// Status-inflicting effects, in declaration order.
    pub fn status_effects(&self) -> impl Iterator<Item = crate::state::StatusEffect> + '_ {
        self.special_effects.iter().filter_map(SpecialEffect::status)
    }
}
