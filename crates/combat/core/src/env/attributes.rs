//! Character-sheet lookups.

use crate::state::ParticipantId;

/// Well-known trait names used by the combat rules.
pub mod names {
    pub const STRENGTH: &str = "strength";
    pub const DEXTERITY: &str = "dexterity";
    pub const STAMINA: &str = "stamina";
    pub const WITS: &str = "wits";

    /// Equipment keys, read under [`super::AttributeCategory::Equipment`].
    pub const EQUIPMENT_DIFFICULTY: &str = "difficulty";
    pub const EQUIPMENT_DAMAGE: &str = "damage";
    pub const EQUIPMENT_EXTRA_DICE: &str = "extra_dice";
}

/// Sheet section a rating is stored under.
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
pub enum AttributeCategory {
    /// Physical, social and mental attributes (Strength, Wits, ...).
    Attribute,
    /// Talents, skills and knowledges (Brawl, Melee, Martial Arts, ...).
    #[default]
    Ability,
    /// Backgrounds and merits.
    Background,
    /// Modifiers granted by the equipped weapon.
    Equipment,
}

/// Read-only access to character ratings.
///
/// Unset or unknown ratings read as 0; lookups never fail.
pub trait AttributeProvider {
    fn get_attribute(&self, participant: ParticipantId, category: AttributeCategory, name: &str)
    -> i32;

    /// Current shape or stance (e.g. `"crinos"`), if the character has one.
    fn current_form(&self, _participant: ParticipantId) -> Option<String> {
        None
    }

    /// Fighting styles the character has trained in.
    fn styles(&self, _participant: ParticipantId) -> Vec<String> {
        Vec::new()
    }
}
