//! In-memory host used by tests, demos and hosts without their own sheet store.

use std::collections::HashMap;

use super::{
    AttributeCategory, AttributeProvider, DamageSink, InjuryTier, ResourceLedger, ResourcePool,
    ResourceScope, names,
};
use crate::state::{DamageType, ParticipantId};

/// Minimal character sheet: ratings, resource tracks, form, styles and a
/// health track measured in levels of damage taken.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterSheet {
    ratings: HashMap<(AttributeCategory, String), i32>,
    resources: HashMap<ResourcePool, (i32, i32)>,
    pub form: Option<String>,
    pub styles: Vec<String>,
    pub damage_taken: u32,
}

impl CharacterSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rating(mut self, category: AttributeCategory, name: &str, value: i32) -> Self {
        self.set_rating(category, name, value);
        self
    }

    pub fn with_attribute(self, name: &str, value: i32) -> Self {
        self.with_rating(AttributeCategory::Attribute, name, value)
    }

    pub fn with_ability(self, name: &str, value: i32) -> Self {
        self.with_rating(AttributeCategory::Ability, name, value)
    }

    /// Shorthand for the physical trio plus Wits.
    pub fn with_physicals(self, strength: i32, dexterity: i32, stamina: i32, wits: i32) -> Self {
        self.with_attribute(names::STRENGTH, strength)
            .with_attribute(names::DEXTERITY, dexterity)
            .with_attribute(names::STAMINA, stamina)
            .with_attribute(names::WITS, wits)
    }

    pub fn with_resource(mut self, pool: ResourcePool, permanent: i32, current: i32) -> Self {
        self.resources.insert(pool, (permanent, current));
        self
    }

    pub fn with_form(mut self, form: &str) -> Self {
        self.form = Some(form.to_owned());
        self
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.styles.push(style.to_owned());
        self
    }

    pub fn with_damage_taken(mut self, levels: u32) -> Self {
        self.damage_taken = levels;
        self
    }

    pub fn set_rating(&mut self, category: AttributeCategory, name: &str, value: i32) {
        self.ratings
            .insert((category, name.to_ascii_lowercase()), value);
    }

    pub fn rating(&self, category: AttributeCategory, name: &str) -> i32 {
        self.ratings
            .get(&(category, name.to_ascii_lowercase()))
            .copied()
            .unwrap_or(0)
    }

    pub fn resource(&self, pool: ResourcePool, scope: ResourceScope) -> i32 {
        let (permanent, current) = self.resources.get(&pool).copied().unwrap_or((0, 0));
        match scope {
            ResourceScope::Permanent => permanent,
            ResourceScope::Current => current,
        }
    }

    /// Seven health levels; the eighth marks incapacitation and anything past
    /// it is death.
    pub fn injury_tier(&self) -> InjuryTier {
        match self.damage_taken {
            0 => InjuryTier::Healthy,
            1 => InjuryTier::Bruised,
            2 => InjuryTier::Hurt,
            3 => InjuryTier::Injured,
            4 => InjuryTier::Wounded,
            5 => InjuryTier::Mauled,
            6 => InjuryTier::Crippled,
            7 => InjuryTier::Incapacitated,
            _ => InjuryTier::Dead,
        }
    }
}

/// One call made to [`DamageSink::apply_damage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRecord {
    pub participant: ParticipantId,
    pub amount: u32,
    pub damage_type: DamageType,
    pub tier: InjuryTier,
}

/// Sheet store implementing every host collaborator.
#[derive(Clone, Debug, Default)]
pub struct InMemoryHost {
    sheets: HashMap<ParticipantId, CharacterSheet>,
    damage_log: Vec<DamageRecord>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_character(mut self, participant: ParticipantId, sheet: CharacterSheet) -> Self {
        self.insert(participant, sheet);
        self
    }

    pub fn insert(&mut self, participant: ParticipantId, sheet: CharacterSheet) {
        self.sheets.insert(participant, sheet);
    }

    pub fn sheet(&self, participant: ParticipantId) -> Option<&CharacterSheet> {
        self.sheets.get(&participant)
    }

    pub fn sheet_mut(&mut self, participant: ParticipantId) -> Option<&mut CharacterSheet> {
        self.sheets.get_mut(&participant)
    }

    /// Every damage application in call order.
    pub fn damage_log(&self) -> &[DamageRecord] {
        &self.damage_log
    }
}

impl AttributeProvider for InMemoryHost {
    fn get_attribute(
        &self,
        participant: ParticipantId,
        category: AttributeCategory,
        name: &str,
    ) -> i32 {
        self.sheets
            .get(&participant)
            .map(|sheet| sheet.rating(category, name))
            .unwrap_or(0)
    }

    fn current_form(&self, participant: ParticipantId) -> Option<String> {
        self.sheets.get(&participant)?.form.clone()
    }

    fn styles(&self, participant: ParticipantId) -> Vec<String> {
        self.sheets
            .get(&participant)
            .map(|sheet| sheet.styles.clone())
            .unwrap_or_default()
    }
}

impl ResourceLedger for InMemoryHost {
    fn get_resource(
        &self,
        participant: ParticipantId,
        pool: ResourcePool,
        scope: ResourceScope,
    ) -> i32 {
        self.sheets
            .get(&participant)
            .map(|sheet| sheet.resource(pool, scope))
            .unwrap_or(0)
    }

    fn deduct_resource(&mut self, participant: ParticipantId, pool: ResourcePool, amount: u32) {
        if let Some((_, current)) = self
            .sheets
            .get_mut(&participant)
            .and_then(|sheet| sheet.resources.get_mut(&pool))
        {
            *current = (*current - amount as i32).max(0);
        }
    }
}

impl DamageSink for InMemoryHost {
    fn apply_damage(
        &mut self,
        participant: ParticipantId,
        amount: u32,
        damage_type: DamageType,
    ) -> InjuryTier {
        let sheet = self.sheets.entry(participant).or_default();
        sheet.damage_taken += amount;
        let tier = sheet.injury_tier();
        self.damage_log.push(DamageRecord {
            participant,
            amount,
            damage_type,
            tier,
        });
        tier
    }

    fn injury_tier(&self, participant: ParticipantId) -> InjuryTier {
        self.sheets
            .get(&participant)
            .map(CharacterSheet::injury_tier)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ratings_read_as_zero() {
        let host = InMemoryHost::new().with_character(
            ParticipantId(1),
            CharacterSheet::new().with_attribute("Dexterity", 3),
        );
        let id = ParticipantId(1);
        assert_eq!(
            host.get_attribute(id, AttributeCategory::Attribute, "dexterity"),
            3
        );
        assert_eq!(host.get_attribute(id, AttributeCategory::Ability, "brawl"), 0);
        assert_eq!(
            host.get_attribute(ParticipantId(9), AttributeCategory::Attribute, "wits"),
            0
        );
    }

    #[test]
    fn damage_walks_the_health_track() {
        let mut host = InMemoryHost::new().with_character(ParticipantId(1), CharacterSheet::new());
        let id = ParticipantId(1);
        assert_eq!(host.apply_damage(id, 2, DamageType::Bashing), InjuryTier::Hurt);
        assert_eq!(host.apply_damage(id, 5, DamageType::Lethal), InjuryTier::Incapacitated);
        assert!(!host.can_fight(id));
        assert_eq!(host.damage_log().len(), 2);
    }

    #[test]
    fn deduction_saturates() {
        let mut host = InMemoryHost::new().with_character(
            ParticipantId(1),
            CharacterSheet::new().with_resource(ResourcePool::Rage, 3, 2),
        );
        host.deduct_resource(ParticipantId(1), ResourcePool::Rage, 5);
        assert_eq!(
            host.get_resource(ParticipantId(1), ResourcePool::Rage, ResourceScope::Current),
            0
        );
    }
}
