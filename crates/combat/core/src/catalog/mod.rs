//! Read-only registry of combat maneuvers.
//!
//! The catalog is built once (usually by the content loaders) and shared
//! immutably between sessions. Browsing helpers never mutate it.

mod effects;
mod maneuver;
mod requirements;

pub use effects::SpecialEffect;
pub use maneuver::{ManeuverCategory, ManeuverDefinition, ManeuverRole};
pub use requirements::{
    CombatantProfile, RatingRequirement, Requirements, ResourceRequirement, check_requirements,
};

use std::collections::BTreeMap;

use crate::error::CombatError;
use crate::state::{DamageType, ManeuverId};

/// Errors raised while assembling a catalog.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate maneuver id '{0}'")]
    DuplicateManeuver(ManeuverId),
}

/// Browsing filter for [`ManeuverCatalog::list_available`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogFilter {
    Category(ManeuverCategory),
    Style(String),
    DamageType(DamageType),
    Role(ManeuverRole),
}

impl CatalogFilter {
    pub fn matches(&self, maneuver: &ManeuverDefinition) -> bool {
        match self {
            Self::Category(category) => maneuver.category == *category,
            Self::Style(style) => maneuver
                .requirements
                .styles
                .iter()
                .any(|s| s.eq_ignore_ascii_case(style)),
            Self::DamageType(damage_type) => maneuver.damage_type == *damage_type,
            Self::Role(role) => maneuver.role == *role,
        }
    }
}

/// Maneuver definitions keyed by id, iterated in id order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManeuverCatalog {
    maneuvers: BTreeMap<ManeuverId, ManeuverDefinition>,
}

impl ManeuverCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a catalog, rejecting duplicate ids.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ManeuverDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut maneuvers = BTreeMap::new();
        for definition in definitions {
            let id = definition.id.clone();
            if maneuvers.insert(id.clone(), definition).is_some() {
                return Err(CatalogError::DuplicateManeuver(id));
            }
        }
        Ok(Self { maneuvers })
    }

    pub fn get(&self, id: &ManeuverId) -> Option<&ManeuverDefinition> {
        self.maneuvers.get(id)
    }

    /// Like [`get`](Self::get), but fails with `UnknownManeuver`.
    pub fn require(&self, id: &ManeuverId) -> Result<&ManeuverDefinition, CombatError> {
        self.get(id)
            .ok_or_else(|| CombatError::UnknownManeuver(id.clone()))
    }

    pub fn contains(&self, id: &ManeuverId) -> bool {
        self.maneuvers.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManeuverDefinition> {
        self.maneuvers.values()
    }

    pub fn len(&self) -> usize {
        self.maneuvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maneuvers.is_empty()
    }

    pub fn matching<'a>(
        &'a self,
        mut predicate: impl FnMut(&ManeuverDefinition) -> bool + 'a,
    ) -> impl Iterator<Item = &'a ManeuverDefinition> + 'a {
        self.iter().filter(move |m| predicate(*m))
    }

    pub fn by_category(&self, category: ManeuverCategory) -> Vec<&ManeuverDefinition> {
        self.matching(move |m| m.category == category).collect()
    }

    pub fn by_style(&self, style: &str) -> Vec<&ManeuverDefinition> {
        let filter = CatalogFilter::Style(style.to_owned());
        self.matching(move |m| filter.matches(m)).collect()
    }

    pub fn by_damage_type(&self, damage_type: DamageType) -> Vec<&ManeuverDefinition> {
        self.matching(move |m| m.damage_type == damage_type).collect()
    }

    /// Maneuvers whose requirements `profile` satisfies, optionally narrowed by
    /// `filter`.
    pub fn list_available(
        &self,
        profile: &CombatantProfile,
        filter: Option<&CatalogFilter>,
    ) -> Vec<&ManeuverDefinition> {
        self.iter()
            .filter(|m| filter.is_none_or(|f| f.matches(m)))
            .filter(|m| check_requirements(profile, m).is_ok())
            .collect()
    }

    pub fn list_by_category(&self, category: ManeuverCategory) -> Vec<&ManeuverDefinition> {
        self.by_category(category)
    }
}
