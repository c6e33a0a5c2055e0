//! Maneuver prerequisites and the stats they are checked against.

use std::collections::BTreeMap;

use super::ManeuverDefinition;
use crate::config::CombatConfig;
use crate::env::{AttributeCategory, CombatHost, ResourcePool, ResourceScope};
use crate::state::ParticipantId;

/// Minimum value of a single rating.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingRequirement {
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: AttributeCategory,
    pub name: String,
    pub minimum: i32,
}

/// Minimum current balance of a resource pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceRequirement {
    pub pool: ResourcePool,
    pub minimum: i32,
}

/// Everything a combatant must satisfy to use a maneuver. All parts must hold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Requirements {
    pub min_ratings: Vec<RatingRequirement>,
    pub min_resource: Option<ResourceRequirement>,
    /// Allowed forms. Empty means any form (or none).
    pub forms: Vec<String>,
    /// Allowed styles. Empty or containing `"any"` means no style is needed.
    pub styles: Vec<String>,
}

impl Requirements {
    pub fn is_empty(&self) -> bool {
        self.min_ratings.is_empty()
            && self.min_resource.is_none()
            && self.forms.is_empty()
            && self.styles.is_empty()
    }

    fn any_style(&self) -> bool {
        self.styles.is_empty()
            || self
                .styles
                .iter()
                .any(|s| s.eq_ignore_ascii_case(CombatConfig::ANY_STYLE))
    }
}

/// Snapshot of the stats requirement checks read.
///
/// Ratings not present in the snapshot read as 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatantProfile {
    ratings: BTreeMap<(AttributeCategory, String), i32>,
    resources: BTreeMap<ResourcePool, i32>,
    pub form: Option<String>,
    pub styles: Vec<String>,
}

impl CombatantProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every stat referenced by `maneuvers` from the host.
    pub fn gather<'m>(
        host: &dyn CombatHost,
        participant: ParticipantId,
        maneuvers: impl IntoIterator<Item = &'m ManeuverDefinition>,
    ) -> Self {
        let mut profile = Self {
            form: host.current_form(participant),
            styles: host.styles(participant),
            ..Self::default()
        };

        for maneuver in maneuvers {
            for req in &maneuver.requirements.min_ratings {
                let key = (req.category, req.name.to_ascii_lowercase());
                if !profile.ratings.contains_key(&key) {
                    let value = host.get_attribute(participant, req.category, &req.name);
                    profile.ratings.insert(key, value);
                }
            }
            if let Some(req) = maneuver.requirements.min_resource {
                profile.resources.entry(req.pool).or_insert_with(|| {
                    host.get_resource(participant, req.pool, ResourceScope::Current)
                });
            }
        }

        profile
    }

    pub fn with_rating(mut self, category: AttributeCategory, name: &str, value: i32) -> Self {
        self.ratings
            .insert((category, name.to_ascii_lowercase()), value);
        self
    }

    pub fn with_resource(mut self, pool: ResourcePool, current: i32) -> Self {
        self.resources.insert(pool, current);
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

    pub fn rating(&self, category: AttributeCategory, name: &str) -> i32 {
        self.ratings
            .get(&(category, name.to_ascii_lowercase()))
            .copied()
            .unwrap_or(0)
    }

    pub fn resource(&self, pool: ResourcePool) -> i32 {
        self.resources.get(&pool).copied().unwrap_or(0)
    }
}

/// Checks every prerequisite of `maneuver`. The error names the first one that
/// fails.
pub fn check_requirements(
    profile: &CombatantProfile,
    maneuver: &ManeuverDefinition,
) -> Result<(), String> {
    let reqs = &maneuver.requirements;

    for req in &reqs.min_ratings {
        let have = profile.rating(req.category, &req.name);
        if have < req.minimum {
            return Err(format!(
                "{} requires {} {} (have {have})",
                maneuver.name, req.name, req.minimum
            ));
        }
    }

    if let Some(req) = reqs.min_resource {
        let have = profile.resource(req.pool);
        if have < req.minimum {
            return Err(format!(
                "{} requires {} {} (have {have})",
                maneuver.name, req.minimum, req.pool
            ));
        }
    }

    if !reqs.forms.is_empty() {
        let allowed = profile
            .form
            .as_deref()
            .is_some_and(|form| reqs.forms.iter().any(|f| f.eq_ignore_ascii_case(form)));
        if !allowed {
            return Err(format!(
                "{} can only be used in {} form",
                maneuver.name,
                reqs.forms.join(" or ")
            ));
        }
    }

    if !reqs.any_style() {
        let trained = profile
            .styles
            .iter()
            .any(|have| reqs.styles.iter().any(|s| s.eq_ignore_ascii_case(have)));
        if !trained {
            return Err(format!(
                "{} requires training in {}",
                maneuver.name,
                reqs.styles.join(" or ")
            ));
        }
    }

    Ok(())
}
