//! Spending the economy pool for bonus actions.
//!
//! A combatant may convert points of the configured pool into extra actions.
//! Each turn is capped at half the permanent rating (rounded up). Spending past
//! the speed limit, the lower of Dexterity and Wits, makes the next maneuver
//! harder.

use super::StatusEffectTracker;
use crate::config::CombatConfig;
use crate::env::{AttributeCategory, CombatHost, ResourceScope, names};
use crate::error::CombatError;
use crate::events::CombatEvent;
use crate::state::{Combatant, EffectPayload, StatusEffect, StatusEffectKind};

/// Result of a successful spend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendReport {
    pub amount: u32,
    pub remaining_actions: u32,
    /// Set when this spend crossed the speed limit.
    pub overexerted: bool,
    pub events: Vec<CombatEvent>,
}

pub struct ResourceEconomy<'a> {
    config: &'a CombatConfig,
}

impl<'a> ResourceEconomy<'a> {
    pub fn new(config: &'a CombatConfig) -> Self {
        Self { config }
    }

    /// `ceil(permanent / 2)`; a non-positive rating allows nothing.
    pub fn per_turn_cap(permanent: i32) -> u32 {
        if permanent <= 0 {
            0
        } else {
            (permanent as u32).div_ceil(2)
        }
    }

    /// Spends `amount` points for `amount` extra actions.
    ///
    /// Nothing is written unless every check passes.
    pub fn spend(
        &self,
        host: &mut dyn CombatHost,
        combatant: &mut Combatant,
        amount: u32,
    ) -> Result<SpendReport, CombatError> {
        let pool = self.config.economy_pool;
        let participant = combatant.participant;

        if amount == 0 {
            return Err(CombatError::RequirementsNotMet(format!(
                "spend at least one point of {pool}"
            )));
        }

        let current = host
            .get_resource(participant, pool, ResourceScope::Current)
            .max(0) as u32;
        if amount > current {
            return Err(CombatError::InsufficientResource {
                pool,
                requested: amount,
                available: current,
            });
        }

        let permanent = host.get_resource(participant, pool, ResourceScope::Permanent);
        let cap = Self::per_turn_cap(permanent);
        let spent = combatant.resource_spent_this_turn;
        if spent + amount > cap {
            return Err(CombatError::InsufficientResource {
                pool,
                requested: amount,
                available: cap.saturating_sub(spent),
            });
        }

        let dexterity =
            host.get_attribute(participant, AttributeCategory::Attribute, names::DEXTERITY);
        let wits = host.get_attribute(participant, AttributeCategory::Attribute, names::WITS);
        let speed_limit = dexterity.min(wits).max(0) as u32;

        host.deduct_resource(participant, pool, amount);
        combatant.remaining_actions += amount;
        combatant.resource_spent_this_turn = spent + amount;

        let mut events = vec![CombatEvent::ResourceSpent {
            participant,
            pool,
            amount,
            remaining_actions: combatant.remaining_actions,
        }];

        let overexerted = combatant.resource_spent_this_turn > speed_limit;
        if overexerted {
            let penalty = self.config.speed_limit_penalty;
            StatusEffectTracker::apply(
                combatant,
                StatusEffect::new(StatusEffectKind::Overexertion, 1)
                    .with_payload(EffectPayload::DifficultyPenalty(penalty)),
            );
            events.push(CombatEvent::SpeedLimitExceeded {
                participant,
                penalty,
            });
        }

        Ok(SpendReport {
            amount,
            remaining_actions: combatant.remaining_actions,
            overexerted,
            events,
        })
    }
}
