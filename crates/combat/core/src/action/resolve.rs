//! Opposed maneuver resolution.
//!
//! The attacker rolls `attribute + ability - health penalty` against the
//! maneuver's difficulty. A queued defense rolls against the same difficulty
//! and its successes are subtracted. Net successes feed the damage pool, which
//! is rolled successes-only and handed to the host's damage collaborator.
//!
//! Two overrides skip the normal damage path: a redirecting defense that beats
//! the attacker's raw successes turns the attack around, and a maneuver marked
//! self-damaging makes the attacker soak their own momentum on a miss.

use super::{PoolRoll, StatusEffectTracker, dice_pool, net_successes, roll_pool, roll_successes};
use crate::catalog::{ManeuverCatalog, ManeuverCategory, ManeuverDefinition};
use crate::config::CombatConfig;
use crate::env::{CombatEnv, CombatHost, InjuryTier, names};
use crate::error::CombatError;
use crate::events::CombatEvent;
use crate::state::{
    CombatFlags, CombatSession, DamageType, EffectPayload, ManeuverId, ParticipantId,
    StatusEffectKind,
};

/// Damage handed to the damage collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageDealt {
    pub target: ParticipantId,
    pub amount: u32,
    pub damage_type: DamageType,
    /// Tier reported back by the collaborator.
    pub tier: InjuryTier,
}

impl DamageDealt {
    pub fn incapacitated(&self) -> bool {
        !self.tier.can_fight()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolutionOutcome {
    /// No net successes. `self_damage` is set when a self-damaging maneuver
    /// failed its soak.
    Miss { self_damage: Option<DamageDealt> },
    /// Net successes above zero. `damage` is `None` when the damage roll came
    /// up empty.
    Hit {
        damage: Option<DamageDealt>,
        effects: Vec<StatusEffectKind>,
    },
    /// The defense turned the attack back on the attacker.
    Redirected { damage: Option<DamageDealt> },
}

/// Full record of one resolved maneuver.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManeuverResolution {
    pub maneuver: ManeuverId,
    pub attacker: ParticipantId,
    pub defender: ParticipantId,
    pub difficulty: u32,
    pub attack: PoolRoll,
    pub defense: Option<PoolRoll>,
    pub net_successes: u32,
    pub outcome: ResolutionOutcome,
}

impl ManeuverResolution {
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Hit { .. })
    }

    pub fn damage(&self) -> Option<&DamageDealt> {
        match &self.outcome {
            ResolutionOutcome::Miss { self_damage } => self_damage.as_ref(),
            ResolutionOutcome::Hit { damage, .. } | ResolutionOutcome::Redirected { damage } => {
                damage.as_ref()
            }
        }
    }

    /// Participant this resolution left unable to fight, if any.
    pub fn casualty(&self) -> Option<ParticipantId> {
        self.damage()
            .filter(|damage| damage.incapacitated())
            .map(|damage| damage.target)
    }
}

/// Stateless resolver over a catalog and rules configuration.
pub struct ActionResolver<'a> {
    catalog: &'a ManeuverCatalog,
    config: &'a CombatConfig,
}

impl<'a> ActionResolver<'a> {
    pub fn new(catalog: &'a ManeuverCatalog, config: &'a CombatConfig) -> Self {
        Self { catalog, config }
    }

    /// Dice lost to the participant's current injuries.
    pub fn health_penalty(&self, host: &dyn CombatHost, participant: ParticipantId) -> u32 {
        self.config
            .health_penalties
            .penalty(host.injury_tier(participant))
    }

    /// Resolves `maneuver` from `attacker` against `defender`.
    ///
    /// The caller has validated both combatants and the maneuver. Consumes the
    /// defender's queued defense and the attacker's pending speed-limit penalty;
    /// does not touch the attacker's action budget.
    pub fn resolve_maneuver(
        &self,
        env: &mut CombatEnv<'_>,
        session: &mut CombatSession,
        attacker: ParticipantId,
        defender: ParticipantId,
        maneuver: &ManeuverDefinition,
        events: &mut Vec<CombatEvent>,
    ) -> Result<ManeuverResolution, CombatError> {
        let sides = self.config.pool_die;

        events.push(CombatEvent::ManeuverDeclared {
            attacker,
            target: defender,
            maneuver: maneuver.id.clone(),
            name: maneuver.name.clone(),
        });

        let difficulty = self.difficulty(env, session, attacker, maneuver)?;

        let pool = dice_pool(
            env.attribute(attacker, &maneuver.attribute),
            env.ability(attacker, &maneuver.ability),
            self.health_penalty(&*env.host, attacker),
        );
        let attack = roll_pool(env.dice, pool, difficulty, sides);
        events.push(Self::rolled(attacker, &attack));

        let defense_maneuver = self.take_defense(session, defender);
        let defense = match defense_maneuver {
            Some(def) => {
                let pool_penalty = session
                    .combatant(defender)
                    .and_then(|c| c.status_effects.get(StatusEffectKind::DefensePenalty))
                    .map(|effect| match effect.payload {
                        EffectPayload::PoolPenalty(dice) => dice,
                        _ => 0,
                    })
                    .unwrap_or(0);
                let pool = dice_pool(
                    env.attribute(defender, &def.attribute),
                    env.ability(defender, &def.ability),
                    self.health_penalty(&*env.host, defender) + pool_penalty,
                );
                let roll = roll_pool(env.dice, pool, difficulty, sides);
                events.push(Self::rolled(defender, &roll));
                Some(roll)
            }
            None => None,
        };

        let resolution =
            |net_successes: u32, defense: Option<PoolRoll>, outcome: ResolutionOutcome| {
                ManeuverResolution {
                    maneuver: maneuver.id.clone(),
                    attacker,
                    defender,
                    difficulty,
                    attack: attack.clone(),
                    defense,
                    net_successes,
                    outcome,
                }
            };

        if let (Some(def), Some(roll)) = (defense_maneuver, defense.as_ref()) {
            if def.redirects() && roll.successes > attack.successes {
                let margin = (roll.successes - attack.successes) as u32;
                events.push(CombatEvent::Redirected {
                    defender,
                    attacker,
                    margin,
                });
                let strength = env.attribute(attacker, names::STRENGTH).max(0) as u32;
                let damage =
                    self.deal_damage(env, attacker, strength + margin, def.damage_type, events);
                tracing::debug!(
                    target: "combat::engine",
                    %attacker,
                    %defender,
                    margin,
                    "attack redirected"
                );
                return Ok(resolution(0, defense, ResolutionOutcome::Redirected { damage }));
            }
        }

        let defended = defense.as_ref().map_or(0, |roll| roll.successes);
        let net = net_successes(attack.successes, defended);

        if net == 0 {
            events.push(CombatEvent::Missed {
                attacker,
                target: defender,
            });
            let self_damage = if maneuver.self_damage_on_miss() {
                self.soak_momentum(env, attacker, events)
            } else {
                None
            };
            return Ok(resolution(0, defense, ResolutionOutcome::Miss { self_damage }));
        }

        events.push(CombatEvent::Hit {
            attacker,
            target: defender,
            net_successes: net,
        });

        let damage_pool = self.damage_pool(env, attacker, maneuver, net);
        let damage = self.deal_damage(env, defender, damage_pool, maneuver.damage_type, events);

        let mut effects = Vec::new();
        if let Some(target) = session.combatant_mut(defender) {
            for effect in maneuver.status_effects() {
                StatusEffectTracker::apply(target, effect);
                events.push(CombatEvent::EffectApplied {
                    participant: defender,
                    kind: effect.kind,
                    turns: effect.remaining,
                });
                effects.push(effect.kind);
            }
        }

        tracing::debug!(
            target: "combat::engine",
            %attacker,
            %defender,
            maneuver = %maneuver.id,
            net,
            damage = damage.map_or(0, |d| d.amount),
            "maneuver hit"
        );

        Ok(resolution(net, defense, ResolutionOutcome::Hit { damage, effects }))
    }

    /// Base difficulty plus maneuver, equipment and condition modifiers,
    /// clamped to the configured range.
    fn difficulty(
        &self,
        env: &CombatEnv<'_>,
        session: &mut CombatSession,
        attacker: ParticipantId,
        maneuver: &ManeuverDefinition,
    ) -> Result<u32, CombatError> {
        let config = self.config;
        let mut raw = config.base_difficulty as i32 + maneuver.difficulty_mod;
        if maneuver.category == ManeuverCategory::Weapon {
            raw += env.equipment(attacker, names::EQUIPMENT_DIFFICULTY);
        }

        let combatant = session.combatant_mut(attacker).ok_or_else(|| {
            CombatError::internal(format!("attacker {attacker} missing from session"))
        })?;
        if combatant.has_flag(CombatFlags::KNOCKED_DOWN) {
            raw += config.knockdown_penalty as i32;
        }
        if combatant.has_flag(CombatFlags::BLINDED) {
            raw += config.blinded_penalty as i32;
        }
        if let Some(effect) = StatusEffectTracker::consume(combatant, StatusEffectKind::Overexertion)
        {
            if let EffectPayload::DifficultyPenalty(penalty) = effect.payload {
                raw += penalty as i32;
            }
        }

        Ok(config.clamp_difficulty(raw))
    }

    /// Takes the defender's queued defense. An immobilized defender cannot
    /// defend and keeps the defense queued.
    fn take_defense(
        &self,
        session: &mut CombatSession,
        defender: ParticipantId,
    ) -> Option<&'a ManeuverDefinition> {
        let combatant = session.combatant_mut(defender)?;
        if combatant.has_flag(CombatFlags::IMMOBILIZED) {
            return None;
        }
        let id = combatant.defense_action.take()?;
        self.catalog.get(&id)
    }

    fn damage_pool(
        &self,
        env: &CombatEnv<'_>,
        attacker: ParticipantId,
        maneuver: &ManeuverDefinition,
        net: u32,
    ) -> u32 {
        let base = if maneuver.uses_strength_damage() {
            env.attribute(attacker, names::STRENGTH)
        } else {
            self.config.fixed_base_damage as i32
        };
        let (equipment_damage, equipment_dice) = if maneuver.category == ManeuverCategory::Weapon {
            (
                env.equipment(attacker, names::EQUIPMENT_DAMAGE),
                env.equipment(attacker, names::EQUIPMENT_EXTRA_DICE),
            )
        } else {
            (0, 0)
        };

        let net = net as i32;
        let mut pool = base
            + maneuver.damage_mod
            + equipment_damage
            + (net - 1)
            + maneuver.extra_damage_dice as i32
            + equipment_dice;
        if maneuver.success_scaled() {
            pool += net;
        }
        pool.max(0) as u32
    }

    fn deal_damage(
        &self,
        env: &mut CombatEnv<'_>,
        target: ParticipantId,
        pool: u32,
        damage_type: DamageType,
        events: &mut Vec<CombatEvent>,
    ) -> Option<DamageDealt> {
        let (_, amount) = roll_successes(
            env.dice,
            pool,
            self.config.damage_difficulty,
            self.config.pool_die,
        );
        if amount == 0 {
            events.push(CombatEvent::NoDamage {
                participant: target,
            });
            return None;
        }

        let tier = env.host.apply_damage(target, amount, damage_type);
        events.push(CombatEvent::DamageApplied {
            participant: target,
            amount,
            damage_type,
            tier,
        });
        Some(DamageDealt {
            target,
            amount,
            damage_type,
            tier,
        })
    }

    /// Stamina soak after a missed self-damaging maneuver. No successes means
    /// `max(1, Strength / 2)` bashing to the attacker.
    fn soak_momentum(
        &self,
        env: &mut CombatEnv<'_>,
        attacker: ParticipantId,
        events: &mut Vec<CombatEvent>,
    ) -> Option<DamageDealt> {
        let stamina = env.attribute(attacker, names::STAMINA).max(0) as u32;
        let (_, soaked) = roll_successes(
            env.dice,
            stamina,
            self.config.soak_difficulty,
            self.config.pool_die,
        );
        if soaked > 0 {
            return None;
        }

        let strength = env.attribute(attacker, names::STRENGTH).max(0) as u32;
        let amount = (strength / 2).max(1);
        let tier = env.host.apply_damage(attacker, amount, DamageType::Bashing);
        events.push(CombatEvent::DamageApplied {
            participant: attacker,
            amount,
            damage_type: DamageType::Bashing,
            tier,
        });
        Some(DamageDealt {
            target: attacker,
            amount,
            damage_type: DamageType::Bashing,
            tier,
        })
    }

    fn rolled(participant: ParticipantId, roll: &PoolRoll) -> CombatEvent {
        CombatEvent::PoolRolled {
            participant,
            faces: roll.faces.clone(),
            difficulty: roll.difficulty,
            successes: roll.successes,
            botch: roll.is_botch(),
        }
    }
}
