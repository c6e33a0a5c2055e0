//! Session lifecycle and turn scheduling.

use std::cmp::Reverse;

use super::CombatEngine;
use crate::action::StatusEffectTracker;
use crate::env::{CombatEnv, names};
use crate::error::CombatError;
use crate::events::{CombatEvent, EndReason, RemovalReason};
use crate::state::{CombatFlags, Combatant, InitiativeRoll, ParticipantId, SessionPhase};

/// Upper bound on consecutive skipped turns before the next turn starts anyway.
const MAX_SKIPPED_TURNS: usize = 64;

impl CombatEngine<'_> {
    /// Starts combat with every candidate able to fight.
    ///
    /// `initiator` is registered first when eligible; the rest follow in the
    /// given order. Leaves the session in `RollingInitiative`.
    pub fn begin(
        &mut self,
        env: &CombatEnv<'_>,
        initiator: ParticipantId,
        candidates: &[ParticipantId],
    ) -> Result<Vec<CombatEvent>, CombatError> {
        if self.session.active {
            return Err(CombatError::SessionAlreadyActive {
                location: self.session.location,
            });
        }

        let mut eligible: Vec<ParticipantId> = Vec::with_capacity(candidates.len() + 1);
        for &participant in std::iter::once(&initiator).chain(candidates) {
            if !eligible.contains(&participant) && env.host.can_fight(participant) {
                eligible.push(participant);
            }
        }
        if eligible.is_empty() {
            return Err(CombatError::NoEligibleParticipants {
                location: self.session.location,
            });
        }

        self.session.active = true;
        self.session.phase = SessionPhase::Forming;
        self.session.turn_number = 0;
        self.session.current_turn = 0;
        for &participant in &eligible {
            self.session.register(participant);
        }
        self.events.push(CombatEvent::CombatBegun {
            initiator,
            combatants: eligible,
        });
        self.session.phase = SessionPhase::RollingInitiative;

        tracing::info!(
            target: "combat::engine",
            session = %self.session.id,
            location = %self.session.location,
            combatants = self.session.len(),
            "combat begun"
        );

        self.post_validate()?;
        Ok(self.take_events())
    }

    /// Rolls a fresh initiative round and starts the first turn.
    ///
    /// A session without combatants is left untouched.
    pub fn roll_initiative(
        &mut self,
        env: &mut CombatEnv<'_>,
    ) -> Result<Vec<CombatEvent>, CombatError> {
        if self.session.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_active()?;

        self.roll_round(env);
        self.start_turn(env)?;
        self.post_validate()?;
        Ok(self.take_events())
    }

    /// Hands the turn to the next combatant.
    pub fn advance_turn(&mut self, env: &mut CombatEnv<'_>) -> Result<(), CombatError> {
        let Some(actor) = self.session.current_actor() else {
            return Ok(());
        };
        if self.step_past(env, actor) {
            self.start_turn(env)?;
        }
        Ok(())
    }

    /// Adds a participant to a running session.
    ///
    /// Mid-round arrivals roll initiative immediately and act after everyone
    /// already in the order. Participants unable to fight are turned away.
    pub fn add_combatant(
        &mut self,
        env: &mut CombatEnv<'_>,
        participant: ParticipantId,
    ) -> Result<Vec<CombatEvent>, CombatError> {
        self.ensure_active()?;
        if self.session.contains(participant) {
            return Err(CombatError::AlreadyInCombat { participant });
        }
        if !env.host.can_fight(participant) {
            return Err(CombatError::RequirementsNotMet(format!(
                "{participant} is unable to fight"
            )));
        }

        self.session.register(participant);
        self.events
            .push(CombatEvent::CombatantJoined { participant });

        if self.session.phase == SessionPhase::Acting {
            let die = env.dice.roll_die(self.config.initiative_die);
            let dexterity = env.attribute(participant, names::DEXTERITY);
            let wits = env.attribute(participant, names::WITS);
            let combatant = self.combatant_mut(participant)?;
            let roll = InitiativeRoll {
                die,
                dexterity,
                wits,
                modifier: combatant.initiative_modifier,
            };
            combatant.initiative = Some(roll);
            combatant.reset_for_round();
            self.events
                .push(CombatEvent::InitiativeRolled { participant, roll });
        }

        tracing::debug!(
            target: "combat::engine",
            session = %self.session.id,
            %participant,
            "combatant added"
        );

        self.post_validate()?;
        Ok(self.take_events())
    }

    /// Removes a combatant, keeping `current_turn` valid.
    ///
    /// Ends the session once one or no combatants remain. Removing the
    /// combatant whose turn it is passes the turn to whoever followed them.
    pub fn remove_combatant(
        &mut self,
        env: &mut CombatEnv<'_>,
        participant: ParticipantId,
        reason: RemovalReason,
    ) -> Result<Vec<CombatEvent>, CombatError> {
        self.ensure_active()?;
        if !self.session.contains(participant) {
            return Err(CombatError::NotInCombat { participant });
        }

        let was_current = self.session.current_actor() == Some(participant);
        self.drop_combatant(participant, reason);
        if was_current {
            self.resume_after_removal(env)?;
        }

        self.post_validate()?;
        Ok(self.take_events())
    }

    /// Ends the session, clearing every combatant and their conditions.
    pub fn end(&mut self, reason: EndReason) -> Result<Vec<CombatEvent>, CombatError> {
        self.ensure_active()?;
        self.finish(reason);
        Ok(self.take_events())
    }

    /// Rolls initiative for everyone and sorts the order. Ties go to the
    /// earlier registration.
    pub(super) fn roll_round(&mut self, env: &mut CombatEnv<'_>) {
        let initiative_die = self.config.initiative_die;

        for participant in self.session.by_registration() {
            let die = env.dice.roll_die(initiative_die);
            let dexterity = env.attribute(participant, names::DEXTERITY);
            let wits = env.attribute(participant, names::WITS);
            let Some(combatant) = self.session.combatant_mut(participant) else {
                continue;
            };
            let roll = InitiativeRoll {
                die,
                dexterity,
                wits,
                modifier: combatant.initiative_modifier,
            };
            combatant.initiative = Some(roll);
            combatant.reset_for_round();
            self.events
                .push(CombatEvent::InitiativeRolled { participant, roll });
        }

        let combatants = &self.session.combatants;
        self.session.turn_order.sort_by_key(|id| {
            combatants
                .get(id)
                .map(|c: &Combatant| (Reverse(c.initiative_total()), c.registration))
                .unwrap_or((Reverse(i32::MIN), u32::MAX))
        });

        self.session.turn_number += 1;
        self.session.current_turn = 0;
        self.session.phase = SessionPhase::Acting;
        self.events.push(CombatEvent::RoundStarted {
            round: self.session.turn_number,
            order: self.session.turn_order.clone(),
        });

        tracing::debug!(
            target: "combat::engine",
            session = %self.session.id,
            round = self.session.turn_number,
            order = ?self.session.turn_order,
            "initiative rolled"
        );
    }

    /// Announces the current turn, skipping stunned combatants.
    pub(super) fn start_turn(&mut self, env: &mut CombatEnv<'_>) -> Result<(), CombatError> {
        let mut skipped = 0;
        loop {
            let Some(actor) = self.session.current_actor() else {
                return Ok(());
            };
            let combatant = self.combatant_mut(actor)?;
            let stunned = combatant.has_flag(CombatFlags::STUNNED);

            if !stunned || skipped >= MAX_SKIPPED_TURNS {
                if combatant.remaining_actions == 0 {
                    combatant.remaining_actions = 1;
                }
                let actions = combatant.remaining_actions;
                self.events.push(CombatEvent::TurnStarted {
                    participant: actor,
                    actions,
                });
                return Ok(());
            }

            skipped += 1;
            self.events.push(CombatEvent::TurnSkipped {
                participant: actor,
                cause: crate::state::StatusEffectKind::Stun,
            });
            if !self.step_past(env, actor) {
                return Ok(());
            }
        }
    }

    /// Closes `actor`'s turn and moves the index on, rolling a new round when
    /// the order is exhausted. Returns `false` if the session ended.
    fn step_past(&mut self, env: &mut CombatEnv<'_>, actor: ParticipantId) -> bool {
        let removed = self.close_turn(env, actor);
        if !self.session.active {
            return false;
        }
        if !removed {
            self.session.current_turn += 1;
        }
        if self.session.current_turn >= self.session.turn_order.len() {
            self.roll_round(env);
        }
        true
    }

    /// End-of-turn bookkeeping for the acting combatant only: ticks status
    /// effects and applies periodic damage. Returns `true` if the combatant was
    /// incapacitated and removed.
    fn close_turn(&mut self, env: &mut CombatEnv<'_>, actor: ParticipantId) -> bool {
        let Some(combatant) = self.session.combatant_mut(actor) else {
            return false;
        };
        combatant.remaining_actions = 0;
        let report = StatusEffectTracker::decrement_all(combatant);

        let mut incapacitated = false;
        for damage in &report.periodic {
            let tier = env
                .host
                .apply_damage(actor, damage.amount, damage.damage_type);
            self.events.push(CombatEvent::DamageApplied {
                participant: actor,
                amount: damage.amount,
                damage_type: damage.damage_type,
                tier,
            });
            incapacitated |= !tier.can_fight();
        }
        for &kind in &report.expired {
            self.events.push(CombatEvent::EffectExpired {
                participant: actor,
                kind,
            });
        }

        if incapacitated {
            self.drop_combatant(actor, RemovalReason::Incapacitated);
        }
        incapacitated
    }

    /// Continues play after the acting combatant left mid-turn.
    pub(super) fn resume_after_removal(
        &mut self,
        env: &mut CombatEnv<'_>,
    ) -> Result<(), CombatError> {
        if !self.session.active || self.session.phase != SessionPhase::Acting {
            return Ok(());
        }
        if self.session.current_turn >= self.session.turn_order.len() {
            self.roll_round(env);
        }
        self.start_turn(env)
    }

    /// Detaches a combatant and ends the session at one or fewer.
    pub(super) fn drop_combatant(&mut self, participant: ParticipantId, reason: RemovalReason) {
        if self.session.detach(participant).is_none() {
            return;
        }
        self.events.push(CombatEvent::CombatantLeft {
            participant,
            reason,
        });
        tracing::debug!(
            target: "combat::engine",
            session = %self.session.id,
            %participant,
            %reason,
            "combatant removed"
        );

        if self.session.len() <= 1 {
            self.finish(EndReason::TooFewCombatants);
        }
    }

    fn finish(&mut self, reason: EndReason) {
        self.session.phase = SessionPhase::Ending;
        self.events.push(CombatEvent::CombatEnded { reason });

        for combatant in self.session.combatants.values_mut() {
            combatant.clear_conditions();
        }
        self.session.combatants.clear();
        self.session.turn_order.clear();
        self.session.current_turn = 0;
        self.session.active = false;
        self.session.phase = SessionPhase::Inactive;

        tracing::info!(
            target: "combat::engine",
            session = %self.session.id,
            location = %self.session.location,
            ?reason,
            "combat ended"
        );
    }
}
