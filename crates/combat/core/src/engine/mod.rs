//! Session state machine and action dispatch.
//!
//! The [`CombatEngine`] is the only writer of a [`CombatSession`]. Every entry
//! point validates before it writes, checks the session invariants afterwards,
//! and returns the [`CombatEvent`]s describing what changed.
//!
//! Callers that must survive internal failures run the engine against a clone
//! and keep the clone only on success (see
//! [`SessionRegistry`](crate::registry::SessionRegistry)).

mod turns;
mod validation;

use crate::action::{ActionResolver, CombatAction, ManeuverResolution, ResourceEconomy};
use crate::catalog::ManeuverCatalog;
use crate::config::CombatConfig;
use crate::env::CombatEnv;
use crate::error::CombatError;
use crate::events::{CombatEvent, RemovalReason};
use crate::state::{CombatSession, ManeuverId, ParticipantId};

/// What a processed action produced.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub events: Vec<CombatEvent>,
    /// Set for attacks.
    pub resolution: Option<ManeuverResolution>,
}

pub struct CombatEngine<'a> {
    session: &'a mut CombatSession,
    catalog: &'a ManeuverCatalog,
    config: &'a CombatConfig,
    events: Vec<CombatEvent>,
}

impl<'a> CombatEngine<'a> {
    pub fn new(
        session: &'a mut CombatSession,
        catalog: &'a ManeuverCatalog,
        config: &'a CombatConfig,
    ) -> Self {
        Self {
            session,
            catalog,
            config,
            events: Vec::new(),
        }
    }

    pub fn session(&self) -> &CombatSession {
        self.session
    }

    /// Handles an action submitted by `actor`.
    ///
    /// Defense-setting is accepted from any combatant at any time. Everything
    /// else must come from the combatant whose turn it is.
    pub fn process_action(
        &mut self,
        env: &mut CombatEnv<'_>,
        actor: ParticipantId,
        action: &CombatAction,
    ) -> Result<ActionOutcome, CombatError> {
        self.ensure_active()?;
        if !self.session.contains(actor) {
            return Err(CombatError::NotInCombat { participant: actor });
        }
        if action.requires_turn() {
            validation::ensure_turn(self.session, actor)?;
        }

        let resolution = match action {
            CombatAction::Defense { maneuver } => {
                self.queue_defense(env, actor, maneuver)?;
                None
            }
            CombatAction::Attack { maneuver, target } => {
                Some(self.attack(env, actor, maneuver, *target)?)
            }
            CombatAction::SpendResource { amount } => {
                self.spend(env, actor, *amount)?;
                None
            }
            CombatAction::Pass => {
                self.forfeit(env, actor, 1)?;
                None
            }
            CombatAction::EndTurn => {
                let remaining = self
                    .session
                    .combatant(actor)
                    .map_or(0, |c| c.remaining_actions);
                self.forfeit(env, actor, remaining.max(1))?;
                None
            }
        };

        self.post_validate()?;
        tracing::debug!(
            target: "combat::engine",
            session = %self.session.id,
            %actor,
            action = action.as_str(),
            events = self.events.len(),
            "action processed"
        );

        Ok(ActionOutcome {
            events: self.take_events(),
            resolution,
        })
    }

    fn queue_defense(
        &mut self,
        env: &CombatEnv<'_>,
        actor: ParticipantId,
        maneuver: &ManeuverId,
    ) -> Result<(), CombatError> {
        let definition = validation::validate_defense(self.catalog, &*env.host, actor, maneuver)?;
        let combatant = self.combatant_mut(actor)?;
        combatant.defense_action = Some(definition.id.clone());
        self.events.push(CombatEvent::DefenseQueued {
            participant: actor,
            maneuver: definition.id.clone(),
        });
        Ok(())
    }

    fn attack(
        &mut self,
        env: &mut CombatEnv<'_>,
        actor: ParticipantId,
        maneuver: &ManeuverId,
        target: Option<ParticipantId>,
    ) -> Result<ManeuverResolution, CombatError> {
        let (definition, target) = validation::validate_attack(
            self.session,
            self.catalog,
            &*env.host,
            actor,
            maneuver,
            target,
        )?;

        self.combatant_mut(actor)?.selected_action = Some(definition.id.clone());

        let resolver = ActionResolver::new(self.catalog, self.config);
        let resolution = resolver.resolve_maneuver(
            env,
            self.session,
            actor,
            target,
            definition,
            &mut self.events,
        )?;

        let combatant = self.combatant_mut(actor)?;
        combatant.remaining_actions = combatant.remaining_actions.saturating_sub(1);
        let remaining = combatant.remaining_actions;

        if let Some(casualty) = resolution.casualty() {
            let was_current = self.session.current_actor() == Some(casualty);
            self.drop_combatant(casualty, RemovalReason::Incapacitated);
            if was_current {
                self.resume_after_removal(env)?;
                return Ok(resolution);
            }
        }

        if self.session.active && remaining == 0 {
            self.advance_turn(env)?;
        }
        Ok(resolution)
    }

    fn spend(
        &mut self,
        env: &mut CombatEnv<'_>,
        actor: ParticipantId,
        amount: u32,
    ) -> Result<(), CombatError> {
        let economy = ResourceEconomy::new(self.config);
        let combatant = self
            .session
            .combatants
            .get_mut(&actor)
            .ok_or(CombatError::NotInCombat { participant: actor })?;
        let report = economy.spend(&mut *env.host, combatant, amount)?;
        self.events.extend(report.events);
        Ok(())
    }

    fn forfeit(
        &mut self,
        env: &mut CombatEnv<'_>,
        actor: ParticipantId,
        actions: u32,
    ) -> Result<(), CombatError> {
        let combatant = self.combatant_mut(actor)?;
        let forfeited = actions.min(combatant.remaining_actions);
        combatant.remaining_actions -= forfeited;
        let remaining = combatant.remaining_actions;

        self.events.push(CombatEvent::ActionForfeited {
            participant: actor,
            actions: forfeited,
        });
        if remaining == 0 {
            self.advance_turn(env)?;
        }
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), CombatError> {
        if !self.session.active {
            return Err(CombatError::SessionInactive {
                location: self.session.location,
            });
        }
        Ok(())
    }

    fn combatant_mut(
        &mut self,
        participant: ParticipantId,
    ) -> Result<&mut crate::state::Combatant, CombatError> {
        self.session
            .combatant_mut(participant)
            .ok_or(CombatError::NotInCombat { participant })
    }

    /// Checks the session invariants after a write.
    fn post_validate(&self) -> Result<(), CombatError> {
        if !self.session.is_consistent() {
            tracing::error!(
                target: "combat::engine",
                session = %self.session.id,
                turn_order = ?self.session.turn_order,
                current_turn = self.session.current_turn,
                "session invariants violated"
            );
            return Err(CombatError::internal("turn order out of sync with combatants"));
        }
        Ok(())
    }

    fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ManeuverCategory, ManeuverDefinition, SpecialEffect};
    use crate::env::{
        CharacterSheet, InMemoryHost, ResourceLedger, ResourcePool, ResourceScope, ScriptedDice,
    };
    use crate::error::CombatErrorKind;
    use crate::events::EndReason;
    use crate::state::{
        DamageType, EffectPayload, LocationId, SessionId, SessionPhase, StatusEffect,
        StatusEffectKind,
    };

    const A: ParticipantId = ParticipantId(1);
    const B: ParticipantId = ParticipantId(2);
    const C: ParticipantId = ParticipantId(3);

    struct Harness {
        session: CombatSession,
        catalog: ManeuverCatalog,
        config: CombatConfig,
        host: InMemoryHost,
        dice: ScriptedDice,
    }

    impl Harness {
        fn new() -> Self {
            let catalog = ManeuverCatalog::from_definitions([
                ManeuverDefinition::attack("punch", "Punch", "dexterity", "brawl"),
                ManeuverDefinition::attack("slash", "Slash", "dexterity", "melee")
                    .with_category(ManeuverCategory::Weapon)
                    .with_damage(1, DamageType::Lethal),
                ManeuverDefinition::attack("stunning_blow", "Stunning Blow", "strength", "brawl")
                    .with_effect(SpecialEffect::Stun { turns: 1 }),
                ManeuverDefinition::defense("block", "Block", "dexterity", "brawl"),
            ])
            .unwrap();
            let host = InMemoryHost::new()
                .with_character(
                    A,
                    CharacterSheet::new()
                        .with_physicals(2, 3, 2, 2)
                        .with_ability("brawl", 2)
                        .with_resource(ResourcePool::Rage, 4, 4),
                )
                .with_character(
                    B,
                    CharacterSheet::new()
                        .with_physicals(2, 1, 2, 1)
                        .with_ability("brawl", 1),
                )
                .with_character(C, CharacterSheet::new().with_physicals(1, 1, 1, 0));
            Self {
                session: CombatSession::new(SessionId(1), LocationId(7)),
                catalog,
                config: CombatConfig::default(),
                host,
                dice: ScriptedDice::new([]),
            }
        }

        fn rig(&mut self, faces: &[u32]) -> &mut Self {
            self.dice.push(faces.iter().copied());
            self
        }

        fn start(&mut self, participants: &[ParticipantId]) -> Vec<CombatEvent> {
            let mut env = CombatEnv::new(&mut self.host, &mut self.dice);
            let mut engine = CombatEngine::new(&mut self.session, &self.catalog, &self.config);
            let mut events = engine.begin(&env, participants[0], participants).unwrap();
            events.extend(engine.roll_initiative(&mut env).unwrap());
            events
        }

        fn act(
            &mut self,
            actor: ParticipantId,
            action: CombatAction,
        ) -> Result<ActionOutcome, CombatError> {
            let mut env = CombatEnv::new(&mut self.host, &mut self.dice);
            CombatEngine::new(&mut self.session, &self.catalog, &self.config)
                .process_action(&mut env, actor, &action)
        }

        fn remove(&mut self, participant: ParticipantId) -> Vec<CombatEvent> {
            let mut env = CombatEnv::new(&mut self.host, &mut self.dice);
            CombatEngine::new(&mut self.session, &self.catalog, &self.config)
                .remove_combatant(&mut env, participant, RemovalReason::Fled)
                .unwrap()
        }

        fn add(&mut self, participant: ParticipantId) -> Result<Vec<CombatEvent>, CombatError> {
            let mut env = CombatEnv::new(&mut self.host, &mut self.dice);
            CombatEngine::new(&mut self.session, &self.catalog, &self.config)
                .add_combatant(&mut env, participant)
        }

        fn stun(&mut self, participant: ParticipantId) {
            self.session
                .combatant_mut(participant)
                .unwrap()
                .apply_status(StatusEffect::new(StatusEffectKind::Stun, 1));
        }
    }

    #[test]
    fn initiative_orders_by_total() {
        let mut h = Harness::new();
        let events = h.rig(&[7, 2]).start(&[A, B]);

        assert_eq!(h.session.turn_order, vec![A, B]);
        assert_eq!(h.session.combatant(A).unwrap().initiative_total(), 12);
        assert_eq!(h.session.combatant(B).unwrap().initiative_total(), 4);
        assert_eq!(h.session.current_actor(), Some(A));
        assert_eq!(h.session.phase, SessionPhase::Acting);
        assert_eq!(h.session.turn_number, 1);
        assert!(events.contains(&CombatEvent::TurnStarted {
            participant: A,
            actions: 1
        }));
    }

    #[test]
    fn initiative_ties_go_to_earlier_registration() {
        let mut h = Harness::new();
        // B: 10 + 1 + 1 = 12, A: 7 + 3 + 2 = 12
        h.rig(&[7, 10]).start(&[A, B]);
        assert_eq!(h.session.turn_order, vec![A, B]);

        let mut h = Harness::new();
        h.rig(&[10, 7]).start(&[B, A]);
        assert_eq!(h.session.turn_order, vec![B, A]);
    }

    #[test]
    fn begin_requires_someone_able_to_fight() {
        let mut h = Harness::new();
        h.host.sheet_mut(A).unwrap().damage_taken = 7;
        let env = CombatEnv::new(&mut h.host, &mut h.dice);
        let err = CombatEngine::new(&mut h.session, &h.catalog, &h.config)
            .begin(&env, A, &[A])
            .unwrap_err();
        assert_eq!(err.kind(), CombatErrorKind::NoEligibleParticipants);
        assert!(!h.session.active);
        assert!(h.session.is_empty());
    }

    #[test]
    fn second_begin_is_rejected() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        let before = h.session.clone();
        let env = CombatEnv::new(&mut h.host, &mut h.dice);
        let err = CombatEngine::new(&mut h.session, &h.catalog, &h.config)
            .begin(&env, C, &[C])
            .unwrap_err();
        assert_eq!(err.kind(), CombatErrorKind::SessionAlreadyActive);
        assert_eq!(h.session, before);
    }

    #[test]
    fn undefended_punch_damages_and_advances() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        h.rig(&[8, 9, 10, 3, 4, 6, 7, 2, 3]);

        let outcome = h.act(A, CombatAction::attack("punch", B)).unwrap();
        let resolution = outcome.resolution.unwrap();
        assert_eq!(resolution.net_successes, 3);

        let record = h.host.damage_log()[0];
        assert_eq!((record.participant, record.amount), (B, 2));
        assert_eq!(record.damage_type, DamageType::Bashing);

        assert_eq!(h.session.combatant(A).unwrap().remaining_actions, 0);
        assert_eq!(h.session.current_actor(), Some(B));
    }

    #[test]
    fn out_of_turn_actions_change_nothing() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        let before = h.session.clone();

        let err = h.act(B, CombatAction::attack("punch", A)).unwrap_err();
        assert_eq!(
            err,
            CombatError::NotYourTurn {
                actor: B,
                current: Some(A)
            }
        );
        let err = h.act(C, CombatAction::Pass).unwrap_err();
        assert_eq!(err.kind(), CombatErrorKind::NotInCombat);
        assert_eq!(h.session, before);
    }

    #[test]
    fn attack_validation_runs_before_any_write() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        let before = h.session.clone();

        let cases = [
            (
                CombatAction::attack("headbutt", B),
                CombatErrorKind::UnknownManeuver,
            ),
            (
                CombatAction::Attack {
                    maneuver: "punch".into(),
                    target: None,
                },
                CombatErrorKind::MissingTarget,
            ),
            (
                CombatAction::attack("punch", C),
                CombatErrorKind::TargetNotInSession,
            ),
            (
                CombatAction::attack("punch", A),
                CombatErrorKind::RequirementsNotMet,
            ),
            (
                CombatAction::attack("block", B),
                CombatErrorKind::RequirementsNotMet,
            ),
            (
                CombatAction::defense("punch"),
                CombatErrorKind::RequirementsNotMet,
            ),
        ];
        for (action, kind) in cases {
            let err = h.act(A, action).unwrap_err();
            assert_eq!(err.kind(), kind);
            assert_eq!(h.session, before);
        }
        assert!(h.host.damage_log().is_empty());
    }

    #[test]
    fn disarmed_combatants_cannot_use_weapons() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        h.session
            .combatant_mut(A)
            .unwrap()
            .apply_status(StatusEffect::new(StatusEffectKind::Disarm, 2));

        let err = h.act(A, CombatAction::attack("slash", B)).unwrap_err();
        assert_eq!(err.kind(), CombatErrorKind::RequirementsNotMet);
        assert!(h.act(A, CombatAction::attack("punch", B)).is_ok());
    }

    #[test]
    fn defense_is_accepted_out_of_turn() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);

        let outcome = h.act(B, CombatAction::defense("block")).unwrap();
        assert_eq!(
            outcome.events,
            vec![CombatEvent::DefenseQueued {
                participant: B,
                maneuver: "block".into(),
            }]
        );
        assert_eq!(h.session.current_actor(), Some(A));

        // Attack: 2 successes. Block: 1 success. Damage: 2 dice, 1 success.
        h.rig(&[6, 8, 10, 1, 3, 7, 2, 9, 3]);
        let resolution = h
            .act(A, CombatAction::attack("punch", B))
            .unwrap()
            .resolution
            .unwrap();
        assert_eq!(resolution.net_successes, 1);
        assert_eq!(h.session.combatant(B).unwrap().defense_action, None);
    }

    #[test]
    fn spending_rage_buys_extra_actions() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);

        let outcome = h.act(A, CombatAction::SpendResource { amount: 1 }).unwrap();
        assert!(matches!(
            outcome.events[0],
            CombatEvent::ResourceSpent {
                amount: 1,
                remaining_actions: 2,
                ..
            }
        ));

        // Fallback faces miss; the turn stays with A.
        h.act(A, CombatAction::attack("punch", B)).unwrap();
        assert_eq!(h.session.current_actor(), Some(A));
        assert_eq!(h.session.combatant(A).unwrap().remaining_actions, 1);

        let err = h
            .act(A, CombatAction::SpendResource { amount: 2 })
            .unwrap_err();
        assert_eq!(err.kind(), CombatErrorKind::InsufficientResource);
        assert_eq!(
            h.host.get_resource(A, ResourcePool::Rage, ResourceScope::Current),
            3
        );
    }

    #[test]
    fn pass_and_end_turn_forfeit_actions() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        h.act(A, CombatAction::SpendResource { amount: 1 }).unwrap();

        h.act(A, CombatAction::Pass).unwrap();
        assert_eq!(h.session.current_actor(), Some(A));

        let outcome = h.act(A, CombatAction::EndTurn).unwrap();
        assert!(outcome.events.contains(&CombatEvent::ActionForfeited {
            participant: A,
            actions: 1
        }));
        assert_eq!(h.session.current_actor(), Some(B));
    }

    #[test]
    fn exhausted_order_rolls_a_new_round() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        h.act(A, CombatAction::EndTurn).unwrap();

        h.rig(&[1, 9]);
        let outcome = h.act(B, CombatAction::EndTurn).unwrap();
        // A: 1 + 5 = 6, B: 9 + 2 = 11
        assert!(outcome.events.iter().any(|e| matches!(
            e,
            CombatEvent::RoundStarted { round: 2, .. }
        )));
        assert_eq!(h.session.turn_order, vec![B, A]);
        assert_eq!(h.session.current_actor(), Some(B));
        assert_eq!(h.session.combatant(A).unwrap().remaining_actions, 1);
    }

    #[test]
    fn stunned_combatants_lose_their_turn() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        h.stun(B);

        let outcome = h.act(A, CombatAction::EndTurn).unwrap();
        assert!(outcome.events.contains(&CombatEvent::TurnSkipped {
            participant: B,
            cause: StatusEffectKind::Stun,
        }));
        assert!(outcome.events.contains(&CombatEvent::EffectExpired {
            participant: B,
            kind: StatusEffectKind::Stun,
        }));
        assert_eq!(h.session.turn_number, 2);
        assert_eq!(h.session.current_actor(), Some(A));
    }

    #[test]
    fn effects_tick_only_for_the_acting_combatant() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        let bleed = StatusEffect::new(StatusEffectKind::Bleeding, 2).with_payload(
            EffectPayload::Damage {
                amount: 1,
                damage_type: DamageType::Lethal,
            },
        );
        h.session.combatant_mut(B).unwrap().apply_status(bleed);

        h.act(A, CombatAction::EndTurn).unwrap();
        assert_eq!(
            h.session
                .combatant(B)
                .unwrap()
                .status_effects
                .remaining(StatusEffectKind::Bleeding),
            Some(2)
        );
        assert!(h.host.damage_log().is_empty());

        h.act(B, CombatAction::EndTurn).unwrap();
        assert_eq!(
            h.session
                .combatant(B)
                .unwrap()
                .status_effects
                .remaining(StatusEffectKind::Bleeding),
            Some(1)
        );
        let record = h.host.damage_log()[0];
        assert_eq!(
            (record.participant, record.amount, record.damage_type),
            (B, 1, DamageType::Lethal)
        );
    }

    #[test]
    fn stun_from_a_hit_skips_the_victims_next_turn() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        // Attack: 4 dice, all hit. Damage rolls fall back to 5: no damage.
        h.rig(&[9, 9, 9, 9]);
        let outcome = h.act(A, CombatAction::attack("stunning_blow", B)).unwrap();
        assert!(outcome.events.contains(&CombatEvent::TurnSkipped {
            participant: B,
            cause: StatusEffectKind::Stun,
        }));
        assert_eq!(h.session.current_actor(), Some(A));
        assert!(h.session.combatant(B).unwrap().status_effects.is_empty());
    }

    #[test]
    fn incapacitating_hit_ends_a_duel() {
        let mut h = Harness::new();
        h.host.sheet_mut(B).unwrap().damage_taken = 6;
        h.rig(&[7, 2]).start(&[A, B]);
        h.rig(&[8, 9, 10, 3, 4, 6, 7, 2, 3]);

        let outcome = h.act(A, CombatAction::attack("punch", B)).unwrap();
        assert!(outcome.events.contains(&CombatEvent::CombatantLeft {
            participant: B,
            reason: RemovalReason::Incapacitated,
        }));
        assert_eq!(
            outcome.events.last(),
            Some(&CombatEvent::CombatEnded {
                reason: EndReason::TooFewCombatants
            })
        );
        assert!(!h.session.active);
        assert!(h.session.is_empty());
        assert!(h.session.turn_order.is_empty());
    }

    #[test]
    fn removing_the_actor_hands_the_turn_on() {
        let mut h = Harness::new();
        h.rig(&[7, 2, 1]).start(&[A, B, C]);
        assert_eq!(h.session.turn_order, vec![A, B, C]);
        h.act(A, CombatAction::EndTurn).unwrap();
        assert_eq!(h.session.current_turn, 1);

        let events = h.remove(B);
        assert_eq!(h.session.turn_order, vec![A, C]);
        assert_eq!(h.session.current_turn, 1);
        assert_eq!(h.session.current_actor(), Some(C));
        assert!(h.session.is_consistent());
        assert!(events.contains(&CombatEvent::TurnStarted {
            participant: C,
            actions: 1
        }));
    }

    #[test]
    fn removing_the_last_actor_starts_a_new_round() {
        let mut h = Harness::new();
        h.rig(&[7, 2, 1]).start(&[A, B, C]);
        h.act(A, CombatAction::EndTurn).unwrap();
        h.act(B, CombatAction::EndTurn).unwrap();
        assert_eq!(h.session.current_actor(), Some(C));

        h.remove(C);
        assert_eq!(h.session.turn_number, 2);
        assert_eq!(h.session.current_turn, 0);
        assert!(h.session.is_consistent());
    }

    #[test]
    fn removing_an_earlier_combatant_keeps_the_actor() {
        let mut h = Harness::new();
        h.rig(&[7, 2, 1]).start(&[A, B, C]);
        h.act(A, CombatAction::EndTurn).unwrap();

        h.remove(A);
        assert_eq!(h.session.current_actor(), Some(B));
        assert_eq!(h.session.current_turn, 0);
    }

    #[test]
    fn add_then_remove_before_initiative_is_safe() {
        let mut h = Harness::new();
        let env = CombatEnv::new(&mut h.host, &mut h.dice);
        CombatEngine::new(&mut h.session, &h.catalog, &h.config)
            .begin(&env, A, &[A])
            .unwrap();
        h.add(B).unwrap();
        assert_eq!(h.add(B).unwrap_err().kind(), CombatErrorKind::AlreadyInCombat);
        h.remove(B);

        assert!(h.session.is_empty());
        assert!(!h.session.active);
        let mut env = CombatEnv::new(&mut h.host, &mut h.dice);
        let events = CombatEngine::new(&mut h.session, &h.catalog, &h.config)
            .roll_initiative(&mut env)
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(h.session.turn_number, 0);
    }

    #[test]
    fn mid_round_arrivals_act_last() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        h.rig(&[10]);
        let events = h.add(C).unwrap();

        assert_eq!(h.session.turn_order, vec![A, B, C]);
        let newcomer = h.session.combatant(C).unwrap();
        assert_eq!(newcomer.initiative_total(), 11);
        assert_eq!(newcomer.remaining_actions, 1);
        assert!(events.contains(&CombatEvent::CombatantJoined { participant: C }));
    }

    #[test]
    fn incapacitated_arrivals_are_turned_away() {
        let mut h = Harness::new();
        h.host.sheet_mut(C).unwrap().damage_taken = 7;
        h.rig(&[7, 2]).start(&[A, B]);
        let before = h.session.clone();

        let err = h.add(C).unwrap_err();
        assert_eq!(err.kind(), CombatErrorKind::RequirementsNotMet);
        assert_eq!(h.session, before);
    }

    #[test]
    fn end_clears_everything() {
        let mut h = Harness::new();
        h.rig(&[7, 2]).start(&[A, B]);
        h.stun(B);

        let events = CombatEngine::new(&mut h.session, &h.catalog, &h.config)
            .end(EndReason::Requested)
            .unwrap();
        assert_eq!(
            events,
            vec![CombatEvent::CombatEnded {
                reason: EndReason::Requested
            }]
        );
        assert!(!h.session.active);
        assert_eq!(h.session.phase, SessionPhase::Inactive);
        assert!(h.session.is_empty());

        let err = CombatEngine::new(&mut h.session, &h.catalog, &h.config)
            .end(EndReason::Requested)
            .unwrap_err();
        assert_eq!(err.kind(), CombatErrorKind::SessionInactive);
    }
}
