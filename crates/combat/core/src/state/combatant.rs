use super::{CombatFlags, ManeuverId, ParticipantId, StatusEffect, StatusEffectKind, StatusEffects};

/// Components of an initiative roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiativeRoll {
    pub die: u32,
    pub dexterity: i32,
    pub wits: i32,
    pub modifier: i32,
}

impl InitiativeRoll {
    /// `die + Dexterity + Wits + modifier`.
    pub const fn total(&self) -> i32 {
        self.die as i32 + self.dexterity + self.wits + self.modifier
    }
}

/// A participant's per-session combat record.
///
/// Created when the participant joins a session and dropped when they leave,
/// are incapacitated, or the session ends.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub participant: ParticipantId,

    /// Order of registration; breaks initiative ties (earlier wins).
    pub registration: u32,

    /// Latest initiative roll, `None` until the first roll.
    pub initiative: Option<InitiativeRoll>,

    /// Flat bonus added to every initiative roll.
    pub initiative_modifier: i32,

    pub remaining_actions: u32,
    pub resource_spent_this_turn: u32,

    /// Maneuver declared for the action being resolved. Cleared every round.
    pub selected_action: Option<ManeuverId>,

    /// Defense queued against the next incoming attack.
    pub defense_action: Option<ManeuverId>,

    pub status_effects: StatusEffects,
    pub combat_flags: CombatFlags,
}

impl Combatant {
    pub fn new(participant: ParticipantId, registration: u32) -> Self {
        Self {
            participant,
            registration,
            initiative: None,
            initiative_modifier: 0,
            remaining_actions: 0,
            resource_spent_this_turn: 0,
            selected_action: None,
            defense_action: None,
            status_effects: StatusEffects::empty(),
            combat_flags: CombatFlags::empty(),
        }
    }

    /// Initiative total of the latest roll (0 before the first roll).
    pub fn initiative_total(&self) -> i32 {
        self.initiative.map(|roll| roll.total()).unwrap_or(0)
    }

    pub fn has_flag(&self, flag: CombatFlags) -> bool {
        self.combat_flags.contains(flag)
    }

    /// Applies an effect and raises its mirrored flag.
    pub fn apply_status(&mut self, effect: StatusEffect) {
        self.combat_flags.insert(effect.kind.flag());
        self.status_effects.insert(effect);
    }

    /// Removes an effect and clears its mirrored flag.
    pub fn clear_status(&mut self, kind: StatusEffectKind) -> Option<StatusEffect> {
        self.combat_flags.remove(kind.flag());
        self.status_effects.remove(kind)
    }

    /// Resets the per-round action fields.
    pub(crate) fn reset_for_round(&mut self) {
        self.remaining_actions = 1;
        self.resource_spent_this_turn = 0;
        self.selected_action = None;
    }

    /// Drops every effect and flag.
    pub(crate) fn clear_conditions(&mut self) {
        self.status_effects.clear();
        self.combat_flags = CombatFlags::empty();
    }
}
