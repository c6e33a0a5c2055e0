//! Status effect bookkeeping for combatants.
//!
//! Effects are keyed by [`StatusEffectKind`]; at most one effect of each kind is
//! active at a time. Durations count the owner's own turns, so an effect with
//! `remaining == 2` survives two end-of-turn decrements. Every active kind has a
//! mirrored bit in [`CombatFlags`] so hosts can test conditions cheaply.

use arrayvec::ArrayVec;
use bitflags::bitflags;
use strum::EnumCount;

use super::DamageType;

/// Closed set of timed conditions a maneuver can inflict.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusEffectKind {
    /// On the ground; attacks are harder until the owner recovers.
    Knockdown,
    /// Loses turns while active.
    Stun,
    /// Held in place; queued defenses cannot be rolled.
    Immobilize,
    /// Weapon maneuvers are unavailable.
    Disarm,
    /// Takes lethal damage at the end of each own turn.
    Bleeding,
    /// Attacks are harder.
    Blinded,
    /// Takes payload damage at the end of each own turn (fire, acid, ...).
    ContinuousDamage,
    /// Defense pools shrink by the payload amount.
    DefensePenalty,
    /// Spent past the speed limit; the next maneuver is harder. Never ticks.
    Overexertion,
}

impl StatusEffectKind {
    /// Mirrored combat flag for this kind.
    pub const fn flag(self) -> CombatFlags {
        match self {
            Self::Knockdown => CombatFlags::KNOCKED_DOWN,
            Self::Stun => CombatFlags::STUNNED,
            Self::Immobilize => CombatFlags::IMMOBILIZED,
            Self::Disarm => CombatFlags::DISARMED,
            Self::Bleeding => CombatFlags::BLEEDING,
            Self::Blinded => CombatFlags::BLINDED,
            Self::ContinuousDamage => CombatFlags::BURNING,
            Self::DefensePenalty => CombatFlags::DEFENSE_PENALIZED,
            Self::Overexertion => CombatFlags::OVEREXERTED,
        }
    }

    /// One-shot effects are consumed by the next maneuver instead of ticking.
    pub const fn is_one_shot(self) -> bool {
        matches!(self, Self::Overexertion)
    }

    /// Text used when the effect wears off.
    pub const fn recovery_text(self) -> &'static str {
        match self {
            Self::Knockdown => "regains their footing",
            Self::Stun => "shakes off the daze",
            Self::Immobilize => "breaks free",
            Self::Disarm => "recovers their weapon",
            Self::Bleeding => "stops bleeding",
            Self::Blinded => "can see again",
            Self::ContinuousDamage => "is no longer burning",
            Self::DefensePenalty => "recovers their guard",
            Self::Overexertion => "catches their breath",
        }
    }
}

bitflags! {
    /// Boolean markers mirroring the active status effects of a combatant.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CombatFlags: u16 {
        const KNOCKED_DOWN = 1 << 0;
        const STUNNED = 1 << 1;
        const IMMOBILIZED = 1 << 2;
        const DISARMED = 1 << 3;
        const BLEEDING = 1 << 4;
        const BLINDED = 1 << 5;
        const BURNING = 1 << 6;
        const DEFENSE_PENALIZED = 1 << 7;
        const OVEREXERTED = 1 << 8;
    }
}

/// Kind-specific data carried by an effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectPayload {
    #[default]
    None,
    /// Damage dealt at every end-of-turn decrement.
    Damage { amount: u32, damage_type: DamageType },
    /// Dice removed from defense pools.
    PoolPenalty(u32),
    /// Difficulty added to the next maneuver.
    DifficultyPenalty(u32),
}

/// A single timed effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    /// Own turns left before the effect expires.
    pub remaining: u32,
    pub payload: EffectPayload,
}

impl StatusEffect {
    pub const fn new(kind: StatusEffectKind, remaining: u32) -> Self {
        Self {
            kind,
            remaining,
            payload: EffectPayload::None,
        }
    }

    pub const fn with_payload(mut self, payload: EffectPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Periodic damage carried by this effect, if any.
    pub const fn periodic_damage(&self) -> Option<(u32, DamageType)> {
        match self.payload {
            EffectPayload::Damage {
                amount,
                damage_type,
            } => Some((amount, damage_type)),
            _ => None,
        }
    }
}

/// Active effects on a combatant, at most one per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { StatusEffectKind::COUNT }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Remaining duration of `kind`, if active.
    pub fn remaining(&self, kind: StatusEffectKind) -> Option<u32> {
        self.get(kind).map(|e| e.remaining)
    }

    /// Adds an effect. A re-applied kind keeps the longer duration and takes the
    /// newer payload.
    pub fn insert(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.remaining = existing.remaining.max(effect.remaining);
            existing.payload = effect.payload;
            return;
        }

        // Capacity equals the number of kinds, so a missing kind always fits.
        self.effects.push(effect);
    }

    pub fn remove(&mut self, kind: StatusEffectKind) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.kind == kind)?;
        Some(self.effects.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatusEffect> {
        self.effects.iter_mut()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&mut StatusEffect) -> bool) {
        self.effects.retain(keep);
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_fits_once() {
        let mut effects = StatusEffects::empty();
        for kind in StatusEffectKind::iter() {
            effects.insert(StatusEffect::new(kind, 1));
        }
        assert_eq!(effects.len(), StatusEffectKind::COUNT);
    }

    #[test]
    fn reapplying_keeps_longer_duration() {
        let mut effects = StatusEffects::empty();
        effects.insert(StatusEffect::new(StatusEffectKind::Stun, 3));
        effects.insert(StatusEffect::new(StatusEffectKind::Stun, 1));
        assert_eq!(effects.remaining(StatusEffectKind::Stun), Some(3));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn flags_are_distinct() {
        let all = StatusEffectKind::iter().fold(CombatFlags::empty(), |acc, k| {
            assert!(!acc.contains(k.flag()));
            acc | k.flag()
        });
        assert_eq!(all.bits().count_ones() as usize, StatusEffectKind::COUNT);
    }

    #[test]
    fn kinds_parse_from_snake_case() {
        assert_eq!(
            "continuous_damage".parse::<StatusEffectKind>().ok(),
            Some(StatusEffectKind::ContinuousDamage)
        );
        assert_eq!(StatusEffectKind::DefensePenalty.to_string(), "defense_penalty");
    }
}
