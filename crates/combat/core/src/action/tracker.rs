use crate::state::{Combatant, DamageType, StatusEffect, StatusEffectKind};

/// Damage owed by a periodic effect at this decrement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodicDamage {
    pub source: StatusEffectKind,
    pub amount: u32,
    pub damage_type: DamageType,
}

/// What a single end-of-turn decrement changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub expired: Vec<StatusEffectKind>,
    pub periodic: Vec<PeriodicDamage>,
}

/// Owns the decrement and removal policy for timed effects.
pub struct StatusEffectTracker;

impl StatusEffectTracker {
    /// Applies an effect to a combatant, raising its flag.
    pub fn apply(combatant: &mut Combatant, effect: StatusEffect) {
        combatant.apply_status(effect);
    }

    /// Removes a one-shot effect so its modifier is used exactly once.
    pub fn consume(combatant: &mut Combatant, kind: StatusEffectKind) -> Option<StatusEffect> {
        if !combatant.status_effects.has(kind) {
            return None;
        }
        combatant.clear_status(kind)
    }

    /// Runs at the end of the combatant's own turn.
    ///
    /// Periodic damage is collected for every effect still running before the
    /// decrement, so the final turn of a bleed still hurts. Effects reaching 0
    /// are removed and their flags cleared. One-shot effects never tick.
    pub fn decrement_all(combatant: &mut Combatant) -> TickReport {
        let mut report = TickReport::default();

        for effect in combatant.status_effects.iter_mut() {
            if effect.kind.is_one_shot() || effect.remaining == 0 {
                continue;
            }
            if let Some((amount, damage_type)) = effect.periodic_damage() {
                if amount > 0 {
                    report.periodic.push(PeriodicDamage {
                        source: effect.kind,
                        amount,
                        damage_type,
                    });
                }
            }
            effect.remaining -= 1;
        }

        let mut expired = Vec::new();
        combatant.status_effects.retain(|effect| {
            let done = !effect.kind.is_one_shot() && effect.remaining == 0;
            if done {
                expired.push(effect.kind);
            }
            !done
        });
        for kind in &expired {
            combatant.combat_flags.remove(kind.flag());
        }
        report.expired = expired;

        report
    }
}
