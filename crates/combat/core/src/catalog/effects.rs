use crate::state::{DamageType, EffectPayload, StatusEffect, StatusEffectKind};

/// Special behaviour attached to a maneuver.
///
/// Timed variants become a [`StatusEffect`] on the defender when the maneuver
/// hits. The remaining variants alter resolution itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecialEffect {
    Knockdown { turns: u32 },
    Stun { turns: u32 },
    Immobilize { turns: u32 },
    Disarm { turns: u32 },
    /// Lethal damage at the end of each of the victim's turns.
    Bleeding { turns: u32, amount: u32 },
    Blind { turns: u32 },
    ContinuousDamage {
        turns: u32,
        amount: u32,
        damage_type: DamageType,
    },
    /// Removes `dice` from the victim's defense pools.
    DefensePenalty { turns: u32, dice: u32 },

    /// Net successes are added to the damage pool a second time.
    SuccessScaledDamage,
    /// Defense only: a defense that beats the attacker's raw successes turns the
    /// attack back on the attacker.
    Redirect,
    /// A miss forces the attacker to soak their own momentum.
    SelfDamageOnMiss,
}

impl SpecialEffect {
    /// Status effect inflicted on a hit, for the timed variants.
    pub fn status(&self) -> Option<StatusEffect> {
        let effect = match *self {
            Self::Knockdown { turns } => StatusEffect::new(StatusEffectKind::Knockdown, turns),
            Self::Stun { turns } => StatusEffect::new(StatusEffectKind::Stun, turns),
            Self::Immobilize { turns } => StatusEffect::new(StatusEffectKind::Immobilize, turns),
            Self::Disarm { turns } => StatusEffect::new(StatusEffectKind::Disarm, turns),
            Self::Bleeding { turns, amount } => StatusEffect::new(StatusEffectKind::Bleeding, turns)
                .with_payload(EffectPayload::Damage {
                    amount,
                    damage_type: DamageType::Lethal,
                }),
            Self::Blind { turns } => StatusEffect::new(StatusEffectKind::Blinded, turns),
            Self::ContinuousDamage {
                turns,
                amount,
                damage_type,
            } => StatusEffect::new(StatusEffectKind::ContinuousDamage, turns).with_payload(
                EffectPayload::Damage {
                    amount,
                    damage_type,
                },
            ),
            Self::DefensePenalty { turns, dice } => {
                StatusEffect::new(StatusEffectKind::DefensePenalty, turns)
                    .with_payload(EffectPayload::PoolPenalty(dice))
            }
            Self::SuccessScaledDamage | Self::Redirect | Self::SelfDamageOnMiss => return None,
        };

        // A zero-turn effect would never be observed; skip it.
        (effect.remaining > 0).then_some(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bleeding_carries_lethal_payload() {
        let effect = SpecialEffect::Bleeding {
            turns: 3,
            amount: 1,
        }
        .status()
        .unwrap();
        assert_eq!(effect.kind, StatusEffectKind::Bleeding);
        assert_eq!(effect.periodic_damage(), Some((1, DamageType::Lethal)));
    }

    #[test]
    fn resolution_markers_have_no_status() {
        assert!(SpecialEffect::Redirect.status().is_none());
        assert!(SpecialEffect::Stun { turns: 0 }.status().is_none());
    }
}
