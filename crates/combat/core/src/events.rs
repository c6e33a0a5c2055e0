//! Observable combat events.
//!
//! Every state change made by the engine is reported as a [`CombatEvent`].
//! Events render as plain sentences through `Display` and name their audience,
//! so hosts can route them to a [`MessageSink`](crate::env::MessageSink)
//! without knowing the rules.

use core::fmt;

use crate::env::{InjuryTier, ResourcePool};
use crate::state::{
    DamageType, InitiativeRoll, ManeuverId, ParticipantId, StatusEffectKind,
};

/// Who should see an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Audience {
    /// Everyone at the session's location.
    Location,
    /// A single participant.
    Participant(ParticipantId),
}

/// Why a combatant left the fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RemovalReason {
    Fled,
    Incapacitated,
    /// Removed by the host (disconnect, teleport, admin).
    Removed,
}

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    /// One or no combatants remain.
    TooFewCombatants,
    /// Ended explicitly by the host.
    Requested,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewCombatants => f.write_str("no opponents remain"),
            Self::Requested => f.write_str("the fight was called off"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    CombatBegun {
        initiator: ParticipantId,
        combatants: Vec<ParticipantId>,
    },
    CombatantJoined {
        participant: ParticipantId,
    },
    CombatantLeft {
        participant: ParticipantId,
        reason: RemovalReason,
    },
    InitiativeRolled {
        participant: ParticipantId,
        roll: InitiativeRoll,
    },
    RoundStarted {
        round: u32,
        order: Vec<ParticipantId>,
    },
    TurnStarted {
        participant: ParticipantId,
        actions: u32,
    },
    TurnSkipped {
        participant: ParticipantId,
        cause: StatusEffectKind,
    },
    DefenseQueued {
        participant: ParticipantId,
        maneuver: ManeuverId,
    },
    ManeuverDeclared {
        attacker: ParticipantId,
        target: ParticipantId,
        maneuver: ManeuverId,
        name: String,
    },
    PoolRolled {
        participant: ParticipantId,
        faces: Vec<u32>,
        difficulty: u32,
        successes: i32,
        botch: bool,
    },
    Missed {
        attacker: ParticipantId,
        target: ParticipantId,
    },
    Hit {
        attacker: ParticipantId,
        target: ParticipantId,
        net_successes: u32,
    },
    Redirected {
        defender: ParticipantId,
        attacker: ParticipantId,
        margin: u32,
    },
    DamageApplied {
        participant: ParticipantId,
        amount: u32,
        damage_type: DamageType,
        tier: InjuryTier,
    },
    NoDamage {
        participant: ParticipantId,
    },
    EffectApplied {
        participant: ParticipantId,
        kind: StatusEffectKind,
        turns: u32,
    },
    EffectExpired {
        participant: ParticipantId,
        kind: StatusEffectKind,
    },
    ResourceSpent {
        participant: ParticipantId,
        pool: ResourcePool,
        amount: u32,
        remaining_actions: u32,
    },
    SpeedLimitExceeded {
        participant: ParticipantId,
        penalty: u32,
    },
    ActionForfeited {
        participant: ParticipantId,
        actions: u32,
    },
    CombatEnded {
        reason: EndReason,
    },
}

impl CombatEvent {
    pub fn audience(&self) -> Audience {
        match self {
            Self::InitiativeRolled { participant, .. }
            | Self::DefenseQueued { participant, .. }
            | Self::PoolRolled { participant, .. }
            | Self::SpeedLimitExceeded { participant, .. } => Audience::Participant(*participant),
            _ => Audience::Location,
        }
    }

    /// Participant the event is primarily about, if any.
    pub fn subject(&self) -> Option<ParticipantId> {
        match self {
            Self::CombatBegun { initiator, .. } => Some(*initiator),
            Self::CombatantJoined { participant }
            | Self::CombatantLeft { participant, .. }
            | Self::InitiativeRolled { participant, .. }
            | Self::TurnStarted { participant, .. }
            | Self::TurnSkipped { participant, .. }
            | Self::DefenseQueued { participant, .. }
            | Self::PoolRolled { participant, .. }
            | Self::DamageApplied { participant, .. }
            | Self::NoDamage { participant }
            | Self::EffectApplied { participant, .. }
            | Self::EffectExpired { participant, .. }
            | Self::ResourceSpent { participant, .. }
            | Self::SpeedLimitExceeded { participant, .. }
            | Self::ActionForfeited { participant, .. } => Some(*participant),
            Self::ManeuverDeclared { attacker, .. }
            | Self::Missed { attacker, .. }
            | Self::Hit { attacker, .. } => Some(*attacker),
            Self::Redirected { defender, .. } => Some(*defender),
            Self::RoundStarted { .. } | Self::CombatEnded { .. } => None,
        }
    }
}

struct List<'a>(&'a [ParticipantId]);

impl fmt::Display for List<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CombatBegun {
                initiator,
                combatants,
            } => write!(
                f,
                "{initiator} starts a fight! Combatants: {}",
                List(combatants)
            ),
            Self::CombatantJoined { participant } => write!(f, "{participant} joins the fight"),
            Self::CombatantLeft {
                participant,
                reason,
            } => match reason {
                RemovalReason::Fled => write!(f, "{participant} flees the fight"),
                RemovalReason::Incapacitated => write!(f, "{participant} collapses"),
                RemovalReason::Removed => write!(f, "{participant} leaves the fight"),
            },
            Self::InitiativeRolled { roll, .. } => write!(
                f,
                "Initiative: {} (die) + {} (dexterity) + {} (wits) + {} = {}",
                roll.die,
                roll.dexterity,
                roll.wits,
                roll.modifier,
                roll.total()
            ),
            Self::RoundStarted { round, order } => {
                write!(f, "Round {round}. Turn order: {}", List(order))
            }
            Self::TurnStarted {
                participant,
                actions,
            } => write!(f, "It is {participant}'s turn ({actions} action(s))"),
            Self::TurnSkipped { participant, cause } => {
                write!(f, "{participant} loses their turn ({cause})")
            }
            Self::DefenseQueued { maneuver, .. } => {
                write!(f, "You ready {maneuver} against the next attack")
            }
            Self::ManeuverDeclared {
                attacker,
                target,
                name,
                ..
            } => write!(f, "{attacker} attempts {name} against {target}"),
            Self::PoolRolled {
                faces,
                difficulty,
                successes,
                botch,
                ..
            } => {
                write!(
                    f,
                    "You roll {} dice at difficulty {difficulty}: {faces:?} => {successes} success(es)",
                    faces.len()
                )?;
                if *botch {
                    f.write_str(" (botch)")?;
                }
                Ok(())
            }
            Self::Missed { attacker, target } => write!(f, "{attacker} misses {target}"),
            Self::Hit {
                attacker,
                target,
                net_successes,
            } => write!(
                f,
                "{attacker} hits {target} with {net_successes} net success(es)"
            ),
            Self::Redirected {
                defender,
                attacker,
                margin,
            } => write!(
                f,
                "{defender} turns {attacker}'s attack back on them (margin {margin})"
            ),
            Self::DamageApplied {
                participant,
                amount,
                damage_type,
                tier,
            } => write!(
                f,
                "{participant} takes {amount} {damage_type} damage and is now {tier}"
            ),
            Self::NoDamage { participant } => write!(f, "{participant} shrugs off the blow"),
            Self::EffectApplied {
                participant,
                kind,
                turns,
            } => write!(f, "{participant} suffers {kind} for {turns} turn(s)"),
            Self::EffectExpired { participant, kind } => {
                write!(f, "{participant} {}", kind.recovery_text())
            }
            Self::ResourceSpent {
                participant,
                pool,
                amount,
                remaining_actions,
            } => write!(
                f,
                "{participant} spends {amount} {pool} ({remaining_actions} action(s) left)"
            ),
            Self::SpeedLimitExceeded { penalty, .. } => write!(
                f,
                "You push past your limits: +{penalty} difficulty on your next maneuver"
            ),
            Self::ActionForfeited {
                participant,
                actions,
            } => write!(f, "{participant} holds ({actions} action(s) forfeited)"),
            Self::CombatEnded { reason } => write!(f, "Combat ends: {reason}"),
        }
    }
}
