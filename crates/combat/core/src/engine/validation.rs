//! Pre-validation of submitted actions.
//!
//! Nothing here writes. An action that passes is guaranteed to reach the
//! resolver with a known maneuver, a present target and met requirements.

use crate::catalog::{
    CombatantProfile, ManeuverCatalog, ManeuverCategory, ManeuverDefinition, check_requirements,
};
use crate::env::CombatHost;
use crate::error::CombatError;
use crate::state::{CombatFlags, CombatSession, ManeuverId, ParticipantId};

/// Turn ownership check for everything except defense-setting.
pub(super) fn ensure_turn(
    session: &CombatSession,
    actor: ParticipantId,
) -> Result<(), CombatError> {
    let current = session.current_actor();
    if current != Some(actor) {
        return Err(CombatError::NotYourTurn { actor, current });
    }
    Ok(())
}

pub(super) fn validate_attack<'c>(
    session: &CombatSession,
    catalog: &'c ManeuverCatalog,
    host: &dyn CombatHost,
    actor: ParticipantId,
    maneuver: &ManeuverId,
    target: Option<ParticipantId>,
) -> Result<(&'c ManeuverDefinition, ParticipantId), CombatError> {
    let definition = catalog.require(maneuver)?;
    if definition.is_defense() {
        return Err(CombatError::RequirementsNotMet(format!(
            "{} is a defensive maneuver; queue it as a defense",
            definition.name
        )));
    }

    let target = target.ok_or_else(|| CombatError::MissingTarget {
        maneuver: maneuver.clone(),
    })?;
    if !session.contains(target) {
        return Err(CombatError::TargetNotInSession { target });
    }
    if target == actor {
        return Err(CombatError::RequirementsNotMet(
            "you cannot target yourself".to_owned(),
        ));
    }

    let disarmed = session
        .combatant(actor)
        .is_some_and(|c| c.has_flag(CombatFlags::DISARMED));
    if disarmed && definition.category == ManeuverCategory::Weapon {
        return Err(CombatError::RequirementsNotMet(format!(
            "{} needs a weapon and you are disarmed",
            definition.name
        )));
    }

    check_maneuver_requirements(host, actor, definition)?;
    Ok((definition, target))
}

pub(super) fn validate_defense<'c>(
    catalog: &'c ManeuverCatalog,
    host: &dyn CombatHost,
    actor: ParticipantId,
    maneuver: &ManeuverId,
) -> Result<&'c ManeuverDefinition, CombatError> {
    let definition = catalog.require(maneuver)?;
    if !definition.is_defense() {
        return Err(CombatError::RequirementsNotMet(format!(
            "{} is not a defensive maneuver",
            definition.name
        )));
    }
    check_maneuver_requirements(host, actor, definition)?;
    Ok(definition)
}

fn check_maneuver_requirements(
    host: &dyn CombatHost,
    actor: ParticipantId,
    definition: &ManeuverDefinition,
) -> Result<(), CombatError> {
    let profile = CombatantProfile::gather(host, actor, [definition]);
    check_requirements(&profile, definition).map_err(CombatError::RequirementsNotMet)
}
