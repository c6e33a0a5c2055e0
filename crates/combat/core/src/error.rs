//! Error infrastructure for combat-core.
//!
//! Every caller-triggered failure is a [`CombatError`] returned before any
//! write, so a rejected request leaves the session untouched. Errors carry a
//! [`CombatErrorKind`] discriminant for programmatic handling, a severity for
//! recovery strategies, and a stable code for logs and metrics.

use crate::env::ResourcePool;
use crate::state::{LocationId, ManeuverId, ParticipantId};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// May succeed later or with a different action (wrong turn, too little rage).
    Recoverable,

    /// Invalid input; retrying unchanged will fail again.
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    Internal,

    /// Session state is unusable.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Uniform classification for errors surfaced by the combat crates.
pub trait ClassifiedError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Discriminant of [`CombatError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatErrorKind {
    NotInCombat,
    NotYourTurn,
    UnknownManeuver,
    MissingTarget,
    TargetNotInSession,
    RequirementsNotMet,
    InsufficientResource,
    AlreadyInCombat,
    SessionAlreadyActive,
    SessionInactive,
    NoEligibleParticipants,
    Internal,
}

/// Structured rejection of a combat request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatError {
    #[error("{participant} is not in combat")]
    NotInCombat { participant: ParticipantId },

    #[error("it is not {actor}'s turn")]
    NotYourTurn {
        actor: ParticipantId,
        current: Option<ParticipantId>,
    },

    #[error("unknown maneuver '{0}'")]
    UnknownManeuver(ManeuverId),

    #[error("{maneuver} needs a target")]
    MissingTarget { maneuver: ManeuverId },

    #[error("{target} is not part of this fight")]
    TargetNotInSession { target: ParticipantId },

    #[error("requirements not met: {0}")]
    RequirementsNotMet(String),

    #[error("not enough {pool}: requested {requested}, {available} available")]
    InsufficientResource {
        pool: ResourcePool,
        requested: u32,
        available: u32,
    },

    #[error("{participant} is already in combat")]
    AlreadyInCombat { participant: ParticipantId },

    #[error("combat is already running at {location}")]
    SessionAlreadyActive { location: LocationId },

    #[error("no combat is running at {location}")]
    SessionInactive { location: LocationId },

    #[error("nobody at {location} is able to fight")]
    NoEligibleParticipants { location: LocationId },

    #[error("internal combat error: {0}")]
    Internal(String),
}

impl CombatError {
    pub fn kind(&self) -> CombatErrorKind {
        match self {
            Self::NotInCombat { .. } => CombatErrorKind::NotInCombat,
            Self::NotYourTurn { .. } => CombatErrorKind::NotYourTurn,
            Self::UnknownManeuver(_) => CombatErrorKind::UnknownManeuver,
            Self::MissingTarget { .. } => CombatErrorKind::MissingTarget,
            Self::TargetNotInSession { .. } => CombatErrorKind::TargetNotInSession,
            Self::RequirementsNotMet(_) => CombatErrorKind::RequirementsNotMet,
            Self::InsufficientResource { .. } => CombatErrorKind::InsufficientResource,
            Self::AlreadyInCombat { .. } => CombatErrorKind::AlreadyInCombat,
            Self::SessionAlreadyActive { .. } => CombatErrorKind::SessionAlreadyActive,
            Self::SessionInactive { .. } => CombatErrorKind::SessionInactive,
            Self::NoEligibleParticipants { .. } => CombatErrorKind::NoEligibleParticipants,
            Self::Internal(_) => CombatErrorKind::Internal,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ClassifiedError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        use CombatError::*;
        match self {
            NotYourTurn { .. } | InsufficientResource { .. } => ErrorSeverity::Recoverable,
            SessionAlreadyActive { .. } | NoEligibleParticipants { .. } => {
                ErrorSeverity::Recoverable
            }
            NotInCombat { .. } | UnknownManeuver(_) | MissingTarget { .. } => {
                ErrorSeverity::Validation
            }
            TargetNotInSession { .. } | RequirementsNotMet(_) => ErrorSeverity::Validation,
            AlreadyInCombat { .. } | SessionInactive { .. } => ErrorSeverity::Validation,
            Internal(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use CombatError::*;
        match self {
            NotInCombat { .. } => "COMBAT_NOT_IN_COMBAT",
            NotYourTurn { .. } => "COMBAT_NOT_YOUR_TURN",
            UnknownManeuver(_) => "COMBAT_UNKNOWN_MANEUVER",
            MissingTarget { .. } => "COMBAT_MISSING_TARGET",
            TargetNotInSession { .. } => "COMBAT_TARGET_NOT_IN_SESSION",
            RequirementsNotMet(_) => "COMBAT_REQUIREMENTS_NOT_MET",
            InsufficientResource { .. } => "COMBAT_INSUFFICIENT_RESOURCE",
            AlreadyInCombat { .. } => "COMBAT_ALREADY_IN_COMBAT",
            SessionAlreadyActive { .. } => "COMBAT_SESSION_ALREADY_ACTIVE",
            SessionInactive { .. } => "COMBAT_SESSION_INACTIVE",
            NoEligibleParticipants { .. } => "COMBAT_NO_ELIGIBLE_PARTICIPANTS",
            Internal(_) => "COMBAT_INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_kinds_line_up() {
        let err = CombatError::NotYourTurn {
            actor: ParticipantId(2),
            current: Some(ParticipantId(1)),
        };
        assert_eq!(err.kind(), CombatErrorKind::NotYourTurn);
        assert_eq!(err.error_code(), "COMBAT_NOT_YOUR_TURN");
        assert!(err.severity().is_recoverable());
        assert_eq!(err.to_string(), "it is not #2's turn");
    }

    #[test]
    fn internal_errors_are_flagged() {
        let err = CombatError::internal("turn order desync");
        assert!(err.severity().is_internal());
    }
}
