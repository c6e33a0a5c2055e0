//! Error types surfaced by the runtime API.
//!
//! Wraps worker coordination failures and rejected combat operations so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::{ClassifiedError, CombatError, ErrorSeverity};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a combat host before building")]
    MissingHost,

    #[error("failed to load combat content")]
    Content(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RuntimeError {
    /// The combat rejection behind this error, if any.
    pub fn as_combat(&self) -> Option<&CombatError> {
        match self {
            Self::Combat(error) => Some(error),
            _ => None,
        }
    }
}

impl ClassifiedError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Combat(error) => error.severity(),
            Self::MissingHost | Self::Content(_) => ErrorSeverity::Validation,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Fatal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Combat(error) => error.error_code(),
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingHost => "RUNTIME_MISSING_HOST",
            Self::Content(_) => "RUNTIME_CONTENT",
        }
    }
}
