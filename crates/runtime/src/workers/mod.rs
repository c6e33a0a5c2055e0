//! Worker tasks that back the runtime orchestration.

mod dice;
mod session;

pub use dice::DiceStreams;
pub use session::{Command, SessionWorker, SharedHost, SharedSink};
