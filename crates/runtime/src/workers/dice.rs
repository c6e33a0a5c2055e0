//! Dice streams handed to the registry for each command.

use std::collections::HashMap;

use combat_core::env::{SeededDice, session_seed};
use combat_core::{DiceRoller, LocationId, SessionId};

/// Either one injected roller shared by every location, or a seeded stream
/// per session.
pub enum DiceStreams {
    Injected(Box<dyn DiceRoller + Send>),
    Seeded {
        base_seed: u64,
        /// Sessions begun so far; orders the per-session seeds.
        begun: u64,
        streams: HashMap<LocationId, SeededDice>,
    },
}

impl DiceStreams {
    pub fn seeded(base_seed: u64) -> Self {
        Self::Seeded {
            base_seed,
            begun: 0,
            streams: HashMap::new(),
        }
    }

    /// Dice for a command at `location`. `opening` starts a fresh stream for a
    /// session being begun there.
    pub fn for_location(&mut self, location: LocationId, opening: bool) -> &mut dyn DiceRoller {
        match self {
            Self::Injected(dice) => dice.as_mut(),
            Self::Seeded {
                base_seed,
                begun,
                streams,
            } => {
                if opening {
                    *begun += 1;
                    let seed = session_seed(*base_seed, location, SessionId(*begun));
                    streams.insert(location, SeededDice::new(seed));
                }
                let seed = session_seed(*base_seed, location, SessionId(*begun));
                streams
                    .entry(location)
                    .or_insert_with(|| SeededDice::new(seed))
            }
        }
    }

    /// Drops the stream of a location whose session is gone.
    pub fn release(&mut self, location: LocationId) {
        if let Self::Seeded { streams, .. } = self {
            streams.remove(&location);
        }
    }
}
