//! Injectable dice for deterministic resolution.
//!
//! Every random draw in the combat core goes through [`DiceRoller`]. Hosts pick
//! the source: [`SeededDice`] for live sessions and [`ScriptedDice`] to rig
//! exact faces in tests and replays.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::state::{LocationId, SessionId};

/// Source of die faces.
pub trait DiceRoller {
    /// Rolls one die with faces `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Rolls `count` dice with faces `1..=sides`.
    fn roll_pool(&mut self, count: u32, sides: u32) -> Vec<u32> {
        (0..count).map(|_| self.roll_die(sides)).collect()
    }
}

/// ChaCha-backed dice; identical seeds yield identical sequences.
#[derive(Clone, Debug)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DiceRoller for SeededDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides <= 1 {
            return 1;
        }
        self.rng.gen_range(1..=sides)
    }
}

/// Replays a fixed list of faces, then falls back to a constant face.
///
/// Faces are clamped into `1..=sides` when drawn.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedDice {
    /// Default face once the script runs out: neither a success at the
    /// standard difficulty nor a 1.
    pub const DEFAULT_FALLBACK: u32 = 5;

    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            fallback: Self::DEFAULT_FALLBACK,
        }
    }

    pub fn with_fallback(mut self, fallback: u32) -> Self {
        self.fallback = fallback;
        self
    }

    /// Appends more faces to the script.
    pub fn push(&mut self, faces: impl IntoIterator<Item = u32>) {
        self.faces.extend(faces);
    }

    /// Faces not yet drawn.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let face = self.faces.pop_front().unwrap_or(self.fallback);
        face.clamp(1, sides.max(1))
    }
}

/// Derives a per-session seed from a host seed.
///
/// Mixes the inputs with SplitMix64/FxHash multipliers and a final avalanche so
/// neighbouring locations get unrelated streams.
pub fn session_seed(base_seed: u64, location: LocationId, session: SessionId) -> u64 {
    let mut hash = base_seed;
    hash ^= session.0.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (location.0 as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
