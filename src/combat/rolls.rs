//! Random draws for combat resolution
//!
//! The roll source is passed in explicitly so an encounter is reproducible
//! from its seed.

use rand::{Rng, RngCore};
use std::collections::VecDeque;

/// Source of uniform draws in [0, 1)
pub trait RollSource {
    fn roll(&mut self) -> f64;

    /// Pick an index in 0..len (len must be non-zero)
    fn pick(&mut self, len: usize) -> usize {
        let index = (self.roll() * len as f64) as usize;
        index.min(len.saturating_sub(1))
    }
}

impl<R: RngCore> RollSource for R {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Predetermined draws, for forcing outcomes in tests and replays
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    rolls: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRolls {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 0.0,
        }
    }

    /// Every draw returns the same value
    pub fn constant(value: f64) -> Self {
        Self {
            rolls: VecDeque::new(),
            fallback: value,
        }
    }

    /// Value returned once the script runs out
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl RollSource for ScriptedRolls {
    fn roll(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }
}
