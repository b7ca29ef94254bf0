//! Pseudo-random sources for simulated driver movement.
//!
//! Driver positions drift by a small uniform offset per axis on every jitter
//! round. The source of randomness is injectable so tests can replay exact
//! samples.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies uniform samples in `[0, 1)`.
pub trait JitterSource: Send + Sync {
    fn next_unit(&mut self) -> f64;
}

/// Default source backed by [StdRng]; unseeded sessions draw from entropy.
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl JitterSource for SeededJitter {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
///
/// An empty script always yields `0.5`, i.e. no movement.
#[derive(Debug, Clone, Default)]
pub struct ScriptedJitter {
    samples: Vec<f64>,
    cursor: usize,
}

impl ScriptedJitter {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples, cursor: 0 }
    }
}

impl JitterSource for ScriptedJitter {
    fn next_unit(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.5;
        }
        let sample = self.samples[self.cursor % self.samples.len()];
        self.cursor = self.cursor.wrapping_add(1);
        sample
    }
}

/// World resource owning the session's jitter source.
#[derive(Resource)]
pub struct JitterModel {
    source: Box<dyn JitterSource>,
}

impl JitterModel {
    pub fn new(source: impl JitterSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn seeded(seed: Option<u64>) -> Self {
        Self::new(SeededJitter::new(seed))
    }

    pub fn source_mut(&mut self) -> &mut dyn JitterSource {
        self.source.as_mut()
    }
}
