use bevy_ecs::prelude::Resource;

use crate::config::DispatchConfig;
use crate::drivers::{reference_roster, Driver};

/// Simulation end time in milliseconds. When set, the runner stops processing events
/// once the next event would be at or after this timestamp.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTimeMs(pub u64);

#[derive(Debug, Clone)]
pub struct ScenarioParams {
    /// Drivers available for the session, in tie-break order.
    pub roster: Vec<Driver>,
    pub config: DispatchConfig,
    /// Seed for driver jitter. If None, jitter is seeded from entropy.
    pub jitter_seed: Option<u64>,
    /// Optional simulation end time in ms. If set, runner stops when next event >= this time.
    pub end_time_ms: Option<u64>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            roster: reference_roster(),
            config: DispatchConfig::default(),
            jitter_seed: None,
            end_time_ms: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_roster(mut self, roster: Vec<Driver>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    /// Stop the runner at this simulation time.
    pub fn with_end_time_ms(mut self, end_time_ms: u64) -> Self {
        self.end_time_ms = Some(end_time_ms);
        self
    }
}
