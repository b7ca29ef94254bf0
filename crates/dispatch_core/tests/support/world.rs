#![allow(dead_code)]

use bevy_ecs::prelude::World;
use dispatch_core::config::DispatchConfig;
use dispatch_core::drivers::{reference_roster, Driver};
use dispatch_core::jitter::{JitterModel, JitterSource};
use dispatch_core::scenario::{build_scenario, ScenarioParams};

/// Builder configuration for reproducible test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub seed: u64,
    pub roster: Vec<Driver>,
    pub config: DispatchConfig,
    pub end_time_ms: Option<u64>,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            roster: reference_roster(),
            config: DispatchConfig::default().without_jitter_timer(),
            end_time_ms: None,
        }
    }
}

/// Helper that builds a scenario world with test-friendly defaults: fixed seed,
/// reference roster and no recurring jitter timer.
#[derive(Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
    jitter: Option<JitterModel>,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_roster(mut self, roster: Vec<Driver>) -> Self {
        self.config.roster = roster;
        self
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config.config = config;
        self
    }

    pub fn with_end_time_ms(mut self, end_time_ms: u64) -> Self {
        self.config.end_time_ms = Some(end_time_ms);
        self
    }

    /// Replace the seeded jitter with a fixed source.
    pub fn with_jitter_source(mut self, source: impl JitterSource + 'static) -> Self {
        self.jitter = Some(JitterModel::new(source));
        self
    }

    /// Build the ECS world with the configured resources.
    pub fn build(self) -> World {
        let TestWorldConfig {
            seed,
            roster,
            config,
            end_time_ms,
        } = self.config;

        let mut params = ScenarioParams::default()
            .with_roster(roster)
            .with_config(config)
            .with_seed(seed);
        if let Some(end_ms) = end_time_ms {
            params = params.with_end_time_ms(end_ms);
        }

        let mut world = World::new();
        build_scenario(&mut world, params).expect("test scenario");
        if let Some(jitter) = self.jitter {
            world.insert_resource(jitter);
        }
        world
    }
}
