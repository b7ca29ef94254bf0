use bevy_ecs::prelude::World;
use tracing::debug;

use crate::clock::SimulationClock;
use crate::drivers::DriverDirectory;
use crate::error::DispatchError;
use crate::jitter::JitterModel;
use crate::ride::RideSession;
use crate::runner::initialize_simulation;
use crate::scenario::params::{ScenarioParams, SimulationEndTimeMs};
use crate::telemetry::{DispatchTelemetry, RideFeed};

/// Insert every resource the dispatch systems need and arm the jitter cadence.
///
/// Fails without touching `world` when the config holds unusable values or the
/// roster reuses a driver id.
pub fn build_scenario(world: &mut World, params: ScenarioParams) -> Result<(), DispatchError> {
    params.config.validate()?;
    let directory = DriverDirectory::new(params.roster)?;
    debug!(
        drivers = directory.len(),
        seed = ?params.jitter_seed,
        "building dispatch scenario"
    );

    world.insert_resource(SimulationClock::default());
    world.insert_resource(params.config);
    world.insert_resource(directory);
    world.insert_resource(JitterModel::seeded(params.jitter_seed));
    world.insert_resource(RideSession::default());
    world.insert_resource(RideFeed::default());
    world.insert_resource(DispatchTelemetry::default());
    if let Some(end_ms) = params.end_time_ms {
        world.insert_resource(SimulationEndTimeMs(end_ms));
    }

    initialize_simulation(world);
    Ok(())
}
