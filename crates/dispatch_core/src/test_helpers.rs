//! Test helpers for common test setup and utilities.
//!
//! This module provides shared test utilities to reduce duplication across test files.

use bevy_ecs::prelude::World;

use crate::geo::Coordinate;

/// Seed used by [create_test_world] for driver jitter.
pub const TEST_JITTER_SEED: u64 = 7;

/// Pickup of the reference trip. The nearest reference driver is Dilshod (#2).
pub fn reference_pickup() -> Coordinate {
    Coordinate::new_unchecked(41.30, 69.25)
}

/// Dropoff of the reference trip, about 2.38 km from [reference_pickup].
pub fn reference_dropoff() -> Coordinate {
    Coordinate::new_unchecked(41.32, 69.26)
}

/// Create a basic test world with essential resources.
///
/// Uses the reference roster and default tariff, but does not arm the
/// recurring jitter timer, so the clock starts empty. For the full setup use
/// [crate::scenario::build_scenario].
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(crate::clock::SimulationClock::default());
    world.insert_resource(crate::config::DispatchConfig::default().without_jitter_timer());
    world.insert_resource(crate::drivers::DriverDirectory::reference());
    world.insert_resource(crate::jitter::JitterModel::seeded(Some(TEST_JITTER_SEED)));
    world.insert_resource(crate::ride::RideSession::default());
    world.insert_resource(crate::telemetry::RideFeed::default());
    world.insert_resource(crate::telemetry::DispatchTelemetry::default());
    world
}
