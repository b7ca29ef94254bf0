//! Rider-facing operations over a scenario [World].
//!
//! Each call borrows the session and the shared dispatch resources together,
//! runs one [RideSession] operation, and leaves time untouched. Time only
//! moves through the runner.

use bevy_ecs::prelude::{Mut, Res, ResMut, World};
use bevy_ecs::system::SystemState;

use crate::clock::SimulationClock;
use crate::config::DispatchConfig;
use crate::drivers::{DriverDirectory, DriverId, RankedDriver};
use crate::error::{DispatchError, PreconditionError};
use crate::geo::Coordinate;
use crate::jitter::JitterModel;
use crate::lifecycle::DispatchContext;
use crate::pricing::TripQuote;
use crate::ride::{Ride, RideReceipt, RideSession};
use crate::systems::driver_jitter::jitter_drivers;
use crate::telemetry::{DispatchTelemetry, RideFeed};

type SessionParams<'w> = (
    Res<'w, DispatchConfig>,
    Res<'w, DriverDirectory>,
    ResMut<'w, SimulationClock>,
    ResMut<'w, RideSession>,
    ResMut<'w, RideFeed>,
    ResMut<'w, DispatchTelemetry>,
);

fn with_session<R>(
    world: &mut World,
    op: impl FnOnce(&mut RideSession, &mut DispatchContext) -> R,
) -> R {
    let mut state: SystemState<SessionParams<'static>> = SystemState::new(world);
    let (config, directory, mut clock, mut session, mut feed, mut telemetry) =
        state.get_mut(world);
    let mut ctx = DispatchContext {
        config: &config,
        directory: &directory,
        clock: &mut clock,
        feed: &mut feed,
        telemetry: &mut telemetry,
    };
    op(&mut *session, &mut ctx)
}

pub fn set_pickup(world: &mut World, pickup: Coordinate) {
    with_session(world, |session, ctx| session.set_pickup(pickup, ctx));
}

pub fn set_dropoff(world: &mut World, dropoff: Coordinate) {
    world.resource_mut::<RideSession>().set_dropoff(dropoff);
}

pub fn quote(world: &World) -> Result<TripQuote, PreconditionError> {
    world
        .resource::<RideSession>()
        .quote(world.resource::<DispatchConfig>())
}

pub fn ranked_drivers(world: &World) -> Result<Vec<RankedDriver>, PreconditionError> {
    world
        .resource::<RideSession>()
        .ranked_drivers(world.resource::<DriverDirectory>())
}

/// Bind a driver to the ride and return a snapshot of it.
pub fn select_driver(world: &mut World, id: DriverId) -> Result<Ride, DispatchError> {
    with_session(world, |session, ctx| session.select_driver(id, ctx).cloned())
}

pub fn request_ride(world: &mut World) -> Result<RideReceipt, DispatchError> {
    with_session(world, |session, ctx| session.request_ride(ctx))
}

pub fn cancel_ride(world: &mut World) -> Result<Ride, DispatchError> {
    with_session(world, |session, ctx| session.cancel_ride(ctx))
}

/// Apply one jitter round now, outside the recurring cadence.
pub fn tick_jitter(world: &mut World) {
    world.resource_scope(|world, mut model: Mut<JitterModel>| {
        let mut state: SystemState<(
            Res<DispatchConfig>,
            ResMut<DriverDirectory>,
            ResMut<DispatchTelemetry>,
        )> = SystemState::new(world);
        let (config, mut directory, mut telemetry) = state.get_mut(world);
        jitter_drivers(&mut directory, &mut model, &config, &mut telemetry);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ride::RideStatus;
    use crate::test_helpers::{create_test_world, reference_dropoff, reference_pickup};

    #[test]
    fn quote_needs_both_points() {
        let mut world = create_test_world();
        assert_eq!(quote(&world), Err(PreconditionError::MissingPickup));
        set_pickup(&mut world, reference_pickup());
        assert_eq!(quote(&world), Err(PreconditionError::MissingDropoff));
        set_dropoff(&mut world, reference_dropoff());

        let trip = quote(&world).expect("quote");
        assert!((trip.distance_km - 2.3755).abs() < 0.005);
        assert_eq!(trip.fare, 3900);
    }

    #[test]
    fn ranked_drivers_follow_pickup() {
        let mut world = create_test_world();
        assert_eq!(
            ranked_drivers(&world).unwrap_err(),
            PreconditionError::MissingPickup
        );
        set_pickup(&mut world, reference_pickup());
        let ranked = ranked_drivers(&world).expect("ranked");
        assert_eq!(ranked[0].driver.id, DriverId(2));
    }

    #[test]
    fn select_then_request_keeps_chosen_driver() {
        let mut world = create_test_world();
        set_pickup(&mut world, reference_pickup());
        set_dropoff(&mut world, reference_dropoff());

        let ride = select_driver(&mut world, DriverId(3)).expect("select");
        assert_eq!(ride.status, RideStatus::Unrequested);

        let receipt = request_ride(&mut world).expect("request");
        assert_eq!(receipt.driver, DriverId(3));
        assert_eq!(receipt.driver_name, "Mira");
        assert_eq!(
            world.resource::<RideSession>().status(),
            RideStatus::Requested
        );
    }

    #[test]
    fn cancel_without_ride_is_a_precondition_error() {
        let mut world = create_test_world();
        let err = cancel_ride(&mut world).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn manual_jitter_counts_rounds() {
        let mut world = create_test_world();
        let before = world.resource::<DriverDirectory>().all().to_vec();
        tick_jitter(&mut world);
        tick_jitter(&mut world);
        assert_eq!(world.resource::<DispatchTelemetry>().jitter_rounds, 2);
        assert_eq!(world.resource::<DriverDirectory>().len(), before.len());
        assert!(world.resource::<SimulationClock>().is_empty());
    }
}
