mod support;

use dispatch_core::clock::{SimulationClock, ONE_MIN_MS};
use dispatch_core::dispatch::{cancel_ride, request_ride, select_driver, set_dropoff, set_pickup};
use dispatch_core::drivers::DriverId;
use dispatch_core::error::{DispatchError, PreconditionError};
use dispatch_core::ride::{RideSession, RideStatus};
use dispatch_core::telemetry::{DispatchTelemetry, RideFeed, RideNotice};
use dispatch_core::test_helpers::{reference_dropoff, reference_pickup};

use support::timeline::Timeline;
use support::world::TestWorldBuilder;

fn requested_world() -> bevy_ecs::prelude::World {
    let mut world = TestWorldBuilder::new().build();
    set_pickup(&mut world, reference_pickup());
    set_dropoff(&mut world, reference_dropoff());
    request_ride(&mut world).expect("request");
    world
}

#[test]
fn reference_ride_walks_every_status() {
    let mut world = requested_world();
    let steps = Timeline::new().finish_ride(&mut world, 100);
    assert_eq!(steps, 12);

    let feed = world.resource::<RideFeed>();
    let mut statuses: Vec<RideStatus> = feed.updates().iter().map(|u| u.status).collect();
    statuses.dedup();
    assert_eq!(statuses, RideStatus::ALL.to_vec());

    assert!(world.resource::<RideSession>().ride().is_none());
    assert_eq!(world.resource::<SimulationClock>().now(), 570_000);
}

#[test]
fn feed_carries_countdown_minutes() {
    let mut world = requested_world();
    Timeline::new().finish_ride(&mut world, 100);

    let feed = world.resource::<RideFeed>();
    let en_route: Vec<u32> = feed
        .updates()
        .iter()
        .filter_map(|u| match u.notice {
            RideNotice::DriverEnRoute { remaining_min, .. } => Some(remaining_min),
            _ => None,
        })
        .collect();
    assert_eq!(en_route, vec![2, 1, 0]);

    let trip: Vec<u32> = feed
        .updates()
        .iter()
        .filter_map(|u| match u.notice {
            RideNotice::TripProgress { remaining_min } => Some(remaining_min),
            _ => None,
        })
        .collect();
    assert_eq!(trip, vec![4, 3, 2, 1, 0]);

    let started = feed
        .updates()
        .iter()
        .find(|u| matches!(u.notice, RideNotice::TripStarted { .. }))
        .expect("trip started");
    assert_eq!(started.at_ms, 330_000);
    assert_eq!(
        started.notice,
        RideNotice::TripStarted {
            eta_to_dropoff_min: 4
        }
    );
}

#[test]
fn completion_is_recorded_in_telemetry() {
    let mut world = requested_world();
    Timeline::new().finish_ride(&mut world, 100);

    let telemetry = world.resource::<DispatchTelemetry>();
    assert_eq!(telemetry.rides_requested, 1);
    assert_eq!(telemetry.rides_completed, 1);
    let record = &telemetry.completed_rides[0];
    assert_eq!(record.driver, DriverId(2));
    assert_eq!(record.fare, 3900);
    assert_eq!(record.time_to_accept(), 2 * ONE_MIN_MS);
    assert_eq!(record.time_to_pickup(), 210_000);
    assert_eq!(record.trip_duration(), 4 * ONE_MIN_MS);
}

#[test]
fn re_request_while_requested_keeps_a_single_timer() {
    let mut world = requested_world();
    let mut timeline = Timeline::new();

    request_ride(&mut world).expect("second request");
    assert_eq!(world.resource::<SimulationClock>().pending_count(), 1);
    assert_eq!(world.resource::<DispatchTelemetry>().rides_requested, 1);

    assert_eq!(timeline.advance(&mut world, 1), RideStatus::Accepted);
    assert_eq!(
        request_ride(&mut world).unwrap_err(),
        DispatchError::from(PreconditionError::RideInProgress(RideStatus::Accepted))
    );
}

#[test]
fn driver_can_be_switched_until_acceptance() {
    let mut world = requested_world();
    let ride = select_driver(&mut world, DriverId(4)).expect("switch while requested");
    assert_eq!(ride.driver, DriverId(4));
    assert_eq!(ride.status, RideStatus::Requested);

    let status = Timeline::new().advance(&mut world, 2);
    assert_eq!(status, RideStatus::EnRouteToPickup);
    assert_eq!(
        select_driver(&mut world, DriverId(1)).unwrap_err(),
        DispatchError::from(PreconditionError::DriverLocked(status))
    );
}

#[test]
fn cancel_mid_countdown_silences_the_timer() {
    let mut world = requested_world();
    let mut timeline = Timeline::new();
    timeline.advance(&mut world, 2);

    let cancelled = cancel_ride(&mut world).expect("cancel");
    assert_eq!(cancelled.status, RideStatus::EnRouteToPickup);
    assert!(world.resource::<SimulationClock>().is_empty());
    assert_eq!(timeline.drain(&mut world, 10), 0);
    assert_eq!(
        world.resource::<RideSession>().status(),
        RideStatus::Unrequested
    );
    assert_eq!(world.resource::<DispatchTelemetry>().rides_cancelled, 1);
}
