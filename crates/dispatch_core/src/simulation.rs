//! Session object the UI layer owns: one scenario world plus its schedule.

use bevy_ecs::prelude::{Schedule, World};

use crate::clock::SimulationClock;
use crate::dispatch;
use crate::drivers::{Driver, DriverDirectory, DriverId, RankedDriver};
use crate::error::{DispatchError, PreconditionError};
use crate::geo::Coordinate;
use crate::jitter::{JitterModel, JitterSource};
use crate::pricing::TripQuote;
use crate::ride::{Ride, RideReceipt, RideSession, RideStatus};
use crate::runner::{run_next_event, run_while, simulation_schedule};
use crate::scenario::{build_scenario, ScenarioParams};
use crate::telemetry::{DispatchTelemetry, RideFeed, RideUpdate};

pub struct RideSimulation {
    world: World,
    schedule: Schedule,
}

impl RideSimulation {
    pub fn new(params: ScenarioParams) -> Result<Self, DispatchError> {
        let mut world = World::new();
        build_scenario(&mut world, params)?;
        Ok(Self {
            world,
            schedule: simulation_schedule(),
        })
    }

    /// Replace the jitter randomness, e.g. with a scripted source in tests.
    pub fn with_jitter_source(mut self, source: impl JitterSource + 'static) -> Self {
        self.world.insert_resource(JitterModel::new(source));
        self
    }

    pub fn set_pickup(&mut self, pickup: Coordinate) {
        dispatch::set_pickup(&mut self.world, pickup);
    }

    pub fn set_dropoff(&mut self, dropoff: Coordinate) {
        dispatch::set_dropoff(&mut self.world, dropoff);
    }

    pub fn quote(&self) -> Result<TripQuote, PreconditionError> {
        dispatch::quote(&self.world)
    }

    pub fn ranked_drivers(&self) -> Result<Vec<RankedDriver>, PreconditionError> {
        dispatch::ranked_drivers(&self.world)
    }

    pub fn select_driver(&mut self, id: DriverId) -> Result<Ride, DispatchError> {
        dispatch::select_driver(&mut self.world, id)
    }

    pub fn request_ride(&mut self) -> Result<RideReceipt, DispatchError> {
        dispatch::request_ride(&mut self.world)
    }

    pub fn cancel_ride(&mut self) -> Result<Ride, DispatchError> {
        dispatch::cancel_ride(&mut self.world)
    }

    pub fn tick_jitter(&mut self) {
        dispatch::tick_jitter(&mut self.world);
    }

    pub fn drivers(&self) -> &[Driver] {
        self.world.resource::<DriverDirectory>().all()
    }

    pub fn active_ride(&self) -> Option<&Ride> {
        self.world.resource::<RideSession>().ride()
    }

    pub fn status(&self) -> RideStatus {
        self.world.resource::<RideSession>().status()
    }

    pub fn now_ms(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn telemetry(&self) -> &DispatchTelemetry {
        self.world.resource::<DispatchTelemetry>()
    }

    /// Updates produced since the last call, oldest first.
    pub fn drain_updates(&mut self) -> Vec<RideUpdate> {
        self.world.resource_mut::<RideFeed>().drain()
    }

    /// Process the next clock event. Returns `false` when nothing was due.
    pub fn step(&mut self) -> bool {
        run_next_event(&mut self.world, &mut self.schedule)
    }

    /// Step while a ride is active, up to `max_steps` events.
    pub fn run_until_idle(&mut self, max_steps: usize) -> usize {
        run_while(&mut self.world, &mut self.schedule, max_steps, |world| {
            world.resource::<RideSession>().is_riding()
        })
    }

    /// Process every event due within the next `duration_ms` of simulation time,
    /// then move the clock to the end of the window.
    pub fn run_for(&mut self, duration_ms: u64) -> usize {
        let until = self.now_ms().saturating_add(duration_ms);
        let steps = run_while(&mut self.world, &mut self.schedule, usize::MAX, |world| {
            world
                .resource::<SimulationClock>()
                .next_event_time()
                .is_some_and(|ts| ts <= until)
        });
        self.world
            .resource_mut::<SimulationClock>()
            .advance_to(until);
        steps
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ONE_MIN_MS;
    use crate::config::DispatchConfig;
    use crate::test_helpers::{reference_dropoff, reference_pickup};

    fn quiet_simulation() -> RideSimulation {
        let params = ScenarioParams::default()
            .with_config(DispatchConfig::default().without_jitter_timer())
            .with_seed(1);
        RideSimulation::new(params).expect("simulation")
    }

    #[test]
    fn reference_ride_runs_to_completion() {
        let mut sim = quiet_simulation();
        sim.set_pickup(reference_pickup());
        sim.set_dropoff(reference_dropoff());
        let receipt = sim.request_ride().expect("request");
        assert_eq!(receipt.driver, DriverId(2));
        assert_eq!(receipt.eta_to_pickup_min, 2);

        sim.run_until_idle(100);
        assert!(sim.active_ride().is_none());
        assert_eq!(sim.status(), RideStatus::Unrequested);
        assert_eq!(sim.telemetry().rides_completed, 1);

        let updates = sim.drain_updates();
        assert_eq!(
            updates.last().map(|u| u.status),
            Some(RideStatus::Completed)
        );
        assert!(sim.drain_updates().is_empty());
    }

    #[test]
    fn run_for_stops_at_the_window() {
        let mut sim = quiet_simulation();
        sim.set_pickup(reference_pickup());
        sim.set_dropoff(reference_dropoff());
        sim.request_ride().expect("request");

        sim.run_for(ONE_MIN_MS);
        assert_eq!(sim.status(), RideStatus::Requested);
        assert_eq!(sim.now_ms(), ONE_MIN_MS);

        sim.run_for(ONE_MIN_MS);
        assert_eq!(sim.status(), RideStatus::EnRouteToPickup);
        assert_eq!(sim.now_ms(), 2 * ONE_MIN_MS);
    }

    #[test]
    fn one_minute_windows_carry_a_ride_to_completion() {
        let mut sim = quiet_simulation();
        sim.set_pickup(reference_pickup());
        sim.set_dropoff(reference_dropoff());
        sim.request_ride().expect("request");

        let mut windows = 0;
        while sim.active_ride().is_some() && windows < 30 {
            sim.run_for(ONE_MIN_MS);
            windows += 1;
        }

        assert!(sim.active_ride().is_none(), "ride stalled after {windows} windows");
        assert_eq!(sim.telemetry().rides_completed, 1);
        // Completion lands at 9.5 simulated minutes.
        assert_eq!(windows, 10);
        assert_eq!(sim.now_ms(), 10 * ONE_MIN_MS);
    }

    #[test]
    fn idle_window_still_moves_the_clock() {
        let mut sim = quiet_simulation();
        assert_eq!(sim.run_for(5 * ONE_MIN_MS), 0);
        assert_eq!(sim.now_ms(), 5 * ONE_MIN_MS);
    }

    #[test]
    fn step_on_empty_clock_does_nothing() {
        let mut sim = quiet_simulation();
        assert!(!sim.step());
        assert_eq!(sim.drivers().len(), 4);
    }
}
