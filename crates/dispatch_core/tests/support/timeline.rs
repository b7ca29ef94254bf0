#![allow(dead_code)]

//! Steps the dispatch schedule from integration tests and reports where the
//! ride session ended up.

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use dispatch_core::ride::{RideSession, RideStatus};
use dispatch_core::runner::{run_next_event, run_until_empty, run_while, simulation_schedule};

pub struct Timeline {
    schedule: Schedule,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Handle one clock event. `None` when nothing was due.
    pub fn step(&mut self, world: &mut World) -> Option<RideStatus> {
        run_next_event(world, &mut self.schedule).then(|| status(world))
    }

    /// Handle exactly `events` clock events and return the resulting status.
    pub fn advance(&mut self, world: &mut World, events: usize) -> RideStatus {
        for handled in 0..events {
            assert!(
                self.step(world).is_some(),
                "clock ran dry after {handled} of {events} events"
            );
        }
        status(world)
    }

    /// Step while a ride is in flight; returns the events handled.
    pub fn finish_ride(&mut self, world: &mut World, max_events: usize) -> usize {
        run_while(world, &mut self.schedule, max_events, |world| {
            world.resource::<RideSession>().is_riding()
        })
    }

    /// Handle whatever is queued, ride or not.
    pub fn drain(&mut self, world: &mut World, max_events: usize) -> usize {
        run_until_empty(world, &mut self.schedule, max_events)
    }
}

fn status(world: &World) -> RideStatus {
    world.resource::<RideSession>().status()
}
