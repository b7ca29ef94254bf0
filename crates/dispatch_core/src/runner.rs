//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule. One event is handled to completion before the next
//! is popped, so ride transitions and jitter rounds never overlap.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::config::DispatchConfig;
use crate::scenario::SimulationEndTimeMs;
use crate::systems::{driver_jitter::driver_jitter_system, ride_timer::ride_timer_system};

fn is_ride_timer(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideTimer)
        .unwrap_or(false)
}

fn is_jitter_drivers(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::JitterDrivers)
        .unwrap_or(false)
}

fn pop_due_event(world: &mut World) -> Option<Event> {
    let stop_at = world.get_resource::<SimulationEndTimeMs>().map(|e| e.0);
    let next_ts = world
        .get_resource::<SimulationClock>()
        .and_then(|c| c.next_event_time());
    if let (Some(end_ms), Some(ts)) = (stop_at, next_ts) {
        if ts >= end_ms {
            return None;
        }
    }

    let event = world.get_resource_mut::<SimulationClock>()?.pop_next()?;
    world.insert_resource(CurrentEvent(event));
    Some(event)
}

/// Runs one simulation step: pops the next event, inserts it as [CurrentEvent], then runs the schedule.
/// Returns `true` if an event was processed, `false` if the clock was empty or if the next event
/// is at or past [SimulationEndTimeMs] (when that resource is present).
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    if pop_due_event(world).is_none() {
        return false;
    }
    schedule.run(world);
    true
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let Some(event) = pop_due_event(world) else {
        return false;
    };
    schedule.run(world);
    hook(world, &event);
    true
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
///
/// With a recurring jitter cadence configured the queue never drains; bound
/// the run with `max_steps`, [SimulationEndTimeMs] or [run_while].
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    run_while(world, schedule, max_steps, |_| true)
}

/// Runs simulation steps while `keep_going` holds for the world (checked before each step).
pub fn run_while<P>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut keep_going: P,
) -> usize
where
    P: FnMut(&World) -> bool,
{
    let mut steps = 0;
    while steps < max_steps && keep_going(world) && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Builds the default simulation schedule: one system per event kind, each
/// gated on the current event so only the matching one runs.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        ride_timer_system.run_if(is_ride_timer),
        driver_jitter_system.run_if(is_jitter_drivers),
    ));
    schedule
}

/// Arms the recurring driver jitter timer when a cadence is configured.
/// Call this after building the scenario and before running events.
pub fn initialize_simulation(world: &mut World) {
    let interval = world
        .get_resource::<DispatchConfig>()
        .and_then(|config| config.jitter_interval_ms());
    if let Some(interval_ms) = interval {
        world
            .resource_mut::<SimulationClock>()
            .schedule_in(interval_ms, EventKind::JitterDrivers);
    }
}
