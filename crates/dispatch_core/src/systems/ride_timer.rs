use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::config::DispatchConfig;
use crate::drivers::DriverDirectory;
use crate::lifecycle::DispatchContext;
use crate::ride::RideSession;
use crate::telemetry::{DispatchTelemetry, RideFeed};

/// Single driver of the ride state machine: routes every ride timer delivery
/// to [RideSession::on_timer], which switches on the current ride status.
pub fn ride_timer_system(
    event: Res<CurrentEvent>,
    config: Res<DispatchConfig>,
    directory: Res<DriverDirectory>,
    mut clock: ResMut<SimulationClock>,
    mut session: ResMut<RideSession>,
    mut feed: ResMut<RideFeed>,
    mut telemetry: ResMut<DispatchTelemetry>,
) {
    if event.0.kind != EventKind::RideTimer {
        return;
    }

    let mut ctx = DispatchContext {
        config: &config,
        directory: &directory,
        clock: &mut clock,
        feed: &mut feed,
        telemetry: &mut telemetry,
    };
    session.on_timer(&event.0, &mut ctx);
}
