use bevy_ecs::prelude::{Res, ResMut};
use tracing::trace;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::config::DispatchConfig;
use crate::drivers::DriverDirectory;
use crate::jitter::JitterModel;
use crate::telemetry::DispatchTelemetry;

/// One round of simulated driver movement. Touches driver positions only.
pub fn jitter_drivers(
    directory: &mut DriverDirectory,
    model: &mut JitterModel,
    config: &DispatchConfig,
    telemetry: &mut DispatchTelemetry,
) {
    directory.jitter_positions(config.jitter_magnitude_deg, model.source_mut());
    telemetry.jitter_rounds += 1;
    trace!(
        drivers = directory.len(),
        round = telemetry.jitter_rounds,
        "driver positions jittered"
    );
}

/// Applies a jitter round on every `JitterDrivers` event and re-arms the
/// recurring timer while a cadence is configured.
pub fn driver_jitter_system(
    event: Res<CurrentEvent>,
    config: Res<DispatchConfig>,
    mut clock: ResMut<SimulationClock>,
    mut directory: ResMut<DriverDirectory>,
    mut model: ResMut<JitterModel>,
    mut telemetry: ResMut<DispatchTelemetry>,
) {
    if event.0.kind != EventKind::JitterDrivers {
        return;
    }

    jitter_drivers(&mut directory, &mut model, &config, &mut telemetry);

    if let Some(interval_ms) = config.jitter_interval_ms() {
        clock.schedule_in(interval_ms, EventKind::JitterDrivers);
    }
}
