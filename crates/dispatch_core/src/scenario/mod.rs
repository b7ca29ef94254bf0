//! Scenario setup: roster, tariff and timing for one rider session.

mod build;
mod params;

pub use build::build_scenario;
pub use params::{ScenarioParams, SimulationEndTimeMs};
