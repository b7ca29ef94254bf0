//! Single-rider ride dispatch and fare simulation.
//!
//! Engine state lives in `bevy_ecs` resources. Rider actions go through
//! [simulation::RideSimulation] (or the free functions in [dispatch]); time
//! moves only when the [runner] pops the next event off the [clock].

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod drivers;
pub mod error;
pub mod geo;
pub mod jitter;
pub mod lifecycle;
pub mod pricing;
pub mod ride;
pub mod runner;
pub mod scenario;
pub mod simulation;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::DispatchConfig;
pub use error::{DispatchError, PreconditionError};
pub use geo::Coordinate;
pub use simulation::RideSimulation;
