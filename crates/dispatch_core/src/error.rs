//! Error types returned by dispatch operations.
//!
//! Nothing here is fatal: every variant describes a rejected user action the
//! UI layer reports back (prompt for a location, "no driver available", ...).

use thiserror::Error;

use crate::drivers::DriverId;
use crate::geo::CoordinateError;
use crate::ride::RideStatus;

/// A guard on the ride session blocked the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("pickup location has not been set")]
    MissingPickup,

    #[error("dropoff location has not been set")]
    MissingDropoff,

    #[error("driver cannot be changed once the ride is {0}")]
    DriverLocked(RideStatus),

    #[error("a ride is already {0}")]
    RideInProgress(RideStatus),

    #[error("there is no active ride")]
    NoActiveRide,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("no driver available")]
    NoDriverAvailable,

    #[error("unknown driver {0}")]
    UnknownDriver(DriverId),

    #[error("driver {0} appears more than once in the roster")]
    DuplicateDriver(DriverId),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("invalid config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },
}

impl DispatchError {
    /// True for errors that mean "ask the user for more input" rather than a bad argument.
    pub fn is_precondition(&self) -> bool {
        matches!(self, DispatchError::Precondition(_))
    }
}
