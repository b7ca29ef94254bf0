use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::TimerHandle;
use crate::drivers::DriverId;
use crate::geo::Coordinate;
use crate::pricing::TripQuote;

/// Ride progress, in the only order a ride can move through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Unrequested,
    Requested,
    Accepted,
    EnRouteToPickup,
    ArrivedAtPickup,
    InProgress,
    Completed,
}

impl RideStatus {
    pub const ALL: [RideStatus; 7] = [
        RideStatus::Unrequested,
        RideStatus::Requested,
        RideStatus::Accepted,
        RideStatus::EnRouteToPickup,
        RideStatus::ArrivedAtPickup,
        RideStatus::InProgress,
        RideStatus::Completed,
    ];

    /// The status a ride moves to next, `None` once completed.
    pub fn next(self) -> Option<RideStatus> {
        match self {
            RideStatus::Unrequested => Some(RideStatus::Requested),
            RideStatus::Requested => Some(RideStatus::Accepted),
            RideStatus::Accepted => Some(RideStatus::EnRouteToPickup),
            RideStatus::EnRouteToPickup => Some(RideStatus::ArrivedAtPickup),
            RideStatus::ArrivedAtPickup => Some(RideStatus::InProgress),
            RideStatus::InProgress => Some(RideStatus::Completed),
            RideStatus::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == RideStatus::Completed
    }

    /// A driver has accepted and the ride can no longer be re-dispatched.
    pub fn is_dispatched(self) -> bool {
        matches!(
            self,
            RideStatus::Accepted
                | RideStatus::EnRouteToPickup
                | RideStatus::ArrivedAtPickup
                | RideStatus::InProgress
        )
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RideStatus::Unrequested => "unrequested",
            RideStatus::Requested => "requested",
            RideStatus::Accepted => "accepted",
            RideStatus::EnRouteToPickup => "en route to pickup",
            RideStatus::ArrivedAtPickup => "arrived at pickup",
            RideStatus::InProgress => "in progress",
            RideStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// The single active ride of a session.
///
/// `dropoff` can be missing only while the ride is `Unrequested`; requesting
/// freezes both endpoints. The driver is referenced by id and stays owned by
/// the [crate::drivers::DriverDirectory].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ride {
    pub pickup: Coordinate,
    pub dropoff: Option<Coordinate>,
    pub driver: DriverId,
    pub status: RideStatus,
    pub eta_to_pickup_min: u32,
    pub eta_to_dropoff_min: Option<u32>,
    /// Minutes left on the countdown currently running, if any.
    pub remaining_min: Option<u32>,
    pub quote: Option<TripQuote>,
    pub requested_at: Option<u64>,
    pub accepted_at: Option<u64>,
    pub pickup_at: Option<u64>,
    #[serde(skip)]
    pub(crate) timer: Option<TimerHandle>,
}

impl Ride {
    pub(crate) fn assigned(
        pickup: Coordinate,
        dropoff: Option<Coordinate>,
        driver: DriverId,
        eta_to_pickup_min: u32,
    ) -> Self {
        Self {
            pickup,
            dropoff,
            driver,
            status: RideStatus::Unrequested,
            eta_to_pickup_min,
            eta_to_dropoff_min: None,
            remaining_min: None,
            quote: None,
            requested_at: None,
            accepted_at: None,
            pickup_at: None,
            timer: None,
        }
    }

    /// Handle of the timer driving this ride, if one is armed.
    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }
}

/// What the rider gets back from a successful request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideReceipt {
    pub driver: DriverId,
    pub driver_name: String,
    pub eta_to_pickup_min: u32,
    pub quote: TripQuote,
}

/// Rider selections plus the active ride, if any.
///
/// Selections outlive rides: after completion the same pickup/dropoff can be
/// requested again.
#[derive(Debug, Default, Resource)]
pub struct RideSession {
    pub(crate) pickup: Option<Coordinate>,
    pub(crate) dropoff: Option<Coordinate>,
    pub(crate) ride: Option<Ride>,
}

impl RideSession {
    pub fn pickup(&self) -> Option<Coordinate> {
        self.pickup
    }

    pub fn dropoff(&self) -> Option<Coordinate> {
        self.dropoff
    }

    pub fn ride(&self) -> Option<&Ride> {
        self.ride.as_ref()
    }

    /// Status of the active ride; `Unrequested` when there is none.
    pub fn status(&self) -> RideStatus {
        self.ride
            .as_ref()
            .map(|ride| ride.status)
            .unwrap_or(RideStatus::Unrequested)
    }

    /// A ride has been requested and has not finished yet.
    pub fn is_riding(&self) -> bool {
        !matches!(self.status(), RideStatus::Unrequested | RideStatus::Completed)
    }
}
