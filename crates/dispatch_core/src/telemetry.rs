//! Outbound ride feed and session KPIs.
//!
//! The feed is what the UI layer renders as status text; telemetry keeps
//! counters and one record per completed ride.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::drivers::DriverId;
use crate::ride::RideStatus;

/// Payload of one status update, with the numbers the UI needs to render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RideNotice {
    DriverAssigned {
        driver_id: DriverId,
        driver_name: String,
        eta_to_pickup_min: u32,
    },
    Requested {
        driver_id: DriverId,
        driver_name: String,
        eta_to_pickup_min: u32,
        fare: u64,
    },
    DriverAccepted {
        driver_name: String,
        eta_to_pickup_min: u32,
    },
    DriverEnRoute {
        driver_name: String,
        remaining_min: u32,
    },
    DriverArrived {
        driver_name: String,
    },
    TripStarted {
        eta_to_dropoff_min: u32,
    },
    TripProgress {
        remaining_min: u32,
    },
    RideCompleted {
        fare: u64,
    },
    RideCancelled {
        driver_id: DriverId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideUpdate {
    /// Simulation time of the update.
    pub at_ms: u64,
    /// Ride status after the update.
    pub status: RideStatus,
    #[serde(flatten)]
    pub notice: RideNotice,
}

/// Updates produced since the UI last drained the feed.
#[derive(Debug, Default, Resource)]
pub struct RideFeed {
    updates: Vec<RideUpdate>,
}

impl RideFeed {
    pub fn push(&mut self, at_ms: u64, status: RideStatus, notice: RideNotice) {
        self.updates.push(RideUpdate {
            at_ms,
            status,
            notice,
        });
    }

    pub fn updates(&self) -> &[RideUpdate] {
        &self.updates
    }

    pub fn last(&self) -> Option<&RideUpdate> {
        self.updates.last()
    }

    pub fn drain(&mut self) -> Vec<RideUpdate> {
        std::mem::take(&mut self.updates)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// One completed ride, recorded when the rider is dropped off.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRideRecord {
    pub driver: DriverId,
    pub distance_km: f64,
    pub fare: u64,
    pub requested_at: u64,
    pub accepted_at: u64,
    pub pickup_at: u64,
    pub completed_at: u64,
}

impl CompletedRideRecord {
    /// Time from request to driver acceptance.
    pub fn time_to_accept(&self) -> u64 {
        self.accepted_at.saturating_sub(self.requested_at)
    }

    /// Time from acceptance to the trip starting at pickup.
    pub fn time_to_pickup(&self) -> u64 {
        self.pickup_at.saturating_sub(self.accepted_at)
    }

    /// Time from pickup to dropoff.
    pub fn trip_duration(&self) -> u64 {
        self.completed_at.saturating_sub(self.pickup_at)
    }
}

#[derive(Debug, Default, Resource)]
pub struct DispatchTelemetry {
    /// Distinct rides requested; restarting the dispatch timer does not count.
    pub rides_requested: u64,
    pub rides_completed: u64,
    pub rides_cancelled: u64,
    pub jitter_rounds: u64,
    pub completed_rides: Vec<CompletedRideRecord>,
}
