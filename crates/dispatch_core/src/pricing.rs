//! Fare and ETA estimation from straight-line distance.

use serde::{Deserialize, Serialize};

use crate::config::DispatchConfig;
use crate::geo::{distance_km, Coordinate};

/// Default base fare in minor currency units.
pub const BASE_FARE: f64 = 2000.0;

/// Default per-kilometer rate in minor currency units.
pub const PER_KM_RATE: f64 = 800.0;

/// Tariff used to turn a distance into an integer fare.
///
/// Formula: `fare = round(base_fare + per_km_fare * distance_km)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareEstimator {
    pub base_fare: f64,
    pub per_km_fare: f64,
}

impl Default for FareEstimator {
    fn default() -> Self {
        Self {
            base_fare: BASE_FARE,
            per_km_fare: PER_KM_RATE,
        }
    }
}

impl FareEstimator {
    pub fn new(base_fare: f64, per_km_fare: f64) -> Self {
        Self {
            base_fare,
            per_km_fare,
        }
    }

    /// Estimate the fare for a trip of `distance_km`. Distance must be non-negative.
    pub fn estimate(&self, distance_km: f64) -> u64 {
        debug_assert!(distance_km >= 0.0, "distance must be non-negative");
        (self.base_fare + self.per_km_fare * distance_km)
            .round()
            .max(0.0) as u64
    }

    /// Distance and fare between two points.
    pub fn quote(&self, pickup: Coordinate, dropoff: Coordinate) -> TripQuote {
        let distance_km = distance_km(pickup, dropoff);
        TripQuote {
            distance_km,
            fare: self.estimate(distance_km),
        }
    }
}

impl From<&DispatchConfig> for FareEstimator {
    fn from(config: &DispatchConfig) -> Self {
        Self::new(config.base_fare, config.per_km_fare)
    }
}

/// Distance/fare payload shown to the rider before requesting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripQuote {
    pub distance_km: f64,
    pub fare: u64,
}

/// Whole simulated minutes to cover `distance_km` at `speed_km_per_min`, never below `floor_min`.
///
/// A zero, negative or NaN speed yields `floor_min`.
pub fn eta_minutes(distance_km: f64, speed_km_per_min: f64, floor_min: u32) -> u32 {
    let minutes = (distance_km / speed_km_per_min).round();
    if minutes.is_finite() && minutes > floor_min as f64 {
        minutes.min(u32::MAX as f64) as u32
    } else {
        floor_min
    }
}
