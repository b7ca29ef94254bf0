use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::minutes_to_ms;
use crate::error::DispatchError;
use crate::pricing::{BASE_FARE, PER_KM_RATE};

/// Tariff, timing and jitter constants for one dispatch session.
///
/// All durations are in simulated minutes. Deserializes from partial JSON;
/// missing fields fall back to the reference values.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Flat part of every fare.
    pub base_fare: f64,
    /// Fare added per kilometer of straight-line distance.
    pub per_km_fare: f64,
    /// Assumed driving speed used for ETAs (0.6 km/min is about 36 km/h).
    pub assumed_speed_km_per_min: f64,
    /// Latency between a ride request and the driver accepting it.
    pub dispatch_delay_min: f64,
    /// Pause between the driver arriving and the trip starting.
    pub arrival_buffer_min: f64,
    /// Lower bound for the pickup ETA.
    pub min_pickup_eta_min: u32,
    /// Lower bound for the dropoff ETA.
    pub min_dropoff_eta_min: u32,
    /// Full width (degrees) of the uniform per-axis jitter applied to drivers.
    pub jitter_magnitude_deg: f64,
    /// Cadence of automatic driver jitter; `None` disables it.
    pub jitter_interval_min: Option<f64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            base_fare: BASE_FARE,
            per_km_fare: PER_KM_RATE,
            assumed_speed_km_per_min: 0.6,
            dispatch_delay_min: 2.0,
            arrival_buffer_min: 1.5,
            min_pickup_eta_min: 2,
            min_dropoff_eta_min: 3,
            jitter_magnitude_deg: 0.0015,
            jitter_interval_min: Some(5.0),
        }
    }
}

impl DispatchConfig {
    pub fn with_tariff(mut self, base_fare: f64, per_km_fare: f64) -> Self {
        self.base_fare = base_fare;
        self.per_km_fare = per_km_fare;
        self
    }

    pub fn with_assumed_speed(mut self, km_per_min: f64) -> Self {
        self.assumed_speed_km_per_min = km_per_min;
        self
    }

    pub fn with_dispatch_delay(mut self, minutes: f64) -> Self {
        self.dispatch_delay_min = minutes;
        self
    }

    pub fn with_arrival_buffer(mut self, minutes: f64) -> Self {
        self.arrival_buffer_min = minutes;
        self
    }

    pub fn with_jitter(mut self, magnitude_deg: f64, interval_min: Option<f64>) -> Self {
        self.jitter_magnitude_deg = magnitude_deg;
        self.jitter_interval_min = interval_min;
        self
    }

    /// Disable the recurring jitter timer (manual `tick_jitter` still works).
    pub fn without_jitter_timer(mut self) -> Self {
        self.jitter_interval_min = None;
        self
    }

    /// Reject values the timeline and tariff cannot work with.
    ///
    /// Speed must be finite and positive. Fares, delays and the jitter
    /// magnitude must be finite and non-negative. A jitter interval, when set,
    /// must be finite; zero or negative still means "disabled".
    pub fn validate(&self) -> Result<(), DispatchError> {
        let speed = self.assumed_speed_km_per_min;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(invalid("assumed_speed_km_per_min", speed));
        }
        for (field, value) in [
            ("base_fare", self.base_fare),
            ("per_km_fare", self.per_km_fare),
            ("dispatch_delay_min", self.dispatch_delay_min),
            ("arrival_buffer_min", self.arrival_buffer_min),
            ("jitter_magnitude_deg", self.jitter_magnitude_deg),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, value));
            }
        }
        if let Some(interval) = self.jitter_interval_min {
            if !interval.is_finite() {
                return Err(invalid("jitter_interval_min", interval));
            }
        }
        Ok(())
    }

    pub fn dispatch_delay_ms(&self) -> u64 {
        minutes_to_ms(self.dispatch_delay_min)
    }

    pub fn arrival_buffer_ms(&self) -> u64 {
        minutes_to_ms(self.arrival_buffer_min)
    }

    /// Recurring jitter cadence; a zero or negative interval counts as disabled.
    pub fn jitter_interval_ms(&self) -> Option<u64> {
        self.jitter_interval_min
            .map(minutes_to_ms)
            .filter(|ms| *ms > 0)
    }
}

fn invalid(field: &'static str, value: f64) -> DispatchError {
    DispatchError::InvalidConfig { field, value }
}
