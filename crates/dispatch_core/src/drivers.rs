//! Driver roster: positions, nearest-driver lookup and simulated movement.
//!
//! The roster is small and fixed for a session, so queries are linear scans in
//! roster order. Roster order is also the tie-breaker: among drivers at the
//! same distance the one listed first wins.

use std::collections::HashSet;
use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::geo::{distance_km, Coordinate};
use crate::jitter::JitterSource;

/// City centre the reference roster is placed around (Tashkent).
pub const REFERENCE_CENTER: Coordinate = Coordinate::new_unchecked(41.311081, 69.240562);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub u32);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub vehicle_label: String,
    pub position: Coordinate,
}

impl Driver {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        vehicle_label: impl Into<String>,
        position: Coordinate,
    ) -> Self {
        Self {
            id: DriverId(id),
            name: name.into(),
            vehicle_label: vehicle_label.into(),
            position,
        }
    }
}

/// A driver snapshot annotated with its distance to a reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDriver {
    #[serde(flatten)]
    pub driver: Driver,
    pub distance_km: f64,
}

/// The four demo drivers around [REFERENCE_CENTER].
pub fn reference_roster() -> Vec<Driver> {
    vec![
        Driver::new(1, "Ali", "Chevrolet Nexia", Coordinate::new_unchecked(41.316, 69.281)),
        Driver::new(2, "Dilshod", "Spark", Coordinate::new_unchecked(41.299, 69.240)),
        Driver::new(3, "Mira", "Gentra", Coordinate::new_unchecked(41.327, 69.220)),
        Driver::new(4, "Javlon", "Cobalt", Coordinate::new_unchecked(41.305, 69.210)),
    ]
}

/// All drivers known to the session, in roster order.
#[derive(Debug, Clone, Default, Resource)]
pub struct DriverDirectory {
    drivers: Vec<Driver>,
}

impl DriverDirectory {
    /// Build a directory, rejecting rosters that reuse an id.
    pub fn new(drivers: Vec<Driver>) -> Result<Self, DispatchError> {
        let mut seen = HashSet::with_capacity(drivers.len());
        for driver in &drivers {
            if !seen.insert(driver.id) {
                return Err(DispatchError::DuplicateDriver(driver.id));
            }
        }
        Ok(Self { drivers })
    }

    /// Directory over [reference_roster].
    pub fn reference() -> Self {
        Self {
            drivers: reference_roster(),
        }
    }

    pub fn all(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn get(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.iter().find(|driver| driver.id == id)
    }

    /// Closest driver to `to`; `None` when the roster is empty.
    pub fn nearest(&self, to: Coordinate) -> Option<&Driver> {
        let mut best: Option<(&Driver, f64)> = None;
        for driver in &self.drivers {
            let dist = distance_km(to, driver.position);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((driver, dist)),
            }
        }
        best.map(|(driver, _)| driver)
    }

    /// Every driver with its distance to `to`, closest first. Equal distances keep roster order.
    pub fn ranked_by_distance(&self, to: Coordinate) -> Vec<RankedDriver> {
        let mut ranked: Vec<RankedDriver> = self
            .drivers
            .iter()
            .map(|driver| RankedDriver {
                driver: driver.clone(),
                distance_km: distance_km(to, driver.position),
            })
            .collect();
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked
    }

    /// Nudge every driver by `(u - 0.5) * magnitude_deg` on each axis.
    ///
    /// Samples are drawn in roster order, latitude before longitude.
    pub fn jitter_positions(&mut self, magnitude_deg: f64, source: &mut dyn JitterSource) {
        for driver in &mut self.drivers {
            let dlat = (source.next_unit() - 0.5) * magnitude_deg;
            let dlon = (source.next_unit() - 0.5) * magnitude_deg;
            driver.position = driver.position.offset(dlat, dlon);
        }
    }
}
