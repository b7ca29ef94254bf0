//! Ride lifecycle: rider actions and the timer-driven state machine.
//!
//! Every transition of the active ride goes through [RideSession]. Rider
//! actions (`select_driver`, `request_ride`, `cancel_ride`) are called by the
//! session facade; clock deliveries are routed here by the ride timer system
//! through [RideSession::on_timer]. The ride owns at most one live
//! [crate::clock::TimerHandle]; arming a new one always cancels or replaces
//! the previous one.

use tracing::{debug, info, trace, warn};

use crate::clock::{Event, EventKind, SimulationClock, TimerPhase};
use crate::config::DispatchConfig;
use crate::drivers::{Driver, DriverDirectory, DriverId, RankedDriver};
use crate::error::{DispatchError, PreconditionError};
use crate::geo::{distance_km, Coordinate};
use crate::pricing::{eta_minutes, FareEstimator, TripQuote};
use crate::ride::{Ride, RideReceipt, RideSession, RideStatus};
use crate::telemetry::{CompletedRideRecord, DispatchTelemetry, RideFeed, RideNotice};

/// Shared resources a ride transition reads or writes.
pub struct DispatchContext<'a> {
    pub config: &'a DispatchConfig,
    pub directory: &'a DriverDirectory,
    pub clock: &'a mut SimulationClock,
    pub feed: &'a mut RideFeed,
    pub telemetry: &'a mut DispatchTelemetry,
}

impl DispatchContext<'_> {
    fn pickup_eta(&self, driver: &Driver, pickup: Coordinate) -> u32 {
        eta_minutes(
            distance_km(driver.position, pickup),
            self.config.assumed_speed_km_per_min,
            self.config.min_pickup_eta_min,
        )
    }

    fn driver_name(&self, id: DriverId) -> String {
        self.directory
            .get(id)
            .map(|driver| driver.name.clone())
            .unwrap_or_default()
    }
}

impl RideSession {
    /// Update the pickup selection. A ride that is not requested yet follows
    /// the new pickup and gets a fresh pickup ETA.
    pub fn set_pickup(&mut self, pickup: Coordinate, ctx: &mut DispatchContext) {
        self.pickup = Some(pickup);
        let Some(ride) = self.ride.as_mut() else {
            return;
        };
        if ride.status != RideStatus::Unrequested {
            return;
        }
        ride.pickup = pickup;
        if let Some(driver) = ctx.directory.get(ride.driver) {
            ride.eta_to_pickup_min = ctx.pickup_eta(driver, pickup);
        }
    }

    /// Update the dropoff selection. Requested rides keep their frozen dropoff.
    pub fn set_dropoff(&mut self, dropoff: Coordinate) {
        self.dropoff = Some(dropoff);
        if let Some(ride) = self.ride.as_mut() {
            if ride.status == RideStatus::Unrequested {
                ride.dropoff = Some(dropoff);
            }
        }
    }

    /// Distance and fare between the selected pickup and dropoff.
    pub fn quote(&self, config: &DispatchConfig) -> Result<TripQuote, PreconditionError> {
        let pickup = self.pickup.ok_or(PreconditionError::MissingPickup)?;
        let dropoff = self.dropoff.ok_or(PreconditionError::MissingDropoff)?;
        Ok(FareEstimator::from(config).quote(pickup, dropoff))
    }

    /// Drivers ordered by distance to the selected pickup.
    pub fn ranked_drivers(
        &self,
        directory: &DriverDirectory,
    ) -> Result<Vec<RankedDriver>, PreconditionError> {
        let pickup = self.pickup.ok_or(PreconditionError::MissingPickup)?;
        Ok(directory.ranked_by_distance(pickup))
    }

    /// Bind `id` to the ride, creating the ride if needed.
    ///
    /// Re-binding is allowed until a driver has accepted; after that the
    /// driver is locked in.
    pub fn select_driver(
        &mut self,
        id: DriverId,
        ctx: &mut DispatchContext,
    ) -> Result<&Ride, DispatchError> {
        let status = self.status();
        if status.is_dispatched() {
            return Err(PreconditionError::DriverLocked(status).into());
        }
        let pickup = match self.ride.as_ref() {
            Some(ride) if ride.status == RideStatus::Requested => ride.pickup,
            _ => self.pickup.ok_or(PreconditionError::MissingPickup)?,
        };
        let driver = ctx
            .directory
            .get(id)
            .ok_or(DispatchError::UnknownDriver(id))?;
        let eta = ctx.pickup_eta(driver, pickup);

        let ride = match self.ride.take() {
            Some(mut ride) => {
                ride.driver = id;
                ride.eta_to_pickup_min = eta;
                ride
            }
            None => Ride::assigned(pickup, self.dropoff, id, eta),
        };
        debug!(
            driver = %id,
            eta_to_pickup_min = eta,
            status = %ride.status,
            "driver bound to ride"
        );
        ctx.feed.push(
            ctx.clock.now(),
            ride.status,
            RideNotice::DriverAssigned {
                driver_id: id,
                driver_name: driver.name.clone(),
                eta_to_pickup_min: eta,
            },
        );
        Ok(&*self.ride.insert(ride))
    }

    /// Submit the ride. Auto-assigns the nearest driver when none is bound.
    ///
    /// While the ride is still `Requested`, requesting again cancels the
    /// pending dispatch timer and starts it over. Once a driver has accepted,
    /// further requests are rejected.
    pub fn request_ride(
        &mut self,
        ctx: &mut DispatchContext,
    ) -> Result<RideReceipt, DispatchError> {
        let pickup = self.pickup.ok_or(PreconditionError::MissingPickup)?;
        let dropoff = self.dropoff.ok_or(PreconditionError::MissingDropoff)?;
        let status = self.status();
        if status.is_dispatched() {
            return Err(PreconditionError::RideInProgress(status).into());
        }

        let driver_id = match self.ride.as_ref() {
            Some(ride) => ride.driver,
            None => {
                let nearest = ctx
                    .directory
                    .nearest(pickup)
                    .ok_or(DispatchError::NoDriverAvailable)?;
                debug!(driver = %nearest.id, "auto-assigning nearest driver");
                self.select_driver(nearest.id, ctx)?.driver
            }
        };
        let driver = ctx
            .directory
            .get(driver_id)
            .ok_or(DispatchError::UnknownDriver(driver_id))?;
        let eta = ctx.pickup_eta(driver, pickup);
        let quote = FareEstimator::from(ctx.config).quote(pickup, dropoff);

        if let Some(previous) = self.ride.as_ref().and_then(|ride| ride.timer) {
            ctx.clock.cancel(previous);
            debug!("re-request cancelled pending dispatch timer");
        }
        let now = ctx.clock.now();
        let timer = ctx
            .clock
            .schedule_in(ctx.config.dispatch_delay_ms(), EventKind::RideTimer);

        let mut ride = Ride::assigned(pickup, Some(dropoff), driver_id, eta);
        ride.status = RideStatus::Requested;
        ride.quote = Some(quote);
        ride.requested_at = Some(now);
        ride.timer = Some(timer);
        self.ride = Some(ride);

        if status != RideStatus::Requested {
            ctx.telemetry.rides_requested += 1;
        }
        info!(
            driver = %driver_id,
            eta_to_pickup_min = eta,
            distance_km = quote.distance_km,
            fare = quote.fare,
            "ride requested"
        );
        ctx.feed.push(
            now,
            RideStatus::Requested,
            RideNotice::Requested {
                driver_id,
                driver_name: driver.name.clone(),
                eta_to_pickup_min: eta,
                fare: quote.fare,
            },
        );

        Ok(RideReceipt {
            driver: driver_id,
            driver_name: driver.name.clone(),
            eta_to_pickup_min: eta,
            quote,
        })
    }

    /// Drop the active ride and its timer.
    pub fn cancel_ride(&mut self, ctx: &mut DispatchContext) -> Result<Ride, DispatchError> {
        let ride = self.ride.take().ok_or(PreconditionError::NoActiveRide)?;
        if let Some(timer) = ride.timer {
            ctx.clock.cancel(timer);
        }
        ctx.telemetry.rides_cancelled += 1;
        info!(driver = %ride.driver, status = %ride.status, "ride cancelled");
        ctx.feed.push(
            ctx.clock.now(),
            ride.status,
            RideNotice::RideCancelled {
                driver_id: ride.driver,
            },
        );
        Ok(ride)
    }

    /// Advance the ride for one delivery of its timer.
    ///
    /// Deliveries from any handle other than the ride's current one are stale
    /// and ignored.
    pub fn on_timer(&mut self, event: &Event, ctx: &mut DispatchContext) {
        let Some(ride) = self.ride.as_mut() else {
            trace!(handle = ?event.handle, "timer delivered with no active ride");
            return;
        };
        if ride.timer != Some(event.handle) {
            trace!(handle = ?event.handle, "stale ride timer ignored");
            return;
        }

        let now = ctx.clock.now();
        let driver_name = ctx.driver_name(ride.driver);
        let mut completed = false;

        match (ride.status, event.phase) {
            (RideStatus::Requested, TimerPhase::Fired) => {
                ride.status = RideStatus::Accepted;
                ride.accepted_at = Some(now);
                ride.remaining_min = Some(ride.eta_to_pickup_min);
                ride.timer = Some(
                    ctx.clock
                        .schedule_countdown(ride.eta_to_pickup_min, EventKind::RideTimer),
                );
                debug!(
                    driver = %ride.driver,
                    eta_to_pickup_min = ride.eta_to_pickup_min,
                    "driver accepted"
                );
                ctx.feed.push(
                    now,
                    ride.status,
                    RideNotice::DriverAccepted {
                        driver_name,
                        eta_to_pickup_min: ride.eta_to_pickup_min,
                    },
                );
            }
            (
                RideStatus::Accepted | RideStatus::EnRouteToPickup,
                TimerPhase::Tick { remaining },
            ) => {
                ride.status = RideStatus::EnRouteToPickup;
                ride.remaining_min = Some(remaining);
                ctx.feed.push(
                    now,
                    ride.status,
                    RideNotice::DriverEnRoute {
                        driver_name,
                        remaining_min: remaining,
                    },
                );
            }
            (RideStatus::EnRouteToPickup, TimerPhase::Complete) => {
                ride.status = RideStatus::ArrivedAtPickup;
                ride.remaining_min = None;
                ride.timer = Some(
                    ctx.clock
                        .schedule_in(ctx.config.arrival_buffer_ms(), EventKind::RideTimer),
                );
                debug!(driver = %ride.driver, "driver arrived at pickup");
                ctx.feed.push(
                    now,
                    ride.status,
                    RideNotice::DriverArrived { driver_name },
                );
            }
            (RideStatus::ArrivedAtPickup, TimerPhase::Fired) => {
                let Some(dropoff) = ride.dropoff else {
                    warn!("ride reached pickup without a dropoff");
                    return;
                };
                let eta = eta_minutes(
                    distance_km(ride.pickup, dropoff),
                    ctx.config.assumed_speed_km_per_min,
                    ctx.config.min_dropoff_eta_min,
                );
                ride.status = RideStatus::InProgress;
                ride.pickup_at = Some(now);
                ride.eta_to_dropoff_min = Some(eta);
                ride.remaining_min = Some(eta);
                ride.timer = Some(ctx.clock.schedule_countdown(eta, EventKind::RideTimer));
                debug!(eta_to_dropoff_min = eta, "trip started");
                ctx.feed.push(
                    now,
                    ride.status,
                    RideNotice::TripStarted {
                        eta_to_dropoff_min: eta,
                    },
                );
            }
            (RideStatus::InProgress, TimerPhase::Tick { remaining }) => {
                ride.remaining_min = Some(remaining);
                ctx.feed.push(
                    now,
                    ride.status,
                    RideNotice::TripProgress {
                        remaining_min: remaining,
                    },
                );
            }
            (RideStatus::InProgress, TimerPhase::Complete) => {
                ride.status = RideStatus::Completed;
                ride.remaining_min = None;
                ride.timer = None;
                completed = true;
            }
            (status, phase) => {
                warn!(%status, ?phase, "unexpected ride timer delivery ignored");
            }
        }

        if completed {
            if let Some(ride) = self.ride.take() {
                record_completion(ride, now, ctx);
            }
        }
    }
}

fn record_completion(ride: Ride, now: u64, ctx: &mut DispatchContext) {
    let quote = ride.quote.unwrap_or(TripQuote {
        distance_km: 0.0,
        fare: 0,
    });
    ctx.telemetry.rides_completed += 1;
    ctx.telemetry.completed_rides.push(CompletedRideRecord {
        driver: ride.driver,
        distance_km: quote.distance_km,
        fare: quote.fare,
        requested_at: ride.requested_at.unwrap_or(now),
        accepted_at: ride.accepted_at.unwrap_or(now),
        pickup_at: ride.pickup_at.unwrap_or(now),
        completed_at: now,
    });
    info!(driver = %ride.driver, fare = quote.fare, "ride completed");
    ctx.feed.push(
        now,
        RideStatus::Completed,
        RideNotice::RideCompleted { fare: quote.fare },
    );
}
