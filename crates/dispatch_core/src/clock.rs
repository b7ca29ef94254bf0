//! Simulated clock: a discrete event queue in simulation milliseconds.
//!
//! The ride timeline runs on simulated minutes (one real tick of the UI is one
//! simulated minute). Timers are either one-shot ([SimulationClock::schedule_in])
//! or minute countdowns ([SimulationClock::schedule_countdown]); both hand back a
//! [TimerHandle] that can be cancelled. A handle never has more than one event
//! queued, so deliveries for one timer are strictly sequential.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

pub const ONE_SEC_MS: u64 = 1000;
pub const ONE_MIN_MS: u64 = 60 * ONE_SEC_MS;

/// Convert (possibly fractional) simulated minutes to milliseconds.
/// Non-finite or negative input maps to zero.
pub fn minutes_to_ms(minutes: f64) -> u64 {
    if minutes.is_finite() && minutes > 0.0 {
        (minutes * ONE_MIN_MS as f64).round() as u64
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    RideTimer,
    JitterDrivers,
}

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// What a delivered event means for its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// A one-shot timer elapsed.
    Fired,
    /// A countdown step; `remaining` runs from the initial duration down to 0.
    Tick { remaining: u32 },
    /// The countdown finished. Delivered once, right after `Tick { remaining: 0 }`.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub handle: TimerHandle,
    pub phase: TimerPhase,
    seq: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp, then
        // kind, then insertion order.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.kind.cmp(&self.kind))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being handled by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    next_handle: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// One-shot timer delivered `delay_ms` from now with [TimerPhase::Fired].
    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind) -> TimerHandle {
        let at = self.now.saturating_add(delay_ms);
        self.schedule_at(at, kind)
    }

    /// One-shot timer at an absolute simulation time.
    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind) -> TimerHandle {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let handle = self.allocate_handle();
        self.push(timestamp.max(self.now), kind, handle, TimerPhase::Fired);
        handle
    }

    /// Countdown of `duration_min` simulated minutes.
    ///
    /// Delivers `Tick { remaining: duration_min }` now, then one tick per
    /// simulated minute down to `Tick { remaining: 0 }`, followed by a single
    /// `Complete` at the same timestamp as the last tick.
    pub fn schedule_countdown(&mut self, duration_min: u32, kind: EventKind) -> TimerHandle {
        let handle = self.allocate_handle();
        self.push(
            self.now,
            kind,
            handle,
            TimerPhase::Tick {
                remaining: duration_min,
            },
        );
        handle
    }

    /// Drop every remaining delivery for `handle`. Returns `false` if nothing was queued.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.handle != handle);
        self.events.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.events.iter().any(|event| event.handle == handle)
    }

    /// Number of timers with a queued delivery.
    pub fn pending_count(&self) -> usize {
        self.events.len()
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    /// Move `now` forward to `timestamp` across an idle stretch.
    ///
    /// Never goes back in time and never passes the next queued event, so no
    /// delivery is skipped.
    pub fn advance_to(&mut self, timestamp: u64) {
        let target = match self.next_event_time() {
            Some(next) => timestamp.min(next),
            None => timestamp,
        };
        self.now = self.now.max(target);
    }

    /// Pop the next event and advance `now` to its timestamp.
    ///
    /// Countdown ticks queue their successor before returning, so a countdown
    /// keeps running until it completes or is cancelled.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        if let TimerPhase::Tick { remaining } = event.phase {
            match remaining.checked_sub(1) {
                Some(next) => self.push(
                    event.timestamp.saturating_add(ONE_MIN_MS),
                    event.kind,
                    event.handle,
                    TimerPhase::Tick { remaining: next },
                ),
                None => self.push(
                    event.timestamp,
                    event.kind,
                    event.handle,
                    TimerPhase::Complete,
                ),
            }
        }
        Some(event)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn allocate_handle(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn push(&mut self, timestamp: u64, kind: EventKind, handle: TimerHandle, phase: TimerPhase) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            kind,
            handle,
            phase,
            seq,
        });
    }
}
