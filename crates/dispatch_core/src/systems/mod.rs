pub mod driver_jitter;
pub mod ride_timer;
