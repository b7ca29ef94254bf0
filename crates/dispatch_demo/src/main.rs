//! Terminal rider: pick two points, request a ride and watch it play out.
//!
//! Run with: cargo run -p dispatch_demo -- --pickup "41.30, 69.25" --dropoff "41.32, 69.26"

mod logging;

use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use dispatch_core::clock::ONE_MIN_MS;
use dispatch_core::drivers::DriverId;
use dispatch_core::scenario::ScenarioParams;
use dispatch_core::telemetry::{RideNotice, RideUpdate};
use dispatch_core::{Coordinate, DispatchConfig, RideSimulation};
use tracing::info;

/// Upper bound on events processed for one ride.
const MAX_STEPS: usize = 10_000;

#[derive(Parser)]
#[command(
    name = "dispatch_demo",
    about = "Simulate one ride from request to dropoff",
    long_about = "Picks the nearest driver to the pickup, quotes the fare and plays\n\
                  the ride through acceptance, pickup and dropoff on a simulated clock."
)]
struct Cli {
    /// Pickup as "lat, lng"
    #[arg(long, default_value = "41.30, 69.25")]
    pickup: Coordinate,
    /// Dropoff as "lat, lng"
    #[arg(long, default_value = "41.32, 69.26")]
    dropoff: Coordinate,
    /// Ride with this driver instead of the nearest one
    #[arg(long)]
    driver: Option<u32>,
    /// Seed for driver movement
    #[arg(long, env = "DISPATCH_SEED")]
    seed: Option<u64>,
    /// JSON file overriding tariff and timing defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the ride feed as JSON lines
    #[arg(long)]
    json: bool,
    /// Log state transitions
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<DispatchConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            let config: DispatchConfig = serde_json::from_str(&raw)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(DispatchConfig::default()),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_ref())?;
    let mut params = ScenarioParams::default().with_config(config);
    if let Some(seed) = cli.seed {
        params = params.with_seed(seed);
    }
    let mut sim = RideSimulation::new(params)?;

    sim.set_pickup(cli.pickup);
    sim.set_dropoff(cli.dropoff);

    let quote = sim.quote()?;
    println!("Trip: {:.2} km, fare {} so'm", quote.distance_km, quote.fare);
    println!("Drivers near pickup:");
    for ranked in sim.ranked_drivers()? {
        println!(
            "  {} {:<8} {:<16} {:.2} km",
            ranked.driver.id, ranked.driver.name, ranked.driver.vehicle_label, ranked.distance_km
        );
    }

    if let Some(id) = cli.driver {
        sim.select_driver(DriverId(id))?;
    }
    let receipt = sim.request_ride()?;
    info!(driver = %receipt.driver, "ride requested from demo");

    print_updates(&sim.drain_updates(), cli.json)?;
    let mut steps = 0;
    while sim.active_ride().is_some() && steps < MAX_STEPS && sim.step() {
        steps += 1;
        print_updates(&sim.drain_updates(), cli.json)?;
    }

    let telemetry = sim.telemetry();
    if let Some(record) = telemetry.completed_rides.last() {
        println!(
            "Done in {} simulated min ({} driver moves).",
            record.completed_at.saturating_sub(record.requested_at) / ONE_MIN_MS,
            telemetry.jitter_rounds
        );
    }
    Ok(())
}

fn print_updates(updates: &[RideUpdate], json: bool) -> Result<(), serde_json::Error> {
    for update in updates {
        if json {
            println!("{}", serde_json::to_string(update)?);
        } else {
            println!("[{:>3} min] {}", update.at_ms / ONE_MIN_MS, describe(&update.notice));
        }
    }
    Ok(())
}

fn describe(notice: &RideNotice) -> String {
    match notice {
        RideNotice::DriverAssigned {
            driver_name,
            eta_to_pickup_min,
            ..
        } => format!("{driver_name} selected, {eta_to_pickup_min} min away"),
        RideNotice::Requested {
            driver_name,
            eta_to_pickup_min,
            fare,
            ..
        } => format!(
            "Ride requested. {driver_name} arrives in about {eta_to_pickup_min} min. Fare {fare} so'm"
        ),
        RideNotice::DriverAccepted {
            driver_name,
            eta_to_pickup_min,
        } => format!("{driver_name} accepted the ride, {eta_to_pickup_min} min to pickup"),
        RideNotice::DriverEnRoute {
            driver_name,
            remaining_min,
        } => format!("{driver_name} is on the way ({remaining_min} min)"),
        RideNotice::DriverArrived { driver_name } => format!("{driver_name} has arrived"),
        RideNotice::TripStarted { eta_to_dropoff_min } => {
            format!("Trip started, {eta_to_dropoff_min} min to destination")
        }
        RideNotice::TripProgress { remaining_min } => {
            format!("{remaining_min} min to destination")
        }
        RideNotice::RideCompleted { fare } => format!("Arrived. Fare {fare} so'm"),
        RideNotice::RideCancelled { driver_id } => format!("Ride with {driver_id} cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn coordinates_parse_from_flags() {
        let cli = Cli::parse_from(["dispatch_demo", "--pickup", "41.31, 69.24", "--driver", "3"]);
        assert_eq!(cli.pickup, Coordinate::new(41.31, 69.24).expect("pickup"));
        assert_eq!(cli.dropoff, Coordinate::new(41.32, 69.26).expect("dropoff"));
        assert_eq!(cli.driver, Some(3));
        assert!(Cli::try_parse_from(["dispatch_demo", "--pickup", "91, 0"]).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/dispatch.json");
        assert!(load_config(Some(&path)).is_err());
        assert_eq!(load_config(None).expect("defaults"), DispatchConfig::default());
    }

    #[test]
    fn zero_speed_config_file_is_rejected() {
        let path = std::env::temp_dir()
            .join(format!("dispatch_zero_speed_{}.json", std::process::id()));
        fs::write(&path, r#"{"assumed_speed_km_per_min": 0}"#).expect("write config");
        let result = load_config(Some(&path));
        fs::remove_file(&path).expect("remove config");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("assumed_speed_km_per_min"), "{err}");
    }

    #[test]
    fn notices_read_as_sentences() {
        let text = describe(&RideNotice::DriverEnRoute {
            driver_name: "Dilshod".to_string(),
            remaining_min: 2,
        });
        assert_eq!(text, "Dilshod is on the way (2 min)");
    }
}
