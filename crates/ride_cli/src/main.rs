mod scenario;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ride_core::config::RideConfig;
use ride_core::eta::{EtaProvider, FixedSpeedEta};
use ride_core::geo::Location;
use ride_core::graph::SpatialGraph;
use ride_core::matching::{CancellationToken, DriverId, DriverMatcher, MatchOutcome, RiderId};
use ride_core::navigation::{plan_trip, CachedRouteProvider, GraphRouteProvider, RouteProvider};
use ride_core::service::MatchService;
use serde_json::json;
use tracing::info;
use tracing_subscriber::prelude::*;

use crate::scenario::Scenario;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ride",
    about = "Match riders to drivers and plan routes over a scenario file"
)]
struct Cli {
    /// JSON config overriding the default matcher, graph and OSRM settings
    #[arg(long, global = true, env = "RIDE_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick the best available driver for the scenario's rider
    Match {
        #[arg(long)]
        scenario: PathBuf,
        /// OSRM endpoint for live ETAs (requires the `osrm` feature)
        #[arg(long)]
        osrm: Option<String>,
    },
    /// Shortest path over the scenario's road graph
    Route {
        #[arg(long)]
        scenario: PathBuf,
        /// Start as `lat,lng`
        #[arg(long, allow_hyphen_values = true)]
        from: Location,
        /// End as `lat,lng`
        #[arg(long, allow_hyphen_values = true)]
        to: Location,
    },
    /// Plan driver -> rider -> dropoff for one driver of the scenario
    Trip {
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long)]
        driver: u64,
        /// Dropoff as `lat,lng`
        #[arg(long, allow_hyphen_values = true)]
        dropoff: Location,
        /// OSRM endpoint used before falling back to the graph (requires the `osrm` feature)
        #[arg(long)]
        osrm: Option<String>,
    },
    /// Record a rating and print the driver's new average
    Rate {
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long)]
        driver: u64,
        #[arg(long)]
        rider: u64,
        #[arg(long)]
        score: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RideConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RideConfig::default(),
    };

    match cli.command {
        Commands::Match { scenario, osrm } => run_match(&config, &scenario, osrm.as_deref()),
        Commands::Route { scenario, from, to } => run_route(&config, &scenario, from, to),
        Commands::Trip {
            scenario,
            driver,
            dropoff,
            osrm,
        } => run_trip(&config, &scenario, DriverId(driver), dropoff, osrm.as_deref()),
        Commands::Rate {
            scenario,
            driver,
            rider,
            score,
        } => run_rate(&scenario, DriverId(driver), RiderId(rider), score),
    }
}

// ── Commands ───────────────────────────────────────────────────────

fn run_match(config: &RideConfig, path: &Path, osrm: Option<&str>) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let graph = Arc::new(scenario.graph(&config.graph)?);
    let matcher = DriverMatcher::with_config(graph, config.matcher.clone());
    let service = MatchService::new(
        matcher,
        Arc::new(scenario.driver_store()),
        Arc::new(scenario.rating_store()?),
        build_eta(config, osrm)?,
    )
    .with_eta_pool()
    .context("failed to start ETA lookup pool")?;

    match service.match_rider_concurrent(&scenario.rider, &CancellationToken::new()) {
        MatchOutcome::Matched(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        MatchOutcome::NoMatch | MatchOutcome::Cancelled => println!("no suitable driver"),
    }
    Ok(())
}

fn run_route(config: &RideConfig, path: &Path, from: Location, to: Location) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let graph = Arc::new(scenario.graph(&config.graph)?);
    let result = graph.shortest_path(from, to);
    if !result.is_found() {
        println!("no route from {from} to {to}");
        return Ok(());
    }

    let leg =
        GraphRouteProvider::with_speed(graph, config.navigation.avg_speed_kmh).route(from, to);
    let output = json!({
        "path": result.path,
        "cost": result.cost,
        "distance_km": leg.as_ref().map(|leg| leg.distance_km),
        "duration_secs": leg.as_ref().map(|leg| leg.duration_secs),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_trip(
    config: &RideConfig,
    path: &Path,
    driver_id: DriverId,
    dropoff: Location,
    osrm: Option<&str>,
) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let Some(driver) = scenario.drivers.iter().find(|d| d.id == driver_id) else {
        bail!("{driver_id} is not part of the scenario");
    };
    let graph = Arc::new(scenario.graph(&config.graph)?);
    let provider = build_route_provider(config, graph, osrm)?;

    let plan = plan_trip(&provider, driver.location, scenario.rider.location, dropoff)?;
    info!(
        driver = %driver_id,
        distance_km = plan.total_distance_km,
        duration_secs = plan.total_duration_secs,
        "trip planned"
    );
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn run_rate(path: &Path, driver_id: DriverId, rider_id: RiderId, score: f64) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let average = rate_driver(&scenario, driver_id, rider_id, score)?;

    let output = json!({ "driver_id": driver_id, "new_average_rating": average });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// New rounded average of `driver_id` after replaying the scenario's ratings
/// and adding this one.
fn rate_driver(
    scenario: &Scenario,
    driver_id: DriverId,
    rider_id: RiderId,
    score: f64,
) -> Result<f64> {
    if !scenario.drivers.iter().any(|d| d.id == driver_id) {
        bail!("{driver_id} is not part of the scenario");
    }
    let ratings = scenario.rating_store()?;
    Ok(ratings.submit(rider_id, driver_id, score)?)
}

// ── Collaborators ──────────────────────────────────────────────────

fn build_eta(config: &RideConfig, osrm: Option<&str>) -> Result<Arc<dyn EtaProvider>> {
    match osrm {
        None => Ok(Arc::new(FixedSpeedEta::new(config.navigation.avg_speed_kmh))),
        #[cfg(feature = "osrm")]
        Some(endpoint) => Ok(Arc::new(osrm_client(config, endpoint)?)),
        #[cfg(not(feature = "osrm"))]
        Some(_) => bail!("OSRM support is not compiled in; rebuild with `--features osrm`"),
    }
}

fn build_route_provider(
    config: &RideConfig,
    graph: Arc<SpatialGraph>,
    osrm: Option<&str>,
) -> Result<CachedRouteProvider> {
    let capacity = config.navigation.route_cache_capacity;
    let graph_provider = GraphRouteProvider::with_speed(graph, config.navigation.avg_speed_kmh);
    match osrm {
        None => Ok(CachedRouteProvider::new(Box::new(graph_provider), capacity)),
        #[cfg(feature = "osrm")]
        Some(endpoint) => Ok(
            CachedRouteProvider::new(Box::new(osrm_client(config, endpoint)?), capacity)
                .with_fallback(Box::new(graph_provider)),
        ),
        #[cfg(not(feature = "osrm"))]
        Some(_) => bail!("OSRM support is not compiled in; rebuild with `--features osrm`"),
    }
}

#[cfg(feature = "osrm")]
fn osrm_client(config: &RideConfig, endpoint: &str) -> Result<ride_core::osrm::OsrmClient> {
    let osrm_config = ride_core::config::OsrmConfig {
        endpoint: endpoint.to_string(),
        ..config.osrm.clone()
    };
    Ok(ride_core::osrm::OsrmClient::new(&osrm_config)?)
}
