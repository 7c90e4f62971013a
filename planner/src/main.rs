use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use planner::{
    error::CliError,
    geometry::bounding_box,
    gpx_export::{encode_route_as_gpx, write_route_gpx},
    models::{EnrichedRoute, ParkingSpot, PoiCategory, PointOfInterest, RouteSet},
    presentation, App, Endpoint, PlanOutcome, PlannerConfig, WeatherStatus,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Margin around the start/end box when fetching traffic signals.
const SIGNAL_MARGIN_KM: f64 = 1.0;

#[derive(Debug, Parser)]
#[command(author, version, about = "Compare driving, cycling and walking routes across the city")]
struct Cli {
    /// JSON config file; environment variables override its values
    #[arg(long, global = true, env = "PLANNER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan routes between two places
    Plan(PlanArgs),
    /// Show current weather and riding advice
    Weather,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Start address or `lat,lon`
    #[arg(long)]
    from: String,

    /// Destination address or `lat,lon`
    #[arg(long)]
    to: String,

    /// Rider weight in kg, used for calorie estimates
    #[arg(long)]
    weight: Option<f64>,

    /// Points of interest to list along the recommended route
    #[arg(long, value_delimiter = ',')]
    poi: Vec<PoiCategory>,

    /// List paid parking near the destination
    #[arg(long)]
    parking: bool,

    /// Walking leg from the N-th parking spot (1-based) to the destination
    #[arg(long, value_name = "N")]
    walk_from_parking: Option<usize>,

    /// Write the recommended route as GPX
    #[arg(long)]
    gpx: Option<PathBuf>,

    /// Print the route set as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanJson<'a> {
    #[serde(flatten)]
    routes: &'a RouteSet,
    gpx_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points_of_interest: Option<&'a [PointOfInterest]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parking: Option<&'a [ParkingSpot]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_mile_walk: Option<&'a EnrichedRoute>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(Cli::parse()).await {
        tracing::debug!("{err:?}");
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = PlannerConfig::load(cli.config.as_deref())?;
    let app = App::from_config(config)?;

    match cli.command {
        Command::Plan(args) => plan(&app, args).await,
        Command::Weather => {
            println!("{}", weather_text(&app).await);
            Ok(())
        }
    }
}

async fn weather_text(app: &App) -> String {
    match app.weather().await {
        WeatherStatus::Loaded(report) => {
            presentation::weather_line(&report, &app.config().services.city_name)
        }
        WeatherStatus::Unavailable => presentation::WEATHER_UNAVAILABLE.to_string(),
    }
}

async fn plan(app: &App, args: PlanArgs) -> Result<(), CliError> {
    let from = app.locate(Endpoint::Start, &args.from).await?;
    let to = app.locate(Endpoint::End, &args.to).await?;
    if !args.json {
        println!("{}", presentation::location_found(&from.display_name));
        println!("{}", presentation::location_found(&to.display_name));
    }

    if let Some(view) = bounding_box(&[from.coord, to.coord]) {
        // Planning still works without signals; the failure is already logged.
        let _ = app.refresh_signals(view.padded(SIGNAL_MARGIN_KM)).await;
    }

    let set = match app.plan(args.weight).await? {
        PlanOutcome::Committed(set) => set,
        PlanOutcome::Superseded => {
            return Err(CliError::Usage("route plan was superseded".into()));
        }
    };

    let pois = if args.poi.is_empty() {
        None
    } else {
        Some(app.points_of_interest(&args.poi).await?)
    };
    let spots = if args.parking || args.walk_from_parking.is_some() {
        Some(app.parking().await?)
    } else {
        None
    };
    let walk = match (args.walk_from_parking, &spots) {
        (Some(n), Some(spots)) => {
            let spot = n
                .checked_sub(1)
                .and_then(|i| spots.get(i))
                .ok_or_else(|| CliError::Usage(format!("no parking spot #{n}")))?;
            Some(app.last_mile_walk(spot, args.weight).await?)
        }
        _ => None,
    };

    if args.json {
        let gpx_base64 = match set.active_geometry() {
            Some(geometry) => Some(encode_route_as_gpx(&geometry.path)?),
            None => None,
        };
        let output = PlanJson {
            routes: set.as_ref(),
            gpx_base64,
            points_of_interest: pois.as_deref(),
            parking: spots.as_deref(),
            last_mile_walk: walk.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_route_set(&set);
        if let Some(pois) = &pois {
            println!("{}", presentation::pois_found(pois.len()));
            for poi in pois {
                println!("  {} {} ({})", poi.icon(), poi.display_name(), poi.coord);
            }
        }
        if let Some(spots) = &spots {
            println!(
                "{}",
                presentation::parking_found(spots.len(), app.config().proximity.parking_radius_m)
            );
            for (i, spot) in spots.iter().enumerate() {
                println!("  {}. P {} ({})", i + 1, spot.display_name(), spot.coord);
            }
        }
        if let Some(walk) = &walk {
            println!("{}", presentation::last_mile_walk_status(walk));
        }
    }

    if let Some(path) = &args.gpx {
        if let Some(route) = set.recommended_route() {
            write_route_gpx(route, path)?;
        }
    }

    Ok(())
}

fn print_route_set(set: &RouteSet) {
    let legend: Vec<String> = presentation::legend(set)
        .into_iter()
        .map(|entry| format!("{} ({})", entry.label, entry.color))
        .collect();
    println!("Routes: {}", legend.join(", "));
    println!("Recommended: {}", set.recommended.label());

    let summary = presentation::summary(set);
    if let Some(banner) = &summary.time_saved {
        println!("{banner}");
    }
    for block in &summary.blocks {
        println!("{}", block.headline);
        if let Some(health) = &block.health {
            println!("  {health}");
        }
    }
}
