mod report;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use healthmap_core::{Coordinate, PlaceKind};
use healthmap_engine::{Nearby, Outcome, SessionStatus, ThreadRandom};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "healthmap-cli")]
#[command(about = "Find hospitals and supermarkets nearby and plan a route to one")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Use a device-reported position
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Geocode a free-text place name
    Search {
        query: String,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Search around a point picked on the map, without geocoding
    Pick {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Area name used for "Near ..." addresses
        #[arg(long)]
        context: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Debug, Args)]
struct ViewArgs {
    /// Only list places of this kind (hospital or grocery)
    #[arg(long)]
    kind: Option<PlaceKind>,
    /// Plan a route to the Nth listed place (1-based)
    #[arg(long, value_name = "N")]
    directions: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = healthmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "loaded configuration");

    let cli = Cli::parse();
    let nearby = Nearby::from_app_config(&config, Arc::new(ThreadRandom))?;

    let view = match cli.command {
        Commands::Locate { lat, lon, view } => {
            let position = Coordinate {
                latitude: lat,
                longitude: lon,
            };
            nearby.locate(Ok(position)).await;
            view
        }
        Commands::Search { query, view } => {
            if nearby.search(&query).await == Outcome::Ignored {
                anyhow::bail!("search query is empty");
            }
            view
        }
        Commands::Pick {
            lat,
            lon,
            context,
            view,
        } => {
            let point = Coordinate {
                latitude: lat,
                longitude: lon,
            };
            if nearby.pick(point, context.as_deref()).await == Outcome::Ignored {
                anyhow::bail!("coordinate {lat}, {lon} is out of range");
            }
            view
        }
    };

    let state = nearby.snapshot().await;
    if let SessionStatus::Error(message) = &state.status {
        anyhow::bail!("{message}");
    }
    let listed = report::print_places(&state, view.kind);

    if let Some(n) = view.directions {
        let place = n
            .checked_sub(1)
            .and_then(|i| listed.get(i))
            .ok_or_else(|| anyhow::anyhow!("no place #{n}; {} listed", listed.len()))?;
        println!();
        println!("Directions to {}", place.name);
        nearby.directions_to(place.id).await;
        report::print_route(&nearby.snapshot().await);
    }

    Ok(())
}
