use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dataset::{DataLoader, FileSource};
use globe::GlobeConfig;
use layers::{RenderSet, centroid_circle_layer, polygon_fill_layer};
use serde_json::json;
use tools::report::{DatasetReport, marker_rows};
use tools::simulate::{ScheduledAction, SimulationPlan, run};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mangrove dataset and globe tooling")]
struct Args {
    /// Globe config JSON (defaults apply to omitted keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a dataset and print its size tier and render statistics
    Inspect {
        /// GeoJSON FeatureCollection
        dataset: PathBuf,
    },

    /// Write the centroid marker source as GeoJSON
    Centroids {
        dataset: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print normalized regions for the first markers, one JSON object per line
    Regions {
        dataset: PathBuf,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Print the style layers added to the map
    Layers,

    /// Run the globe controller on a virtual clock and print what it did
    Simulate {
        dataset: PathBuf,

        /// Simulated time span
        #[arg(long, default_value_t = 10_000.0)]
        duration_ms: f64,

        /// Display refresh interval
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        frame_ms: f64,

        /// Scheduled input, `T:click:LNG,LAT` or `T:drag:MS` (repeatable)
        #[arg(long = "action")]
        actions: Vec<ScheduledAction>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GlobeConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GlobeConfig::default(),
    };

    match args.command {
        Command::Inspect { dataset } => {
            let (loader, collection) = load(&dataset);
            let report = DatasetReport::new(&loader, &collection, config.render.feature_cap);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Centroids { dataset, out } => {
            let (_, collection) = load(&dataset);
            let render = RenderSet::prepare(collection, config.render.feature_cap);
            let text = serde_json::to_string_pretty(&render.centroids_geojson())?;
            match out {
                Some(path) => {
                    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
                    info!(centroids = render.centroids().len(), path = %path.display(), "centroids written");
                }
                None => println!("{text}"),
            }
        }
        Command::Regions { dataset, limit } => {
            let (_, collection) = load(&dataset);
            let render = RenderSet::prepare(collection, config.render.feature_cap);
            for row in marker_rows(&render, limit) {
                println!("{}", serde_json::to_string(&row)?);
            }
        }
        Command::Layers => {
            let layers = json!([
                polygon_fill_layer().to_style_json(),
                centroid_circle_layer().to_style_json(),
            ]);
            println!("{}", serde_json::to_string_pretty(&layers)?);
        }
        Command::Simulate {
            dataset,
            duration_ms,
            frame_ms,
            actions,
        } => {
            let (_, collection) = load(&dataset);
            let plan = SimulationPlan {
                duration_ms,
                frame_interval_ms: frame_ms,
                actions,
            };
            let report = run(collection, config, &plan);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// Never fails: unreadable or invalid files fall back to the demo collection.
fn load(path: &Path) -> (DataLoader, Arc<formats::FeatureCollection>) {
    let mut loader = DataLoader::new();
    let collection = loader.load(&FileSource::new(path));
    (loader, collection)
}
