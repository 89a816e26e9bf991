//! Print the area definition (and optionally band summaries) of a scene.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use imager_common::ResolutionTag;
use imager_reader::{ReaderConfig, Scene};

#[derive(Parser, Debug)]
#[command(name = "fy4-area")]
#[command(about = "Derive FY-4 area definitions and calibrate bands from a YAML scene")]
struct Args {
    /// Scene file (YAML dump of a Level-1 file)
    #[arg(short, long)]
    scene: String,

    /// Bands to load, e.g. C07 (repeatable)
    #[arg(short, long)]
    band: Vec<String>,

    /// Navigation variables to load, e.g. NOMSunZenith (repeatable)
    #[arg(short, long)]
    navigation: Vec<String>,

    /// Resolution of the area to print when nothing is loaded
    #[arg(short, long)]
    resolution: Option<String>,

    /// Reader configuration file (defaults come from the environment)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "IMAGER_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = match &args.config {
        Some(path) => ReaderConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => ReaderConfig::from_env()?,
    };

    let scene = Scene::from_yaml_file(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene))?;
    info!(file = %scene.file_name, "Loaded scene");
    let orchestrator = scene.into_orchestrator(config)?;

    if args.band.is_empty() && args.navigation.is_empty() {
        let resolution = match &args.resolution {
            Some(res) => res.parse::<ResolutionTag>()?,
            None => orchestrator
                .file_info()
                .resolution
                .context("File name carries no resolution; pass --resolution")?,
        };
        let area = orchestrator.area(resolution)?;
        println!("{}", serde_json::to_string_pretty(area.as_ref())?);
        return Ok(());
    }

    let bands = orchestrator.load_bands(args.band.as_slice())?;
    let mut summary: Vec<_> = bands
        .iter()
        .map(|band| {
            json!({
                "name": band.name,
                "resolution": band.resolution,
                "quantity": band.quantity,
                "shape": band.shape(),
                "value_range": band.value_range(),
                "area": band.area.as_ref(),
                "attrs": band.attrs,
            })
        })
        .collect();
    for name in &args.navigation {
        let dataset = orchestrator.load_navigation(name)?;
        summary.push(json!({
            "name": dataset.name,
            "resolution": dataset.resolution,
            "shape": dataset.shape(),
            "area": dataset.area.as_ref(),
            "attrs": dataset.attrs,
        }));
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
