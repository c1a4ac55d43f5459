use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use rci::input::save_events;
use rci::recording::Event;
use rci::simulation::{DriveConfig, RoadProfile, generate_drive};

#[derive(Parser, Debug)]
#[command(name = "generate_drive")]
#[command(about = "Generate synthetic drive recordings as JSON-lines event files")]
struct Args {
    /// TOML road/drive configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Number of drives to generate
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Drive duration in seconds
    #[arg(short, long, default_value_t = 60.0)]
    duration: f64,

    /// Accelerometer rate in Hz
    #[arg(long, default_value_t = 50.0)]
    sample_rate: f64,

    /// Start time in milliseconds since the Unix epoch
    #[arg(long, default_value_t = 1_700_000_000_000)]
    start_ms: i64,

    /// Output filename prefix
    #[arg(long, default_value = "drive")]
    prefix: String,

    /// Surface roughness std dev in m/s² (CLI override)
    #[arg(long)]
    roughness: Option<f64>,

    /// Pothole rate in Hz (CLI override)
    #[arg(long)]
    pothole_rate: Option<f64>,

    /// Vehicle speed in m/s (CLI override)
    #[arg(long)]
    speed: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    road: Option<RoadProfile>,
    drive: Option<DriveConfig>,
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_road_profile(toml: &TomlConfig, args: &Args, seed: u64) -> RoadProfile {
    let mut profile = toml.road.clone().unwrap_or_default().with_seed(seed);

    if let Some(roughness) = args.roughness {
        profile.roughness_std = roughness;
    }
    if let Some(rate) = args.pothole_rate {
        profile = profile.with_potholes(rate, 3.0, 3);
    }

    profile
}

fn build_drive_config(toml: &TomlConfig, args: &Args) -> DriveConfig {
    let config = toml.drive.clone().unwrap_or_default();
    match args.speed {
        Some(speed) => config.with_speed(speed),
        None => config,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = match args.config {
        Some(ref config_path) => load_toml_config(config_path)?,
        None => TomlConfig::default(),
    };

    let base_seed = args.seed.unwrap_or(0);
    let drive = build_drive_config(&toml_config, &args);

    for trial in 0..args.trials {
        let seed = base_seed + trial as u64;
        let road = build_road_profile(&toml_config, &args, seed);

        let events: Vec<Event> =
            generate_drive(args.duration, args.sample_rate, args.start_ms, &road, &drive)
                .context("Failed to generate drive")?;

        let filename = format!("{}_t{:02}.jsonl", args.prefix, trial);
        let filepath = args.output_dir.join(&filename);
        save_events(&filepath, &events).context("Failed to write event file")?;

        eprint!("\rGenerating: {}/{}", trial + 1, args.trials);
    }
    eprintln!();

    eprintln!(
        "Generated {} files in {}",
        args.trials,
        args.output_dir.display()
    );
    Ok(())
}
