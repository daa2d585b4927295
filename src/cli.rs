use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pregi",
    version,
    about = "Forecast-driven precision irrigation decisions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decide whether the field needs irrigation over the forecast horizon
    Decide(DecideArgs),
    /// Print the synthetic forecast for the configured location
    Forecast(ForecastArgs),
    /// Print the stress threshold for a soil and crop
    Threshold(ProfileArgs),
    /// Run interactive setup
    Init,
    /// Validate config and print the resolved profiles
    Check,
}

#[derive(Args, Default)]
pub struct ProfileArgs {
    /// Soil class (sandy, sandy_loam, loam, silt_loam, clay_loam, clay)
    #[arg(long)]
    pub soil: Option<String>,

    /// Crop (asparagus, tomato, wheat, maize, potato)
    #[arg(long)]
    pub crop: Option<String>,
}

#[derive(Args)]
pub struct DecideArgs {
    /// Current volumetric soil moisture estimate (m³/m³)
    #[arg(short, long)]
    pub moisture: f64,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Growth stage (initial, development, mid_season, late_season)
    #[arg(long)]
    pub stage: Option<String>,

    /// Irrigation system (drip, sprinkler, flood, micro_sprinkler)
    #[arg(long)]
    pub system: Option<String>,

    #[command(flatten)]
    pub forecast: ForecastArgs,

    /// Replay a recorded JSON forecast instead of generating one
    #[arg(long = "forecast", value_name = "JSON")]
    pub forecast_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ForecastArgs {
    /// Forecast horizon in hours
    #[arg(long)]
    pub horizon_hours: Option<f64>,

    /// Seed for the synthetic forecast
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}
