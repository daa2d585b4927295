mod cli;

use anyhow::Context;
use chrono::{DateTime, Duration, DurationRound, Utc};
use clap::Parser;
use cli::{Cli, Commands, DecideArgs, ForecastArgs, ProfileArgs};
use pregi::datasources::{
    FixtureForecast, ForecastRequest, ForecastSource, WeatherForecastGenerator,
};
use pregi::logic::{compute_threshold, DecisionContext, IrrigationDecisionEngine};
use pregi::models::{ForecastSeries, IrrigationDecision};
use pregi::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => {
            Config::setup_interactive().context("interactive setup failed")?;
        }
        Commands::Check => check(cli.config)?,
        Commands::Threshold(args) => threshold(cli.config, &args)?,
        Commands::Forecast(args) => forecast(cli.config, &args)?,
        Commands::Decide(args) => decide(cli.config, &args)?,
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(
    path: Option<PathBuf>,
    profile: &ProfileArgs,
    forecast: Option<&ForecastArgs>,
) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(path).context("failed to load configuration")?;
    if let Some(soil) = &profile.soil {
        config.field.soil_class = soil.clone();
        config.field.soil = None;
    }
    if let Some(crop) = &profile.crop {
        config.field.crop_type = crop.clone();
    }
    if let Some(args) = forecast {
        if let Some(hours) = args.horizon_hours {
            config.engine.horizon_hours = hours;
        }
        if let Some(seed) = args.seed {
            config.engine.forecast_seed = seed;
        }
    }
    config.validate()?;
    Ok(config)
}

fn current_hour() -> anyhow::Result<DateTime<Utc>> {
    Ok(Utc::now().duration_trunc(Duration::hours(1))?)
}

fn check(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load(path).context("configuration check failed")?;
    let field = &config.field;
    let soil = field.soil_profile()?;
    let crop = field.crop_profile()?;
    let threshold = compute_threshold(&soil, &crop)?;

    println!("Config OK: {}", field.name);
    println!(
        "  Soil:      {} (FC {:.2}, WP {:.2}, intake {:.0} mm/h)",
        field.soil_class, soil.field_capacity, soil.wilting_point, soil.infiltration_rate_mm_h
    );
    println!(
        "  Crop:      {} (p {:.2}, root zone {:.1} m), {}",
        field.crop_type,
        crop.corrected_depletion_fraction(),
        crop.rooting_depth_m,
        field.growth_stage()?
    );
    println!("  System:    {}", field.irrigation_system()?);
    println!(
        "  Location:  {:.2}, {:.2} ({:.0} m)",
        field.location.latitude, field.location.longitude, field.location.elevation_m
    );
    println!(
        "  Forecast:  {} steps of {} h, seed {}",
        config.engine.horizon_steps(),
        config.engine.step_duration_hours,
        config.engine.forecast_seed
    );
    println!("  Threshold: {:.3} m³/m³", threshold.theta_crit);
    Ok(())
}

fn threshold(path: Option<PathBuf>, args: &ProfileArgs) -> anyhow::Result<()> {
    let config = resolve_config(path, args, None)?;
    let threshold = compute_threshold(&config.field.soil_profile()?, &config.field.crop_profile()?)?;
    let points = threshold.trigger_points();

    println!("{} on {}", config.field.crop_type, config.field.soil_class);
    println!("  TAW:        {:.3} m³/m³", threshold.taw);
    println!(
        "  RAW:        {:.3} m³/m³ (MAD {:.0}%)",
        threshold.raw,
        threshold.mad_percent()
    );
    println!("  Threshold:  {:.3} m³/m³", threshold.theta_crit);
    println!(
        "  Stress:     low < {:.3}, medium < {:.3}, high < {:.3}, critical < {:.3}",
        points.low, points.medium, points.high, points.critical
    );
    Ok(())
}

fn forecast(path: Option<PathBuf>, args: &ForecastArgs) -> anyhow::Result<()> {
    let config = resolve_config(path, &ProfileArgs::default(), Some(args))?;
    let generator = WeatherForecastGenerator::new(config.engine.forecast_seed)
        .with_climate(config.climate);
    let request = ForecastRequest::new(
        config.field.location,
        current_hour()?,
        config.engine.horizon_steps(),
        config.engine.step_duration_hours,
    );
    let series = generator.generate_forecast(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        print_forecast(&series);
    }
    Ok(())
}

fn decide(path: Option<PathBuf>, args: &DecideArgs) -> anyhow::Result<()> {
    let mut config = resolve_config(path, &args.profile, Some(&args.forecast))?;
    if let Some(stage) = &args.stage {
        config.field.growth_stage = Some(stage.clone());
    }
    if let Some(system) = &args.system {
        config.field.irrigation_system = Some(system.clone());
    }
    config.validate()?;

    let field = &config.field;
    let (source, as_of): (Box<dyn ForecastSource>, DateTime<Utc>) = match &args.forecast_file {
        Some(file) => {
            let fixture = FixtureForecast::from_path(file)
                .with_context(|| format!("failed to load forecast {}", file.display()))?;
            let start = fixture.series().start;
            (Box::new(fixture) as Box<dyn ForecastSource>, start)
        }
        None => {
            let generator = WeatherForecastGenerator::new(config.engine.forecast_seed)
                .with_climate(config.climate);
            (Box::new(generator) as Box<dyn ForecastSource>, current_hour()?)
        }
    };

    let engine = IrrigationDecisionEngine::new(source)
        .with_step_duration_hours(config.engine.step_duration_hours)
        .with_irrigation_system(field.irrigation_system()?);
    let ctx = DecisionContext::new(
        args.moisture,
        field.soil_profile()?,
        field.crop_profile()?,
        as_of,
    )
    .with_stage(field.growth_stage()?)
    .with_location(field.location)
    .with_horizon_steps(config.engine.horizon_steps());

    let decision = engine.decide(&ctx)?;

    if args.forecast.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        print_decision(&field.name, &decision);
    }
    Ok(())
}

fn print_forecast(series: &ForecastSeries) {
    println!(
        "Forecast for {:.2}, {:.2}: {} steps from {}",
        series.location.latitude,
        series.location.longitude,
        series.len(),
        series.start.format("%Y-%m-%d %H:%M UTC")
    );
    println!("  Date        High   Low    RH%   Rain mm  Wind m/s  Peak W/m²");
    for day in series.daily_summary() {
        println!(
            "  {}  {:5.1}  {:5.1}  {:4.0}  {:7.1}  {:8.1}  {:9.0}",
            day.date,
            day.high_temp_c,
            day.low_temp_c,
            day.avg_humidity,
            day.total_precipitation_mm,
            day.avg_wind_speed_m_s,
            day.peak_solar_w_m2
        );
    }
}

fn print_decision(field: &str, decision: &IrrigationDecision) {
    println!("{}: {}", field, decision.verdict);
    println!("  Confidence:       {:.0}%", decision.confidence * 100.0);
    println!("  Water:            {:.1} mm", decision.water_amount_mm);
    println!(
        "  Minimum moisture: {:.3} m³/m³ (threshold {:.3})",
        decision.minimum_forecasted_moisture, decision.threshold_used
    );
    if let Some(at) = decision.trigger_time {
        println!("  Trigger:          {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  Urgency:          {} ({})", decision.urgency, decision.timing);

    if let Some(plan) = &decision.application {
        println!(
            "  Plan ({}):      {:.1} mm gross, ${:.2}/ha",
            plan.system, plan.gross_water_mm, plan.total_cost_usd_per_ha
        );
        println!(
            "                    ${:.3}/mm/ha, {:.0}% less water than flood",
            plan.cost_per_mm_usd_per_ha, plan.water_savings_percent
        );
        for event in &plan.events {
            println!(
                "    {}  {:.1} mm over {:.1} h",
                event.start.format("%Y-%m-%d %H:%M UTC"),
                event.gross_mm,
                event.duration_hours
            );
        }
    }

    println!("  Rationale:");
    for line in &decision.rationale {
        println!("    - {}", line);
    }
}
