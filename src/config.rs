use crate::error::{PregiError, Result};
use crate::models::{
    CropProfile, CropType, GrowthStage, IrrigationSystem, Location, SoilClass, SoilProfile,
};
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub field: FieldConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub climate: ClimateConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldConfig {
    pub name: String,
    pub soil_class: String,
    pub crop_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irrigation_system: Option<String>,
    #[serde(default)]
    pub location: Location,
    /// Measured hydraulic properties replacing the soil class table values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil: Option<SoilOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climatic_correction: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SoilOverride {
    pub field_capacity: f64,
    pub wilting_point: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infiltration_rate_mm_h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydraulic_conductivity_cm_day: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub horizon_hours: f64,
    pub step_duration_hours: f64,
    pub forecast_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 72.0,
            step_duration_hours: 1.0,
            forecast_seed: 42,
        }
    }
}

impl EngineConfig {
    pub fn horizon_steps(&self) -> usize {
        (self.horizon_hours / self.step_duration_hours).round() as usize
    }
}

/// Baseline climate for the synthetic forecast generator.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub mean_temperature_c: f64,
    /// Half the daily temperature swing
    pub temperature_amplitude_c: f64,
    pub mean_humidity_percent: f64,
    pub humidity_amplitude_percent: f64,
    pub mean_wind_speed_m_s: f64,
    /// Clear-sky noon radiation at the equator
    pub peak_solar_radiation_w_m2: f64,
    pub rain_probability_per_hour: f64,
    pub mean_rain_intensity_mm_h: f64,
    pub max_rain_intensity_mm_h: f64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            mean_temperature_c: 22.0,
            temperature_amplitude_c: 6.0,
            mean_humidity_percent: 60.0,
            humidity_amplitude_percent: 15.0,
            mean_wind_speed_m_s: 2.0,
            peak_solar_radiation_w_m2: 850.0,
            rain_probability_per_hour: 0.03,
            mean_rain_intensity_mm_h: 1.5,
            max_rain_intensity_mm_h: 20.0,
        }
    }
}

impl FieldConfig {
    pub fn soil_profile(&self) -> Result<SoilProfile> {
        let table = SoilClass::parse(&self.soil_class)?.profile();
        let profile = match self.soil {
            Some(measured) => SoilProfile::new(measured.field_capacity, measured.wilting_point)
                .with_rates(
                    measured
                        .infiltration_rate_mm_h
                        .unwrap_or(table.infiltration_rate_mm_h),
                    measured
                        .hydraulic_conductivity_cm_day
                        .unwrap_or(table.hydraulic_conductivity_cm_day),
                ),
            None => table,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn crop_profile(&self) -> Result<CropProfile> {
        let mut profile = CropType::parse(&self.crop_type)?.profile();
        if let Some(correction) = self.climatic_correction {
            profile = profile.with_climatic_correction(correction);
        }
        profile.validate()?;
        Ok(profile)
    }

    pub fn growth_stage(&self) -> Result<GrowthStage> {
        match self.growth_stage.as_deref() {
            None => Ok(GrowthStage::default()),
            Some(s) => GrowthStage::from_str(s)
                .ok_or_else(|| PregiError::UnknownProfile(format!("growth stage '{}'", s))),
        }
    }

    pub fn irrigation_system(&self) -> Result<IrrigationSystem> {
        match self.irrigation_system.as_deref() {
            None => Ok(IrrigationSystem::default()),
            Some(s) => IrrigationSystem::parse(s),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(PregiError::Config(format!(
                "Config file not found at {:?}. Run `pregi init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| PregiError::Config(format!("Failed to read config: {}", e)))?;

        let config_str = Self::substitute_env_vars(&config_str)?;

        let config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| PregiError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        tracing::debug!(path = %config_path.display(), field = %config.field.name, "config loaded");
        Ok(config)
    }

    /// Load the config if one can be found, otherwise fall back to defaults.
    /// An explicit path that does not exist is still an error.
    pub fn load_or_default(config_override: Option<PathBuf>) -> Result<Self> {
        if config_override.is_none() && !Self::exists(None) {
            tracing::debug!("no config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(config_override)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("pregi").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/pregi/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PregiError::Config("Cannot determine config directory".into()))?
            .join("pregi");
        Ok(config_dir.join("config.yaml"))
    }

    /// Check every field resolves and every number is in range.
    pub fn validate(&self) -> Result<()> {
        self.field.soil_profile()?;
        self.field.crop_profile()?;
        self.field.growth_stage()?;
        self.field.irrigation_system()?;

        let loc = &self.field.location;
        if !(-90.0..=90.0).contains(&loc.latitude) || !(-180.0..=180.0).contains(&loc.longitude) {
            return Err(PregiError::Config(format!(
                "location ({}, {}) out of range",
                loc.latitude, loc.longitude
            )));
        }

        let engine = &self.engine;
        if !(engine.step_duration_hours.is_finite() && engine.step_duration_hours > 0.0) {
            return Err(PregiError::Config(
                "engine.step_duration_hours must be positive".into(),
            ));
        }
        if engine.horizon_steps() == 0 {
            return Err(PregiError::Config(
                "engine.horizon_hours must cover at least one step".into(),
            ));
        }

        let climate = &self.climate;
        if !(0.0..=1.0).contains(&climate.rain_probability_per_hour) {
            return Err(PregiError::Config(
                "climate.rain_probability_per_hour must be within [0, 1]".into(),
            ));
        }
        if climate.mean_rain_intensity_mm_h < 0.0 || climate.max_rain_intensity_mm_h < 0.0 {
            return Err(PregiError::Config(
                "climate rain intensities must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up PREGI!");
        println!();

        println!("Field");
        let name: String = Input::new()
            .with_prompt("  Field name")
            .default("North Plot".into())
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;

        let soil_class: String = Input::new()
            .with_prompt("  Soil class (sandy, sandy_loam, loam, silt_loam, clay_loam, clay)")
            .default("loam".into())
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;
        SoilClass::parse(&soil_class)?;

        let crop_type: String = Input::new()
            .with_prompt("  Crop (asparagus, tomato, wheat, maize, potato)")
            .default("asparagus".into())
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;
        CropType::parse(&crop_type)?;

        let growth_stage: String = Input::new()
            .with_prompt("  Growth stage (initial, development, mid_season, late_season)")
            .default("mid_season".into())
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;

        let irrigation_system: String = Input::new()
            .with_prompt("  Irrigation system (drip, sprinkler, flood, micro_sprinkler)")
            .default("drip".into())
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Location");
        let defaults = Location::default();
        let latitude: f64 = Input::new()
            .with_prompt("  Latitude")
            .default(defaults.latitude)
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;

        let longitude: f64 = Input::new()
            .with_prompt("  Longitude")
            .default(defaults.longitude)
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;

        let elevation_m: f64 = Input::new()
            .with_prompt("  Elevation (m)")
            .default(defaults.elevation_m)
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Forecast");
        let forecast_seed: u64 = Input::new()
            .with_prompt("  Synthetic forecast seed")
            .default(EngineConfig::default().forecast_seed)
            .interact_text()
            .map_err(|e| PregiError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            field: FieldConfig {
                name,
                soil_class,
                crop_type,
                growth_stage: Some(growth_stage),
                irrigation_system: Some(irrigation_system),
                location: Location::new(latitude, longitude).with_elevation(elevation_m),
                soil: None,
                climatic_correction: None,
            },
            engine: EngineConfig {
                forecast_seed,
                ..EngineConfig::default()
            },
            climate: ClimateConfig::default(),
        };
        config.validate()?;

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| PregiError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# PREGI Configuration\n# Generated by `pregi init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| PregiError::Config(format!("Bad substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field: FieldConfig {
                name: "North Plot".into(),
                soil_class: "loam".into(),
                crop_type: "asparagus".into(),
                growth_stage: None,
                irrigation_system: None,
                location: Location::default(),
                soil: None,
                climatic_correction: None,
            },
            engine: EngineConfig::default(),
            climate: ClimateConfig::default(),
        }
    }
}
