use super::{ForecastRequest, ForecastSource};
use crate::config::ClimateConfig;
use crate::error::{PregiError, Result};
use crate::models::{ForecastSeries, WeatherSample};
use chrono::{Duration, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Hour of the daily temperature peak, local solar time
const WARMEST_HOUR: f64 = 15.0;
/// Gaussian perturbations are cut at this many standard deviations
const NOISE_BOUND: f64 = 3.0;
const TEMPERATURE_NOISE_C: f64 = 1.0;
const HUMIDITY_NOISE_PERCENT: f64 = 4.0;
const WIND_NOISE_FRACTION: f64 = 0.3;
/// Fraction of clear-sky radiation left while it rains
const RAIN_CLOUD_FACTOR: f64 = 0.3;

/// Seeded synthetic weather: a diurnal baseline plus bounded noise.
///
/// Every step consumes the same number of draws from one `StdRng`, so a
/// given seed and request always reproduce the same series.
#[derive(Debug, Clone)]
pub struct WeatherForecastGenerator {
    seed: u64,
    climate: ClimateConfig,
}

impl WeatherForecastGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            climate: ClimateConfig::default(),
        }
    }

    pub fn with_climate(mut self, climate: ClimateConfig) -> Self {
        self.climate = climate;
        self
    }

    fn sample(
        &self,
        rng: &mut StdRng,
        request: &ForecastRequest,
        index: usize,
    ) -> WeatherSample {
        let c = &self.climate;
        let step_hours = request.step_duration_hours;
        let timestamp = request.start + step_offset(index as f64 * step_hours);

        // Fixed draw order per step
        let temp_noise = bounded_gaussian(rng);
        let humidity_noise = bounded_gaussian(rng);
        let wind_noise = bounded_gaussian(rng);
        let rain_draw: f64 = rng.gen();
        let rain_amount_draw: f64 = rng.gen();
        let cloud_draw: f64 = rng.gen();

        let midpoint = timestamp + step_offset(step_hours / 2.0);
        let solar_hour = (midpoint.hour() as f64
            + midpoint.minute() as f64 / 60.0
            + request.location.longitude / 15.0)
            .rem_euclid(24.0);

        // Daily or longer steps average the diurnal cycle out
        let (cycle, daylight) = if step_hours >= 24.0 {
            (0.0, 1.0 / PI)
        } else {
            (
                (2.0 * PI * (solar_hour - WARMEST_HOUR) / 24.0).cos(),
                (PI * (solar_hour - 6.0) / 12.0).sin().max(0.0),
            )
        };

        let rain_chance = (c.rain_probability_per_hour * step_hours).min(1.0);
        let precipitation_mm = if rain_draw < rain_chance {
            let intensity = -(1.0 - rain_amount_draw).ln() * c.mean_rain_intensity_mm_h;
            intensity.min(c.max_rain_intensity_mm_h) * step_hours
        } else {
            0.0
        };

        let cloud = if precipitation_mm > 0.0 {
            RAIN_CLOUD_FACTOR
        } else {
            1.0 - 0.3 * cloud_draw
        };
        let latitude_factor = 0.4 + 0.6 * request.location.latitude.to_radians().cos();

        WeatherSample {
            timestamp,
            precipitation_mm,
            temperature_c: c.mean_temperature_c
                + c.temperature_amplitude_c * cycle
                + TEMPERATURE_NOISE_C * temp_noise,
            relative_humidity_percent: (c.mean_humidity_percent
                - c.humidity_amplitude_percent * cycle
                + HUMIDITY_NOISE_PERCENT * humidity_noise)
                .clamp(10.0, 100.0),
            wind_speed_m_s: (c.mean_wind_speed_m_s * (1.0 + WIND_NOISE_FRACTION * wind_noise))
                .max(0.0),
            solar_radiation_w_m2: c.peak_solar_radiation_w_m2 * latitude_factor * daylight * cloud,
        }
    }
}

impl ForecastSource for WeatherForecastGenerator {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn generate_forecast(&self, request: &ForecastRequest) -> Result<ForecastSeries> {
        request.validate()?;
        if !(-90.0..=90.0).contains(&request.location.latitude) {
            return Err(PregiError::validation(format!(
                "latitude {} outside [-90, 90]",
                request.location.latitude
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let samples = (0..request.horizon_steps)
            .map(|i| self.sample(&mut rng, request, i))
            .collect();

        tracing::debug!(
            seed = self.seed,
            steps = request.horizon_steps,
            "synthetic forecast generated"
        );

        Ok(ForecastSeries {
            location: request.location,
            start: request.start,
            step_duration_hours: request.step_duration_hours,
            samples,
        })
    }
}

fn step_offset(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}

/// Standard normal draw (Box-Muller) cut to ±3σ.
fn bounded_gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z.clamp(-NOISE_BOUND, NOISE_BOUND)
}
