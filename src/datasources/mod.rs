pub mod fixture;
pub mod synthetic;

pub use fixture::FixtureForecast;
pub use synthetic::WeatherForecastGenerator;

use crate::error::{PregiError, Result};
use crate::models::{ForecastSeries, Location};
use chrono::{DateTime, Utc};

/// Longest step a forecast may use (one leap year)
pub const MAX_STEP_HOURS: f64 = 24.0 * 366.0;
/// Longest horizon a forecast may cover
pub const MAX_HORIZON_HOURS: f64 = 10.0 * MAX_STEP_HOURS;

/// What a forecast must cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub location: Location,
    pub start: DateTime<Utc>,
    pub horizon_steps: usize,
    pub step_duration_hours: f64,
}

impl ForecastRequest {
    pub fn new(
        location: Location,
        start: DateTime<Utc>,
        horizon_steps: usize,
        step_duration_hours: f64,
    ) -> Self {
        Self {
            location,
            start,
            horizon_steps,
            step_duration_hours,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_steps == 0 {
            return Err(PregiError::validation("forecast horizon must be at least one step"));
        }
        if !(self.step_duration_hours.is_finite() && self.step_duration_hours > 0.0) {
            return Err(PregiError::validation(format!(
                "step duration must be positive, got {}",
                self.step_duration_hours
            )));
        }
        if self.step_duration_hours > MAX_STEP_HOURS {
            return Err(PregiError::validation(format!(
                "step duration {} h exceeds {} h",
                self.step_duration_hours, MAX_STEP_HOURS
            )));
        }
        let horizon_hours = self.horizon_steps as f64 * self.step_duration_hours;
        if horizon_hours > MAX_HORIZON_HOURS {
            return Err(PregiError::validation(format!(
                "forecast horizon {} h exceeds {} h",
                horizon_hours, MAX_HORIZON_HOURS
            )));
        }
        Ok(())
    }
}

/// Anything that can supply a meteorological forecast for a plot.
///
/// A live weather client would implement this too; the simulator and the
/// decision logic only ever see the returned series.
pub trait ForecastSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate_forecast(&self, request: &ForecastRequest) -> Result<ForecastSeries>;
}
