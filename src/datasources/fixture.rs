use super::{ForecastRequest, ForecastSource};
use crate::error::{PregiError, Result};
use crate::models::ForecastSeries;
use std::path::Path;

/// Replays a recorded forecast instead of generating one.
#[derive(Debug, Clone)]
pub struct FixtureForecast {
    series: ForecastSeries,
}

impl FixtureForecast {
    pub fn new(series: ForecastSeries) -> Self {
        Self { series }
    }

    /// Load a JSON-encoded `ForecastSeries`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let series: ForecastSeries = serde_json::from_str(&content)?;
        series.validate()?;
        tracing::debug!(path = %path.display(), steps = series.len(), "loaded forecast fixture");
        Ok(Self::new(series))
    }

    pub fn series(&self) -> &ForecastSeries {
        &self.series
    }
}

impl ForecastSource for FixtureForecast {
    fn name(&self) -> &'static str {
        "fixture"
    }

    /// The recorded location and start time are kept; only the horizon is
    /// taken from the request.
    fn generate_forecast(&self, request: &ForecastRequest) -> Result<ForecastSeries> {
        request.validate()?;
        if (self.series.step_duration_hours - request.step_duration_hours).abs() > 1e-9 {
            return Err(PregiError::validation(format!(
                "fixture steps are {} h, {} h requested",
                self.series.step_duration_hours, request.step_duration_hours
            )));
        }
        if self.series.len() < request.horizon_steps {
            return Err(PregiError::validation(format!(
                "fixture covers {} steps, {} requested",
                self.series.len(),
                request.horizon_steps
            )));
        }
        Ok(self.series.truncated(request.horizon_steps))
    }
}
