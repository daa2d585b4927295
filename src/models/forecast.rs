use crate::error::{PregiError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Plot location used to shape the forecast and the psychrometric constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation_m: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m: 0.0,
        }
    }

    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    /// Offset of local solar time from UTC, in whole hours.
    pub fn solar_offset_hours(&self) -> i64 {
        (self.longitude / 15.0).round() as i64
    }
}

impl Default for Location {
    fn default() -> Self {
        // Central Po valley, where the methodology was first trialled
        Self {
            latitude: 45.07,
            longitude: 9.69,
            elevation_m: 60.0,
        }
    }
}

/// One forecast time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    /// Precipitation accumulated over the step (mm).
    pub precipitation_mm: f64,
    pub temperature_c: f64,
    pub relative_humidity_percent: f64,
    /// Wind speed at 2 m (m/s).
    pub wind_speed_m_s: f64,
    /// Mean global solar radiation over the step (W/m²).
    pub solar_radiation_w_m2: f64,
}

impl WeatherSample {
    pub fn validate(&self) -> Result<()> {
        if !(self.precipitation_mm.is_finite() && self.precipitation_mm >= 0.0) {
            return Err(PregiError::validation(format!(
                "precipitation must be a non-negative number, got {} at {}",
                self.precipitation_mm, self.timestamp
            )));
        }
        let fields = [
            self.temperature_c,
            self.relative_humidity_percent,
            self.wind_speed_m_s,
            self.solar_radiation_w_m2,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(PregiError::validation(format!(
                "non-finite meteorology at {}",
                self.timestamp
            )));
        }
        Ok(())
    }
}

/// Chronological forecast covering a fixed horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub location: Location,
    pub start: DateTime<Utc>,
    pub step_duration_hours: f64,
    pub samples: Vec<WeatherSample>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn horizon_hours(&self) -> f64 {
        self.samples.len() as f64 * self.step_duration_hours
    }

    pub fn total_precipitation_mm(&self) -> f64 {
        self.samples.iter().map(|s| s.precipitation_mm).sum()
    }

    /// Keep only the first `steps` samples.
    pub fn truncated(&self, steps: usize) -> Self {
        Self {
            location: self.location,
            start: self.start,
            step_duration_hours: self.step_duration_hours,
            samples: self.samples.iter().take(steps).copied().collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.samples.is_empty() {
            return Err(PregiError::validation("forecast series is empty"));
        }
        if !(self.step_duration_hours.is_finite() && self.step_duration_hours > 0.0) {
            return Err(PregiError::validation(format!(
                "step duration must be positive, got {}",
                self.step_duration_hours
            )));
        }
        for sample in &self.samples {
            sample.validate()?;
        }
        if self
            .samples
            .windows(2)
            .any(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(PregiError::validation(
                "forecast samples must be in strictly chronological order",
            ));
        }
        Ok(())
    }

    /// Aggregate the series by UTC calendar day.
    pub fn daily_summary(&self) -> Vec<DailyForecast> {
        let mut days: Vec<DailyForecast> = Vec::new();
        for sample in &self.samples {
            let date = sample.timestamp.date_naive();
            match days.last_mut() {
                Some(day) if day.date == date => day.absorb(sample),
                _ => days.push(DailyForecast::from_sample(date, sample)),
            }
        }
        days
    }
}

/// Aggregated daily view of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub high_temp_c: f64,
    pub low_temp_c: f64,
    pub avg_humidity: f64,
    pub total_precipitation_mm: f64,
    pub avg_wind_speed_m_s: f64,
    pub peak_solar_w_m2: f64,
    #[serde(skip)]
    samples: usize,
}

impl DailyForecast {
    fn from_sample(date: NaiveDate, sample: &WeatherSample) -> Self {
        Self {
            date,
            high_temp_c: sample.temperature_c,
            low_temp_c: sample.temperature_c,
            avg_humidity: sample.relative_humidity_percent,
            total_precipitation_mm: sample.precipitation_mm,
            avg_wind_speed_m_s: sample.wind_speed_m_s,
            peak_solar_w_m2: sample.solar_radiation_w_m2,
            samples: 1,
        }
    }

    fn absorb(&mut self, sample: &WeatherSample) {
        let n = self.samples as f64;
        self.high_temp_c = self.high_temp_c.max(sample.temperature_c);
        self.low_temp_c = self.low_temp_c.min(sample.temperature_c);
        self.avg_humidity = (self.avg_humidity * n + sample.relative_humidity_percent) / (n + 1.0);
        self.avg_wind_speed_m_s = (self.avg_wind_speed_m_s * n + sample.wind_speed_m_s) / (n + 1.0);
        self.total_precipitation_mm += sample.precipitation_mm;
        self.peak_solar_w_m2 = self.peak_solar_w_m2.max(sample.solar_radiation_w_m2);
        self.samples += 1;
    }
}
