//! Root-zone water balance.
//!
//! - `step()`: one forecast step → `WaterBalanceStep`
//! - `simulate()`: full no-intervention trajectory over a forecast

use super::evapotranspiration::reference_et;
use crate::error::{PregiError, Result};
use crate::models::{
    CropProfile, ForecastSeries, GrowthStage, SimulationTrajectory, SoilProfile,
    WaterBalanceStep, WeatherSample,
};

/// Slack allowed for float rounding before a pre-clamp value counts as escaped.
const BAND_TOLERANCE: f64 = 1e-9;

/// Static inputs shared by every step of one simulation.
#[derive(Debug, Clone, Copy)]
pub struct BalanceParams<'a> {
    pub soil: &'a SoilProfile,
    pub crop: &'a CropProfile,
    pub stage: GrowthStage,
    pub step_hours: f64,
    pub elevation_m: f64,
}

impl BalanceParams<'_> {
    fn mm_per_unit(&self) -> f64 {
        self.crop.mm_per_unit_moisture()
    }
}

/// Advance soil moisture by one step.
///
/// Precipitation infiltrates up to the soil's intake capacity and the storage
/// left below field capacity; the rest runs off. Drainage only happens when the
/// step starts at field capacity. Neither drainage nor crop ET can take the
/// store below wilting point.
pub fn step(
    index: usize,
    moisture: f64,
    sample: &WeatherSample,
    params: &BalanceParams<'_>,
) -> Result<WaterBalanceStep> {
    let soil = params.soil;
    let depth_mm = params.mm_per_unit();

    let precipitation_mm = sample.precipitation_mm;
    let intake_capacity_mm = soil.infiltration_rate_mm_h * params.step_hours;
    let storage_mm = ((soil.field_capacity - moisture) * depth_mm).max(0.0);
    let infiltration_mm = precipitation_mm.min(intake_capacity_mm).min(storage_mm).max(0.0);
    let runoff_mm = precipitation_mm - infiltration_mm;

    // Drainage cannot take the store below wilting point
    let held_mm = ((moisture - soil.wilting_point) * depth_mm + infiltration_mm).max(0.0);
    let deep_percolation_mm = if moisture >= soil.field_capacity {
        soil.drainage_mm(params.step_hours).min(held_mm)
    } else {
        0.0
    };

    let reference_et_mm = reference_et(sample, params.step_hours, params.elevation_m);
    let potential_et_mm = reference_et_mm * params.crop.crop_coefficient(params.stage);
    let extractable_mm = (held_mm - deep_percolation_mm).max(0.0);
    let crop_et_mm = potential_et_mm.min(extractable_mm);

    let unclamped = moisture
        + (precipitation_mm - runoff_mm - deep_percolation_mm - crop_et_mm) / depth_mm;
    if unclamped > soil.field_capacity + BAND_TOLERANCE
        || unclamped < soil.wilting_point - BAND_TOLERANCE
        || !unclamped.is_finite()
    {
        return Err(PregiError::InvariantViolation(format!(
            "moisture {} escaped [{}, {}] at step {}",
            unclamped, soil.wilting_point, soil.field_capacity, index
        )));
    }

    Ok(WaterBalanceStep {
        index,
        timestamp: sample.timestamp,
        moisture_start: moisture,
        precipitation_mm,
        infiltration_mm,
        runoff_mm,
        deep_percolation_mm,
        reference_et_mm,
        crop_et_mm,
        moisture: soil.clamp(unclamped),
    })
}

/// Integrate the no-irrigation moisture trajectory over the forecast.
pub fn simulate(
    initial_moisture: f64,
    forecast: &ForecastSeries,
    soil: &SoilProfile,
    crop: &CropProfile,
    stage: GrowthStage,
) -> Result<SimulationTrajectory> {
    forecast.validate()?;
    soil.validate()?;
    crop.validate()?;
    if !soil.contains(initial_moisture) {
        return Err(PregiError::validation(format!(
            "initial moisture {} outside [{}, {}]",
            initial_moisture, soil.wilting_point, soil.field_capacity
        )));
    }

    let params = BalanceParams {
        soil,
        crop,
        stage,
        step_hours: forecast.step_duration_hours,
        elevation_m: forecast.location.elevation_m,
    };

    let mut moisture = initial_moisture;
    let mut steps = Vec::with_capacity(forecast.len());
    for (index, sample) in forecast.samples.iter().enumerate() {
        let s = step(index, moisture, sample, &params)?;
        moisture = s.moisture;
        steps.push(s);
    }

    tracing::debug!(
        steps = steps.len(),
        final_moisture = moisture,
        "water balance simulated"
    );

    SimulationTrajectory::from_steps(steps)
        .ok_or_else(|| PregiError::validation("forecast series is empty"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropType, Location, SoilClass};
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn forecast_of(samples: Vec<(f64, f64, f64, f64, f64)>) -> ForecastSeries {
        forecast_with_step(samples, 1.0)
    }

    fn forecast_with_step(
        samples: Vec<(f64, f64, f64, f64, f64)>,
        step_hours: f64,
    ) -> ForecastSeries {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        ForecastSeries {
            location: Location::new(45.0, 9.0),
            start,
            step_duration_hours: step_hours,
            samples: samples
                .into_iter()
                .enumerate()
                .map(|(i, (p, t, rh, u, rs))| WeatherSample {
                    timestamp: start + Duration::minutes((i as f64 * step_hours * 60.0) as i64),
                    precipitation_mm: p,
                    temperature_c: t,
                    relative_humidity_percent: rh,
                    wind_speed_m_s: u,
                    solar_radiation_w_m2: rs,
                })
                .collect(),
        }
    }

    fn dry_hot(hours: usize) -> ForecastSeries {
        forecast_of(vec![(0.0, 32.0, 25.0, 3.0, 850.0); hours])
    }

    fn still(hours: usize) -> ForecastSeries {
        forecast_of(vec![(0.0, 15.0, 100.0, 0.0, 0.0); hours])
    }

    fn loam() -> SoilProfile {
        SoilClass::Loam.profile()
    }

    fn asparagus() -> CropProfile {
        CropType::Asparagus.profile()
    }

    #[test]
    fn empty_forecast_is_a_validation_fault() {
        let err = simulate(0.3, &forecast_of(vec![]), &loam(), &asparagus(), GrowthStage::MidSeason)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn initial_moisture_outside_band_is_rejected() {
        let f = still(3);
        assert!(simulate(0.40, &f, &loam(), &asparagus(), GrowthStage::MidSeason).is_err());
        assert!(simulate(0.10, &f, &loam(), &asparagus(), GrowthStage::MidSeason).is_err());
    }

    #[test]
    fn trajectory_length_matches_forecast() {
        let t = simulate(0.30, &dry_hot(72), &loam(), &asparagus(), GrowthStage::MidSeason).unwrap();
        assert_eq!(t.len(), 72);
    }

    #[test]
    fn still_air_keeps_moisture_constant() {
        let t = simulate(0.27, &still(24), &loam(), &asparagus(), GrowthStage::MidSeason).unwrap();
        assert!(t.moisture().iter().all(|m| *m == 0.27));
        assert_eq!(t.min_index, 0);
    }

    #[test]
    fn dry_weather_depletes_monotonically() {
        let t = simulate(0.30, &dry_hot(48), &loam(), &asparagus(), GrowthStage::MidSeason).unwrap();
        let m = t.moisture();
        assert!(m.windows(2).all(|w| w[1] <= w[0]));
        assert!(t.final_moisture() < 0.30);
        assert_eq!(t.min_index, 47);
        assert!(t.total_crop_et_mm() > 0.0);
    }

    #[test]
    fn excess_rain_runs_off_at_field_capacity() {
        // 0.005 below FC leaves 6 mm of storage over a 1.2 m root zone
        let f = forecast_of(vec![(10.0, 15.0, 100.0, 0.0, 0.0)]);
        let t = simulate(0.345, &f, &loam(), &asparagus(), GrowthStage::MidSeason).unwrap();
        let s = t.steps[0];
        assert!((s.infiltration_mm - 6.0).abs() < 1e-6);
        assert!((s.runoff_mm - 4.0).abs() < 1e-6);
        assert!((s.moisture - 0.35).abs() < 1e-12);
        assert_eq!(s.deep_percolation_mm, 0.0);
    }

    #[test]
    fn intense_rain_exceeds_infiltration_capacity() {
        let f = forecast_of(vec![(40.0, 15.0, 100.0, 0.0, 0.0)]);
        let t = simulate(0.20, &f, &loam(), &asparagus(), GrowthStage::MidSeason).unwrap();
        let s = t.steps[0];
        assert_eq!(s.infiltration_mm, 15.0);
        assert_eq!(s.runoff_mm, 25.0);
        assert!((s.moisture - (0.20 + 15.0 / 1200.0)).abs() < 1e-12);
    }

    #[test]
    fn drainage_only_from_field_capacity() {
        let f = still(2);
        let t = simulate(0.35, &f, &loam(), &asparagus(), GrowthStage::MidSeason).unwrap();
        assert!(t.steps[0].deep_percolation_mm > 0.0);
        assert!(t.steps[0].moisture < 0.35);
        assert_eq!(t.steps[1].deep_percolation_mm, 0.0);
    }

    #[test]
    fn evapotranspiration_stops_at_wilting_point() {
        let t = simulate(0.1505, &dry_hot(72), &loam(), &asparagus(), GrowthStage::MidSeason)
            .unwrap();
        assert!(t.moisture().iter().all(|m| *m >= 0.15));
        assert!((t.final_moisture() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn late_season_uses_its_crop_coefficient() {
        let wheat = CropType::Wheat.profile();
        let mid = simulate(0.30, &dry_hot(24), &loam(), &wheat, GrowthStage::MidSeason).unwrap();
        let late = simulate(0.30, &dry_hot(24), &loam(), &wheat, GrowthStage::LateSeason).unwrap();
        assert!(late.final_moisture() > mid.final_moisture());
    }

    #[test]
    fn long_steps_drain_no_further_than_wilting_point() {
        let soil = SoilClass::Sandy.profile();
        let potato = CropType::Potato.profile();
        let f = forecast_with_step(vec![(0.0, 15.0, 100.0, 0.0, 0.0); 3], 48.0);
        let t = simulate(soil.field_capacity, &f, &soil, &potato, GrowthStage::MidSeason).unwrap();
        // 0.15 above WP over a 0.5 m root zone
        assert!((t.steps[0].deep_percolation_mm - 75.0).abs() < 1e-9);
        assert!((t.steps[0].moisture - soil.wilting_point).abs() < 1e-12);
    }

    #[test]
    fn fast_draining_measured_soil_stays_in_band() {
        let soil = SoilClass::Sandy.profile().with_rates(25.0, 10.0);
        let potato = CropType::Potato.profile();
        let f = forecast_with_step(vec![(0.0, 15.0, 100.0, 0.0, 0.0); 3], 24.0);
        let t = simulate(soil.field_capacity, &f, &soil, &potato, GrowthStage::MidSeason).unwrap();
        assert!(t.moisture().iter().all(|m| soil.contains(*m)));
        assert!((t.final_moisture() - soil.wilting_point).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn moisture_stays_within_band(
            initial_frac in 0.0f64..=1.0,
            class in prop::sample::select(SoilClass::ALL.to_vec()),
            conductivity in 0.1f64..50.0,
            step_hours in prop::sample::select(vec![0.5, 1.0, 3.0, 24.0, 48.0]),
            weather in prop::collection::vec(
                (0.0f64..60.0, -5.0f64..45.0, 5.0f64..100.0, 0.0f64..15.0, 0.0f64..1100.0),
                1..96,
            ),
        ) {
            let table = class.profile();
            let soil = table.with_rates(table.infiltration_rate_mm_h, conductivity);
            let crop = CropType::Potato.profile();
            let initial = soil.clamp(soil.wilting_point + initial_frac * soil.total_available_water());
            let forecast = forecast_with_step(weather.clone(), step_hours);
            let t = simulate(initial, &forecast, &soil, &crop, GrowthStage::MidSeason).unwrap();
            prop_assert_eq!(t.len(), weather.len());
            for m in t.moisture() {
                prop_assert!(m >= soil.wilting_point && m <= soil.field_capacity);
            }
        }
    }
}
