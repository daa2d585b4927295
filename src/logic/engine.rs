use super::schedule::plan_application;
use super::stress::analyze;
use super::threshold::{compute_threshold, StressThreshold};
use super::water_balance::simulate;
use crate::datasources::{ForecastRequest, ForecastSource};
use crate::error::{PregiError, Result};
use crate::models::{
    CropProfile, GrowthStage, InputWarning, IrrigationDecision, IrrigationSystem, Location,
    SimulationTrajectory, SoilProfile, Urgency, Verdict,
};
use chrono::{DateTime, Utc};

/// Margin below or above the threshold, as a fraction of TAW, at which
/// confidence saturates.
const CONFIDENCE_SATURATION: f64 = 0.25;

/// Everything one decision run needs to know about the field.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionContext {
    pub moisture_estimate: f64,
    pub soil: SoilProfile,
    pub crop: CropProfile,
    pub stage: GrowthStage,
    pub location: Location,
    pub as_of: DateTime<Utc>,
    pub horizon_steps: usize,
}

impl DecisionContext {
    pub fn new(
        moisture_estimate: f64,
        soil: SoilProfile,
        crop: CropProfile,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self {
            moisture_estimate,
            soil,
            crop,
            stage: GrowthStage::default(),
            location: Location::default(),
            as_of,
            horizon_steps: 72,
        }
    }

    pub fn with_stage(mut self, stage: GrowthStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_horizon_steps(mut self, steps: usize) -> Self {
        self.horizon_steps = steps;
        self
    }
}

/// Forecast-driven irrigation decisions for a single field.
///
/// Holds no per-run state; one engine can serve any number of fields and
/// threads.
pub struct IrrigationDecisionEngine {
    source: Box<dyn ForecastSource>,
    step_duration_hours: f64,
    irrigation_system: IrrigationSystem,
}

impl IrrigationDecisionEngine {
    pub fn new(source: Box<dyn ForecastSource>) -> Self {
        Self {
            source,
            step_duration_hours: 1.0,
            irrigation_system: IrrigationSystem::default(),
        }
    }

    pub fn with_step_duration_hours(mut self, hours: f64) -> Self {
        self.step_duration_hours = hours;
        self
    }

    pub fn with_irrigation_system(mut self, system: IrrigationSystem) -> Self {
        self.irrigation_system = system;
        self
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn decide(&self, ctx: &DecisionContext) -> Result<IrrigationDecision> {
        if !ctx.moisture_estimate.is_finite() {
            return Err(PregiError::validation(format!(
                "soil moisture estimate must be a number, got {}",
                ctx.moisture_estimate
            )));
        }
        let threshold = compute_threshold(&ctx.soil, &ctx.crop)?;

        let mut warnings = Vec::new();
        let moisture = ctx.soil.clamp(ctx.moisture_estimate);
        if moisture != ctx.moisture_estimate {
            tracing::warn!(
                supplied = ctx.moisture_estimate,
                used = moisture,
                "soil moisture estimate outside [WP, FC], clamped"
            );
            warnings.push(InputWarning::MoistureClamped {
                supplied: ctx.moisture_estimate,
                used: moisture,
            });
        }

        let request = ForecastRequest::new(
            ctx.location,
            ctx.as_of,
            ctx.horizon_steps,
            self.step_duration_hours,
        );
        let forecast = self.source.generate_forecast(&request)?;
        let trajectory = simulate(moisture, &forecast, &ctx.soil, &ctx.crop, ctx.stage)?;

        let mut decision = self.assess(&trajectory, &threshold, ctx);
        decision
            .rationale
            .extend(warnings.iter().map(|w| w.to_string()));
        decision.warnings = warnings;

        tracing::info!(
            verdict = %decision.verdict,
            confidence = decision.confidence,
            water_mm = decision.water_amount_mm,
            source = self.source.name(),
            "irrigation decision"
        );
        Ok(decision)
    }

    /// Apply the decision rule to an already simulated trajectory.
    pub fn assess(
        &self,
        trajectory: &SimulationTrajectory,
        threshold: &StressThreshold,
        ctx: &DecisionContext,
    ) -> IrrigationDecision {
        let minimum = trajectory.minimum();
        let theta_crit = threshold.theta_crit;
        let verdict = if minimum < theta_crit {
            Verdict::Irrigate
        } else {
            Verdict::DoNotIrrigate
        };
        let irrigate = verdict.is_irrigate();

        let stress = analyze(trajectory, threshold, self.step_duration_hours);
        // Anything above the threshold is at most an early warning
        let urgency = if irrigate {
            stress.urgency.max(Urgency::Low)
        } else {
            stress.urgency.min(Urgency::Low)
        };

        let water_amount_mm = if irrigate {
            ((theta_crit - minimum) * ctx.crop.mm_per_unit_moisture()).max(0.0)
        } else {
            0.0
        };

        let application = irrigate.then(|| {
            plan_application(
                water_amount_mm,
                urgency,
                self.irrigation_system,
                ctx.as_of,
                &ctx.location,
            )
        });

        let precipitation_mm: f64 = trajectory.steps.iter().map(|s| s.precipitation_mm).sum();
        let mut rationale = vec![
            format!(
                "Threshold {:.3} m³/m³ (FC {:.2}, WP {:.2}, MAD {:.0}%)",
                theta_crit,
                threshold.field_capacity,
                threshold.wilting_point,
                threshold.mad_percent()
            ),
            format!(
                "Forecast minimum {:.3} m³/m³ at step {} ({})",
                minimum,
                trajectory.min_index,
                trajectory.minimum_time().format("%Y-%m-%d %H:%M UTC")
            ),
            format!(
                "{:.1} mm rain ({:.1} mm runoff), {:.1} mm crop ET and {:.1} mm drainage over {} steps",
                precipitation_mm,
                trajectory.total_runoff_mm(),
                trajectory.total_crop_et_mm(),
                trajectory.total_deep_percolation_mm(),
                trajectory.len()
            ),
        ];
        rationale.push(if irrigate {
            format!(
                "Moisture falls {:.3} below threshold, apply {:.1} mm net",
                theta_crit - minimum,
                water_amount_mm
            )
        } else {
            format!(
                "Moisture stays {:.3} at or above threshold",
                minimum - theta_crit
            )
        });
        if !stress.events.is_empty() {
            rationale.push(format!(
                "{:.1} h of stress expected, worst level {:?}",
                stress.stress_hours,
                stress.worst_level()
            ));
        }

        let timing = if irrigate {
            urgency.timing_advice().to_string()
        } else if urgency == Urgency::Low {
            Urgency::None.timing_advice().to_string()
        } else {
            "No irrigation needed within the forecast horizon".to_string()
        };

        IrrigationDecision {
            verdict,
            confidence: confidence(minimum, theta_crit, threshold.taw),
            water_amount_mm,
            minimum_forecasted_moisture: minimum,
            threshold_used: theta_crit,
            trigger_time_index: irrigate.then_some(trajectory.min_index),
            trigger_time: irrigate.then(|| trajectory.minimum_time()),
            urgency,
            stress_hours: stress.stress_hours,
            timing,
            rationale,
            warnings: Vec::new(),
            application,
        }
    }
}

/// 0.5 on the threshold, rising linearly with the margin to 1.0 at a
/// quarter of TAW.
pub fn confidence(minimum: f64, theta_crit: f64, taw: f64) -> f64 {
    if taw <= 0.0 {
        return 0.5;
    }
    let margin = (minimum - theta_crit).abs() / taw;
    0.5 + 0.5 * (margin / CONFIDENCE_SATURATION).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::{FixtureForecast, WeatherForecastGenerator};
    use crate::models::trajectory::fixtures::descending;
    use crate::models::{CropType, ForecastSeries, SoilClass, WeatherSample};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
    }

    fn loam() -> SoilProfile {
        SoilClass::Loam.profile()
    }

    fn asparagus() -> CropProfile {
        CropType::Asparagus.profile()
    }

    fn weather_fixture(hours: usize, weather: (f64, f64, f64, f64, f64)) -> FixtureForecast {
        let (p, t, rh, u, rs) = weather;
        FixtureForecast::new(ForecastSeries {
            location: Location::default(),
            start: as_of(),
            step_duration_hours: 1.0,
            samples: (0..hours)
                .map(|i| WeatherSample {
                    timestamp: as_of() + Duration::hours(i as i64),
                    precipitation_mm: p,
                    temperature_c: t,
                    relative_humidity_percent: rh,
                    wind_speed_m_s: u,
                    solar_radiation_w_m2: rs,
                })
                .collect(),
        })
    }

    fn still_engine() -> IrrigationDecisionEngine {
        IrrigationDecisionEngine::new(Box::new(weather_fixture(72, (0.0, 15.0, 100.0, 0.0, 0.0))))
    }

    fn dry_engine() -> IrrigationDecisionEngine {
        IrrigationDecisionEngine::new(Box::new(weather_fixture(72, (0.0, 33.0, 20.0, 3.5, 900.0))))
    }

    fn context(moisture: f64) -> DecisionContext {
        DecisionContext::new(moisture, loam(), asparagus(), as_of())
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IrrigationDecisionEngine>();
    }

    #[test]
    fn minimum_at_threshold_does_not_irrigate() {
        let theta = compute_threshold(&loam(), &asparagus()).unwrap().theta_crit;
        let decision = still_engine().decide(&context(theta)).unwrap();
        assert_eq!(decision.minimum_forecasted_moisture, theta);
        assert_eq!(decision.verdict, Verdict::DoNotIrrigate);
        assert_eq!(decision.water_amount_mm, 0.0);
        assert_eq!(decision.confidence, 0.5);
        assert!(decision.trigger_time_index.is_none());
    }

    #[test]
    fn comfortable_minimum_does_not_irrigate() {
        let engine = still_engine();
        let threshold = compute_threshold(&loam(), &asparagus()).unwrap();
        let decision = engine.assess(&descending(0.30, 0.25, 40, 72), &threshold, &context(0.30));
        assert_eq!(decision.verdict, Verdict::DoNotIrrigate);
        assert_eq!(decision.water_amount_mm, 0.0);
        assert!(decision.application.is_none());
        assert_eq!(decision.urgency, Urgency::None);
    }

    #[test]
    fn dip_below_threshold_irrigates_the_deficit() {
        let engine = still_engine();
        let threshold = compute_threshold(&loam(), &asparagus()).unwrap();
        let decision = engine.assess(&descending(0.28, 0.21, 36, 72), &threshold, &context(0.28));
        assert_eq!(decision.verdict, Verdict::Irrigate);
        // 0.01 m³/m³ over a 1.2 m root zone
        assert!((decision.water_amount_mm - 12.0).abs() < 1e-6);
        assert_eq!(decision.trigger_time_index, Some(36));
        assert_eq!(
            decision.trigger_time,
            Some(Utc.with_ymd_and_hms(2024, 7, 2, 13, 0, 0).unwrap())
        );
        let plan = decision.application.unwrap();
        assert!((plan.gross_water_mm - 12.0 / 0.9).abs() < 1e-6);
    }

    #[test]
    fn empty_forecast_is_a_validation_fault() {
        let engine = IrrigationDecisionEngine::new(Box::new(weather_fixture(
            0,
            (0.0, 20.0, 50.0, 2.0, 0.0),
        )));
        let err = engine.decide(&context(0.3).with_horizon_steps(0)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn inverted_soil_is_a_validation_fault() {
        let ctx = DecisionContext::new(0.3, SoilProfile::new(0.15, 0.35), asparagus(), as_of());
        assert!(still_engine().decide(&ctx).unwrap_err().is_validation());
    }

    #[test]
    fn nan_moisture_is_a_validation_fault() {
        assert!(still_engine().decide(&context(f64::NAN)).unwrap_err().is_validation());
    }

    #[test]
    fn out_of_band_moisture_is_clamped_with_warning() {
        let decision = still_engine().decide(&context(0.42)).unwrap();
        assert_eq!(
            decision.warnings,
            vec![InputWarning::MoistureClamped {
                supplied: 0.42,
                used: 0.35
            }]
        );
        assert_eq!(decision.verdict, Verdict::DoNotIrrigate);
        assert!(decision.rationale.iter().any(|r| r.contains("clamped")));
        // Starting at field capacity drains one step's worth
        assert!(decision
            .rationale
            .iter()
            .any(|r| r.contains("1.0 mm drainage over 72 steps")));
    }

    #[test]
    fn hot_dry_spell_triggers_irrigation() {
        let decision = dry_engine().decide(&context(0.25)).unwrap();
        assert!(decision.needs_irrigation());
        assert!(decision.water_amount_mm > 0.0);
        assert!(decision.urgency >= Urgency::Low);
        assert!(decision.application.is_some());
        assert_eq!(decision.trigger_time_index, Some(71));
    }

    #[test]
    fn wet_forecast_does_not_irrigate() {
        let engine = IrrigationDecisionEngine::new(Box::new(weather_fixture(
            72,
            (2.0, 16.0, 95.0, 1.0, 50.0),
        )));
        let decision = engine.decide(&context(0.30)).unwrap();
        assert_eq!(decision.verdict, Verdict::DoNotIrrigate);
        assert!(decision.minimum_forecasted_moisture >= 0.30);
    }

    #[test]
    fn synthetic_runs_are_reproducible() {
        let engine = IrrigationDecisionEngine::new(Box::new(WeatherForecastGenerator::new(11)));
        let ctx = context(0.24);
        assert_eq!(engine.decide(&ctx).unwrap(), engine.decide(&ctx).unwrap());
        assert_eq!(engine.source_name(), "synthetic");
    }

    #[test]
    fn irrigation_system_shapes_the_plan() {
        let engine = dry_engine().with_irrigation_system(IrrigationSystem::Flood);
        let plan = engine.decide(&context(0.25)).unwrap().application.unwrap();
        assert_eq!(plan.system, IrrigationSystem::Flood);
    }

    #[test]
    fn confidence_is_half_on_the_threshold_and_saturates() {
        assert_eq!(confidence(0.22, 0.22, 0.20), 0.5);
        assert_eq!(confidence(0.30, 0.22, 0.20), 1.0);
        assert!((confidence(0.245, 0.22, 0.20) - 0.75).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn confidence_grows_with_margin(a in 0.0f64..0.2, b in 0.0f64..0.2) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let below_near = confidence(0.22 - near, 0.22, 0.20);
            let below_far = confidence(0.22 - far, 0.22, 0.20);
            prop_assert!(below_near <= below_far);
            prop_assert!((0.5..=1.0).contains(&below_far));

            let above_near = confidence(0.22 + near, 0.22, 0.20);
            let above_far = confidence(0.22 + far, 0.22, 0.20);
            prop_assert!(above_near <= above_far);
            prop_assert!((0.5..=1.0).contains(&above_far));
        }

        #[test]
        fn water_is_never_negative(moisture in 0.15f64..=0.35, seed in any::<u64>()) {
            let engine = IrrigationDecisionEngine::new(Box::new(WeatherForecastGenerator::new(seed)));
            let d = engine.decide(&context(moisture).with_horizon_steps(48)).unwrap();
            prop_assert!(d.water_amount_mm >= 0.0);
            if !d.needs_irrigation() {
                prop_assert_eq!(d.water_amount_mm, 0.0);
            }
            prop_assert!((0.0..=1.0).contains(&d.confidence));
        }
    }
}
