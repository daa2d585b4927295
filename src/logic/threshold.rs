use crate::error::Result;
use crate::models::{CropProfile, SoilProfile};
use serde::{Deserialize, Serialize};

/// Moisture below which the crop is considered water-stressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressThreshold {
    pub theta_crit: f64,
    pub field_capacity: f64,
    pub wilting_point: f64,
    /// Total available water (m³/m³)
    pub taw: f64,
    /// Readily available water (m³/m³)
    pub raw: f64,
    pub depletion_fraction: f64,
}

impl StressThreshold {
    /// Management allowed depletion, as a percentage of TAW.
    pub fn mad_percent(&self) -> f64 {
        self.raw / self.taw * 100.0
    }

    pub fn trigger_points(&self) -> TriggerPoints {
        TriggerPoints {
            low: self.theta_crit + 0.02,
            medium: self.theta_crit,
            high: self.theta_crit - 0.01,
            critical: self.wilting_point + 0.02,
        }
    }
}

/// Graded moisture levels around the critical threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerPoints {
    /// Early warning
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    /// Close to wilting
    pub critical: f64,
}

/// Derive the stress threshold for a soil and crop pair.
///
/// TAW = FC - WP, RAW = p * TAW, theta_crit = FC - RAW, with p the
/// climatically corrected depletion fraction capped to [0, 1].
pub fn compute_threshold(soil: &SoilProfile, crop: &CropProfile) -> Result<StressThreshold> {
    soil.validate()?;
    crop.validate()?;

    let taw = soil.total_available_water();
    let p = crop.corrected_depletion_fraction();
    let raw = p * taw;
    let theta_crit = (soil.field_capacity - raw).clamp(soil.wilting_point, soil.field_capacity);

    Ok(StressThreshold {
        theta_crit,
        field_capacity: soil.field_capacity,
        wilting_point: soil.wilting_point,
        taw,
        raw,
        depletion_fraction: p,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropType, SoilClass};
    use proptest::prelude::*;

    #[test]
    fn asparagus_on_loam() {
        let t = compute_threshold(
            &SoilClass::Loam.profile(),
            &CropType::Asparagus.profile(),
        )
        .unwrap();
        assert!((t.theta_crit - 0.22).abs() < 1e-9);
        assert!((t.taw - 0.20).abs() < 1e-12);
        assert!((t.raw - 0.13).abs() < 1e-9);
        assert!((t.mad_percent() - 65.0).abs() < 1e-9);
    }

    #[test]
    fn inverted_soil_is_rejected() {
        let soil = SoilProfile::new(0.20, 0.25);
        let err = compute_threshold(&soil, &CropType::Asparagus.profile()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn invalid_crop_is_rejected() {
        let soil = SoilClass::Loam.profile();
        let mut crop = CropType::Tomato.profile();
        crop.depletion_fraction = 1.5;
        assert!(compute_threshold(&soil, &crop).is_err());
        let crop = CropType::Tomato.profile().with_climatic_correction(-1.0);
        assert!(compute_threshold(&soil, &crop).is_err());
    }

    #[test]
    fn identical_inputs_give_identical_threshold() {
        let soil = SoilClass::Clay.profile();
        let crop = CropType::Wheat.profile();
        let a = compute_threshold(&soil, &crop).unwrap();
        let b = compute_threshold(&soil, &crop).unwrap();
        assert_eq!(a.theta_crit.to_bits(), b.theta_crit.to_bits());
    }

    #[test]
    fn trigger_points_bracket_threshold() {
        let t = compute_threshold(&SoilClass::Loam.profile(), &CropType::Wheat.profile()).unwrap();
        let tp = t.trigger_points();
        assert!(tp.low > tp.medium);
        assert!(tp.medium > tp.high);
        assert_eq!(tp.medium, t.theta_crit);
        assert!((tp.critical - 0.17).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn threshold_lies_between_wilting_point_and_field_capacity(
            wp in 0.0f64..0.9,
            span in 0.001f64..0.5,
            p in 0.0f64..=1.0,
            correction in 0.001f64..=2.0,
        ) {
            let fc = (wp + span).min(1.0);
            prop_assume!(fc > wp);
            let soil = SoilProfile::new(fc, wp);
            let crop = CropType::Asparagus.profile();
            let crop = CropProfile { depletion_fraction: p, climatic_correction: correction, ..crop };
            let t = compute_threshold(&soil, &crop).unwrap();
            prop_assert!(t.theta_crit >= wp);
            prop_assert!(t.theta_crit <= fc);
        }
    }
}
