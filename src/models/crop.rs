use crate::error::{PregiError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Asparagus,
    Tomato,
    Wheat,
    Maize,
    Potato,
}

impl CropType {
    pub const ALL: [CropType; 5] = [
        CropType::Asparagus,
        CropType::Tomato,
        CropType::Wheat,
        CropType::Maize,
        CropType::Potato,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Asparagus => "Asparagus",
            CropType::Tomato => "Tomato",
            CropType::Wheat => "Wheat",
            CropType::Maize => "Maize",
            CropType::Potato => "Potato",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asparagus" => Some(CropType::Asparagus),
            "tomato" | "tomatoes" => Some(CropType::Tomato),
            "wheat" => Some(CropType::Wheat),
            "maize" | "corn" => Some(CropType::Maize),
            "potato" | "potatoes" => Some(CropType::Potato),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| PregiError::UnknownProfile(format!("crop type '{}'", s)))
    }

    /// FAO-56 style parameters for the crop.
    ///
    /// Depletion fractions are already corrected for typical climate, so the
    /// built-in climatic correction is 1.0.
    pub fn profile(&self) -> CropProfile {
        let (p, depth, kc) = match self {
            CropType::Asparagus => (0.65, 1.2, [0.5, 0.8, 1.15, 1.0]),
            CropType::Tomato => (0.40, 1.0, [0.6, 1.15, 1.15, 0.8]),
            CropType::Wheat => (0.55, 1.5, [0.4, 0.7, 1.15, 0.4]),
            CropType::Maize => (0.55, 1.2, [0.3, 0.75, 1.2, 0.35]),
            CropType::Potato => (0.35, 0.5, [0.5, 0.8, 1.15, 0.75]),
        };
        CropProfile {
            depletion_fraction: p,
            climatic_correction: 1.0,
            rooting_depth_m: depth,
            kc_initial: kc[0],
            kc_development: kc[1],
            kc_mid_season: kc[2],
            kc_late_season: kc[3],
        }
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Initial,
    Development,
    #[default]
    MidSeason,
    LateSeason,
}

impl GrowthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Initial => "Initial",
            GrowthStage::Development => "Development",
            GrowthStage::MidSeason => "Mid-Season",
            GrowthStage::LateSeason => "Late-Season",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "initial" => Some(GrowthStage::Initial),
            "development" | "dev" => Some(GrowthStage::Development),
            "midseason" | "mid-season" | "mid_season" | "mid" => Some(GrowthStage::MidSeason),
            "lateseason" | "late-season" | "late_season" | "late" => Some(GrowthStage::LateSeason),
            _ => None,
        }
    }

    /// Estimate the stage from leaf area index.
    pub fn from_lai(lai: f64) -> Self {
        if lai < 1.0 {
            GrowthStage::Initial
        } else if lai < 2.5 {
            GrowthStage::Development
        } else if lai < 4.0 {
            GrowthStage::MidSeason
        } else {
            GrowthStage::LateSeason
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static crop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    /// Fraction of total available water the crop can use before stress.
    pub depletion_fraction: f64,
    /// Multiplier on the depletion fraction for local evaporative demand.
    pub climatic_correction: f64,
    pub rooting_depth_m: f64,
    pub kc_initial: f64,
    pub kc_development: f64,
    pub kc_mid_season: f64,
    pub kc_late_season: f64,
}

impl CropProfile {
    pub fn with_climatic_correction(mut self, correction: f64) -> Self {
        self.climatic_correction = correction;
        self
    }

    /// Depletion fraction after climatic correction, capped to [0, 1].
    pub fn corrected_depletion_fraction(&self) -> f64 {
        (self.depletion_fraction * self.climatic_correction).clamp(0.0, 1.0)
    }

    pub fn crop_coefficient(&self, stage: GrowthStage) -> f64 {
        match stage {
            GrowthStage::Initial => self.kc_initial,
            GrowthStage::Development => self.kc_development,
            GrowthStage::MidSeason => self.kc_mid_season,
            GrowthStage::LateSeason => self.kc_late_season,
        }
    }

    /// Millimetres of water per unit volumetric fraction over the root zone.
    ///
    /// Used for both precipitation inflow and irrigation dose so the two stay
    /// in the same units.
    pub fn mm_per_unit_moisture(&self) -> f64 {
        self.rooting_depth_m * 1000.0
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.depletion_fraction) {
            return Err(PregiError::validation(format!(
                "depletion fraction must lie in [0, 1], got {}",
                self.depletion_fraction
            )));
        }
        if !(self.climatic_correction > 0.0 && self.climatic_correction <= 2.0) {
            return Err(PregiError::validation(format!(
                "climatic correction must lie in (0, 2], got {}",
                self.climatic_correction
            )));
        }
        if !(self.rooting_depth_m.is_finite() && self.rooting_depth_m > 0.0) {
            return Err(PregiError::validation(format!(
                "rooting depth must be positive, got {}",
                self.rooting_depth_m
            )));
        }
        let kcs = [
            self.kc_initial,
            self.kc_development,
            self.kc_mid_season,
            self.kc_late_season,
        ];
        if kcs.iter().any(|kc| !(kc.is_finite() && *kc >= 0.0)) {
            return Err(PregiError::validation(
                "crop coefficients must be non-negative numbers",
            ));
        }
        Ok(())
    }
}
