use crate::error::{PregiError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilClass {
    Sandy,
    SandyLoam,
    Loam,
    SiltLoam,
    ClayLoam,
    Clay,
}

impl SoilClass {
    pub const ALL: [SoilClass; 6] = [
        SoilClass::Sandy,
        SoilClass::SandyLoam,
        SoilClass::Loam,
        SoilClass::SiltLoam,
        SoilClass::ClayLoam,
        SoilClass::Clay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilClass::Sandy => "Sandy",
            SoilClass::SandyLoam => "Sandy Loam",
            SoilClass::Loam => "Loam",
            SoilClass::SiltLoam => "Silt Loam",
            SoilClass::ClayLoam => "Clay Loam",
            SoilClass::Clay => "Clay",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sandy" | "sand" => Some(SoilClass::Sandy),
            "sandyloam" | "sandy loam" | "sandy_loam" => Some(SoilClass::SandyLoam),
            "loam" | "loamy" => Some(SoilClass::Loam),
            "siltloam" | "silt loam" | "silt_loam" => Some(SoilClass::SiltLoam),
            "clayloam" | "clay loam" | "clay_loam" => Some(SoilClass::ClayLoam),
            "clay" => Some(SoilClass::Clay),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| PregiError::UnknownProfile(format!("soil class '{}'", s)))
    }

    /// Hydraulic properties for the class.
    ///
    /// Field capacity and wilting point are volumetric fractions; the rates
    /// describe surface infiltration capacity and drainage below the root zone.
    pub fn profile(&self) -> SoilProfile {
        let (fc, wp, infiltration, conductivity) = match self {
            SoilClass::Sandy => (0.25, 0.10, 25.0, 5.0),
            SoilClass::SandyLoam => (0.23, 0.11, 20.0, 3.5),
            SoilClass::Loam => (0.35, 0.15, 15.0, 2.5),
            SoilClass::SiltLoam => (0.29, 0.15, 12.0, 1.8),
            SoilClass::ClayLoam => (0.36, 0.19, 8.0, 1.0),
            SoilClass::Clay => (0.45, 0.20, 5.0, 0.5),
        };
        SoilProfile {
            field_capacity: fc,
            wilting_point: wp,
            infiltration_rate_mm_h: infiltration,
            hydraulic_conductivity_cm_day: conductivity,
        }
    }
}

impl std::fmt::Display for SoilClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static hydraulic properties of a soil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    /// Volumetric water content held against gravity drainage (m³/m³).
    pub field_capacity: f64,
    /// Volumetric water content at permanent wilting point (m³/m³).
    pub wilting_point: f64,
    pub infiltration_rate_mm_h: f64,
    pub hydraulic_conductivity_cm_day: f64,
}

impl SoilProfile {
    pub fn new(field_capacity: f64, wilting_point: f64) -> Self {
        let loam = SoilClass::Loam.profile();
        Self {
            field_capacity,
            wilting_point,
            infiltration_rate_mm_h: loam.infiltration_rate_mm_h,
            hydraulic_conductivity_cm_day: loam.hydraulic_conductivity_cm_day,
        }
    }

    pub fn with_rates(mut self, infiltration_rate_mm_h: f64, conductivity_cm_day: f64) -> Self {
        self.infiltration_rate_mm_h = infiltration_rate_mm_h;
        self.hydraulic_conductivity_cm_day = conductivity_cm_day;
        self
    }

    /// Total available water: field capacity minus wilting point.
    pub fn total_available_water(&self) -> f64 {
        self.field_capacity - self.wilting_point
    }

    pub fn contains(&self, moisture: f64) -> bool {
        moisture >= self.wilting_point && moisture <= self.field_capacity
    }

    pub fn clamp(&self, moisture: f64) -> f64 {
        moisture.clamp(self.wilting_point, self.field_capacity)
    }

    /// Drainage below the root zone for a step, in mm.
    pub fn drainage_mm(&self, step_hours: f64) -> f64 {
        self.hydraulic_conductivity_cm_day * 10.0 / 24.0 * step_hours
    }

    pub fn validate(&self) -> Result<()> {
        let fc = self.field_capacity;
        let wp = self.wilting_point;
        if !(0.0..=1.0).contains(&fc) || !(0.0..=1.0).contains(&wp) {
            return Err(PregiError::validation(format!(
                "field capacity ({}) and wilting point ({}) must lie in [0, 1]",
                fc, wp
            )));
        }
        if fc <= wp {
            return Err(PregiError::validation(format!(
                "field capacity ({}) must exceed wilting point ({})",
                fc, wp
            )));
        }
        if !(self.infiltration_rate_mm_h.is_finite() && self.infiltration_rate_mm_h >= 0.0) {
            return Err(PregiError::validation(format!(
                "infiltration rate must be a non-negative number, got {}",
                self.infiltration_rate_mm_h
            )));
        }
        if !(self.hydraulic_conductivity_cm_day.is_finite()
            && self.hydraulic_conductivity_cm_day >= 0.0)
        {
            return Err(PregiError::validation(format!(
                "hydraulic conductivity must be a non-negative number, got {}",
                self.hydraulic_conductivity_cm_day
            )));
        }
        Ok(())
    }
}
