use super::irrigation_system::IrrigationSystem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Irrigate,
    DoNotIrrigate,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Irrigate => "IRRIGATE",
            Verdict::DoNotIrrigate => "DO_NOT_IRRIGATE",
        }
    }

    pub fn is_irrigate(&self) -> bool {
        matches!(self, Verdict::Irrigate)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::None => "None",
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
            Urgency::Critical => "Critical",
        }
    }

    pub fn timing_advice(&self) -> &'static str {
        match self {
            Urgency::Critical => "Immediate irrigation required",
            Urgency::High => "Irrigate within 2-4 hours",
            Urgency::Medium => "Irrigate within 12-24 hours, preferably early morning",
            Urgency::Low => "Irrigate within 24-48 hours during optimal conditions",
            Urgency::None => "Monitor conditions",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Non-fatal input adjustment reported alongside a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputWarning {
    MoistureClamped { supplied: f64, used: f64 },
}

impl std::fmt::Display for InputWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputWarning::MoistureClamped { supplied, used } => write!(
                f,
                "soil moisture estimate {:.4} outside the physical band, clamped to {:.4}",
                supplied, used
            ),
        }
    }
}

/// A single planned irrigation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationEvent {
    pub start: DateTime<Utc>,
    pub net_mm: f64,
    pub gross_mm: f64,
    pub duration_hours: f64,
    pub cost_usd_per_ha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPlan {
    pub system: IrrigationSystem,
    pub gross_water_mm: f64,
    pub events: Vec<IrrigationEvent>,
    pub total_cost_usd_per_ha: f64,
    /// Cost of each net mm delivered to the root zone
    pub cost_per_mm_usd_per_ha: f64,
    /// Water saved against flood irrigation
    pub water_savings_percent: f64,
}

impl ApplicationPlan {
    pub fn next_event(&self) -> Option<&IrrigationEvent> {
        self.events.first()
    }
}

/// Outcome of one decision run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationDecision {
    pub verdict: Verdict,
    pub confidence: f64,
    pub water_amount_mm: f64,
    pub minimum_forecasted_moisture: f64,
    pub threshold_used: f64,
    pub trigger_time_index: Option<usize>,
    pub trigger_time: Option<DateTime<Utc>>,
    pub urgency: Urgency,
    pub stress_hours: f64,
    pub timing: String,
    pub rationale: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<InputWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationPlan>,
}

impl IrrigationDecision {
    pub fn needs_irrigation(&self) -> bool {
        self.verdict.is_irrigate()
    }
}
