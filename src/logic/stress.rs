use super::threshold::{StressThreshold, TriggerPoints};
use crate::models::{SimulationTrajectory, Urgency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hours at high or critical stress beyond which irrigation is immediate
const CRITICAL_HOURS: f64 = 12.0;
/// Hours of any stress beyond which irrigation should happen within a day
const SUSTAINED_STRESS_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl StressLevel {
    pub fn classify(moisture: f64, points: &TriggerPoints) -> Self {
        if moisture < points.critical {
            StressLevel::Critical
        } else if moisture < points.high {
            StressLevel::High
        } else if moisture < points.medium {
            StressLevel::Medium
        } else if moisture < points.low {
            StressLevel::Low
        } else {
            StressLevel::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressEvent {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub moisture: f64,
    pub level: StressLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressAnalysis {
    pub events: Vec<StressEvent>,
    /// Early-warning steps count for half their duration.
    pub stress_hours: f64,
    pub critical_hours: f64,
    pub urgency: Urgency,
}

impl StressAnalysis {
    pub fn worst_level(&self) -> StressLevel {
        self.events
            .iter()
            .map(|e| e.level)
            .max()
            .unwrap_or(StressLevel::None)
    }
}

/// Grade every simulated step against the threshold's trigger points.
pub fn analyze(
    trajectory: &SimulationTrajectory,
    threshold: &StressThreshold,
    step_hours: f64,
) -> StressAnalysis {
    let points = threshold.trigger_points();
    let mut stress_hours = 0.0;
    let mut critical_hours = 0.0;

    let events: Vec<StressEvent> = trajectory
        .steps
        .iter()
        .filter_map(|s| {
            let level = StressLevel::classify(s.moisture, &points);
            match level {
                StressLevel::None => return None,
                StressLevel::Low => stress_hours += 0.5 * step_hours,
                StressLevel::High | StressLevel::Critical => {
                    stress_hours += step_hours;
                    critical_hours += step_hours;
                }
                StressLevel::Medium => stress_hours += step_hours,
            }
            Some(StressEvent {
                index: s.index,
                timestamp: s.timestamp,
                moisture: s.moisture,
                level,
            })
        })
        .collect();

    let event_hours = events.len() as f64 * step_hours;
    let urgency = if critical_hours > CRITICAL_HOURS {
        Urgency::Critical
    } else if critical_hours > 0.0 {
        Urgency::High
    } else if event_hours > SUSTAINED_STRESS_HOURS {
        Urgency::Medium
    } else if !events.is_empty() {
        Urgency::Low
    } else {
        Urgency::None
    };

    StressAnalysis {
        events,
        stress_hours,
        critical_hours,
        urgency,
    }
}
