use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Water balance components of one simulation step. Depths are in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterBalanceStep {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub moisture_start: f64,
    pub precipitation_mm: f64,
    pub infiltration_mm: f64,
    pub runoff_mm: f64,
    pub deep_percolation_mm: f64,
    pub reference_et_mm: f64,
    pub crop_et_mm: f64,
    /// Volumetric water content at the end of the step.
    pub moisture: f64,
}

/// Forecasted no-intervention soil moisture path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrajectory {
    pub steps: Vec<WaterBalanceStep>,
    pub min_index: usize,
}

impl SimulationTrajectory {
    /// Build from completed steps. The minimum is the earliest lowest value.
    pub fn from_steps(steps: Vec<WaterBalanceStep>) -> Option<Self> {
        let mut min_index = 0;
        for (i, step) in steps.iter().enumerate().skip(1) {
            if step.moisture < steps[min_index].moisture {
                min_index = i;
            }
        }
        if steps.is_empty() {
            None
        } else {
            Some(Self { steps, min_index })
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn moisture(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.moisture).collect()
    }

    pub fn minimum(&self) -> f64 {
        self.steps[self.min_index].moisture
    }

    pub fn minimum_time(&self) -> DateTime<Utc> {
        self.steps[self.min_index].timestamp
    }

    pub fn final_moisture(&self) -> f64 {
        self.steps[self.steps.len() - 1].moisture
    }

    pub fn total_crop_et_mm(&self) -> f64 {
        self.steps.iter().map(|s| s.crop_et_mm).sum()
    }

    pub fn total_runoff_mm(&self) -> f64 {
        self.steps.iter().map(|s| s.runoff_mm).sum()
    }

    pub fn total_deep_percolation_mm(&self) -> f64 {
        self.steps.iter().map(|s| s.deep_percolation_mm).sum()
    }
}
