pub mod engine;
pub mod evapotranspiration;
pub mod schedule;
pub mod stress;
pub mod threshold;
pub mod water_balance;

pub use engine::{DecisionContext, IrrigationDecisionEngine};
pub use stress::{StressAnalysis, StressLevel};
pub use threshold::{compute_threshold, StressThreshold, TriggerPoints};
pub use water_balance::simulate;
