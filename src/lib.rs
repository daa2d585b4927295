//! PREGI: forecast-driven precision irrigation.
//!
//! Soil moisture is projected over a weather forecast with a root-zone water
//! balance and compared against the crop's stress threshold to decide whether
//! and how much to irrigate.

pub mod config;
pub mod datasources;
pub mod error;
pub mod logic;
pub mod models;

pub use config::Config;
pub use error::{PregiError, Result};
pub use logic::{DecisionContext, IrrigationDecisionEngine};
