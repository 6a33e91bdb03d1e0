//! Household energy calculator, solar sizing and bill estimator, with
//! inference against pre-trained solar production and meter anomaly models.

pub mod api;
pub mod config;
pub mod domain;
pub mod energy;
pub mod errors;
pub mod ml;
pub mod report;
pub mod state;
pub mod telemetry;
