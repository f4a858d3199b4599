pub mod config;
pub mod error;
pub mod premium;
pub mod telemetry;
