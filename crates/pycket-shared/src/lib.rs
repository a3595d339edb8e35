//! # Pycket Shared
//! 
//! Constants, host settings, errors and telemetry shared by the session crates.

pub mod constants;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::{HostSettings, SettingsReader};
pub use error::AppError;
