//! # Menu ACL Shared
//! 
//! Shared identifiers, configuration, and telemetry for the role menu access service.

pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
