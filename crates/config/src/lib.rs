// Configuration Management
//
// This crate handles all configuration loading for the authcode sample.
// It provides:
// - Configuration structs read from the process environment
// - Cloud Foundry service-binding lookups (VCAP_SERVICES)
// - Default configuration values
//
// This keeps configuration concerns separate from the web and service layers.

use thiserror::Error;

pub mod types;
pub mod vcap;

// Re-export all configuration types
pub use types::*;
pub use vcap::VcapServices;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingVar(String),

    #[error("{var} is invalid: {reason}")]
    InvalidVar { var: String, reason: String },

    #[error("Failed to parse VCAP_SERVICES: {source}")]
    VcapParse {
        #[from]
        source: serde_json::Error,
    },

    #[error("Bound service '{0}' not found")]
    ServiceNotFound(String),

    #[error("Property '{property}' not found on bound service '{service}'")]
    PropertyNotFound { service: String, property: String },

    #[error("Missing auth configuration: {}", .0.join("; "))]
    Incomplete(Vec<String>),
}
