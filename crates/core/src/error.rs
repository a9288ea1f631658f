//! Error types for Runway
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use runway_device_bridge::{DriverError, InventoryError, Platform, UnknownPlatform};

/// Main error type for Runway
#[derive(Error, Debug)]
pub enum RunwayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error(transparent)]
    UnknownPlatform(#[from] UnknownPlatform),

    #[error("No platform strategy registered for {0}")]
    NoStrategy(Platform),

    #[error("Missing {0} in target specification")]
    MissingField(&'static str),
}

/// Result type alias for Runway operations
pub type Result<T> = std::result::Result<T, RunwayError>;

impl RunwayError {
    /// Failures of the collaborators rather than of the request
    pub fn is_external(&self) -> bool {
        matches!(self, RunwayError::Inventory(_) | RunwayError::Driver(_))
    }
}
