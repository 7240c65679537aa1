//! # Error Types
//!
//! Custom error types for Pad Camera using `thiserror`.

use thiserror::Error;

/// Main error type for Pad Camera
#[derive(Debug, Error)]
pub enum PadCameraError {
    /// No controller connected, backend failure, or a malformed report.
    ///
    /// Never fatal: the polling loop reports it once per episode and re-polls.
    #[error("Controller unavailable: {0}")]
    DeviceUnavailable(String),

    /// A configuration value outside its allowed range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file parse errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Pad Camera
pub type Result<T> = std::result::Result<T, PadCameraError>;
