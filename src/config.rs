//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; missing values take their defaults.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::controller::deadzone::{Deadzone, MAX_STICK_DEADZONE};
use crate::error::{PadCameraError, Result};
use crate::host::{FOCAL_LENGTH_MAX, FOCAL_LENGTH_MIN};
use crate::polling::PollingSettings;

/// Slowest and fastest accepted camera speed.
pub const MOVE_SPEED_MIN: u32 = 1;
pub const MOVE_SPEED_MAX: u32 = 100;

/// Log levels accepted in `[logging] level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default)]
    pub controller_id: u32,

    #[serde(default = "default_stick_deadzone")]
    pub stick_deadzone: i32,

    /// Fixed evdev device path; empty means scan `/dev/input`.
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,
}

/// Camera configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default = "default_move_speed")]
    pub move_speed: u32,

    #[serde(default = "default_focal_length")]
    pub focal_length: u32,

    #[serde(default = "default_cameras")]
    pub cameras: Vec<String>,
}

/// Polling loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub debug_enabled: bool,

    #[serde(default = "default_start_enabled")]
    pub start_enabled: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; empty logs to stdout only.
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_stick_deadzone() -> i32 { 5000 }
fn default_rescan_interval_ms() -> u64 { 1000 }

fn default_move_speed() -> u32 { 10 }
fn default_focal_length() -> u32 { 50 }
fn default_cameras() -> Vec<String> { vec!["Camera".to_string()] }

fn default_interval_ms() -> u64 { 20 }
fn default_start_enabled() -> bool { true }

fn default_log_level() -> String { "info".to_string() }

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            controller_id: 0,
            stick_deadzone: default_stick_deadzone(),
            device_path: String::new(),
            rescan_interval_ms: default_rescan_interval_ms(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            focal_length: default_focal_length(),
            cameras: default_cameras(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            debug_enabled: false,
            start_enabled: default_start_enabled(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// Check a camera speed against the accepted 1-100 range.
///
/// # Errors
///
/// Returns `InvalidConfiguration` when out of range.
pub fn validate_move_speed(move_speed: u32) -> Result<()> {
    if !(MOVE_SPEED_MIN..=MOVE_SPEED_MAX).contains(&move_speed) {
        return Err(invalid(format!(
            "move_speed must be between {} and {}",
            MOVE_SPEED_MIN, MOVE_SPEED_MAX
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> PadCameraError {
    PadCameraError::InvalidConfiguration(message.into())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_camera::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if any value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.controller.stick_deadzone < 0 || self.controller.stick_deadzone > MAX_STICK_DEADZONE {
            return Err(invalid(format!(
                "stick_deadzone must be between 0 and {}",
                MAX_STICK_DEADZONE
            )));
        }

        if self.controller.rescan_interval_ms == 0 || self.controller.rescan_interval_ms > 60000 {
            return Err(invalid("rescan_interval_ms must be between 1 and 60000"));
        }

        validate_move_speed(self.camera.move_speed)?;

        if !(FOCAL_LENGTH_MIN..=FOCAL_LENGTH_MAX).contains(&self.camera.focal_length) {
            return Err(invalid(format!(
                "focal_length must be between {} and {}",
                FOCAL_LENGTH_MIN, FOCAL_LENGTH_MAX
            )));
        }

        if self.camera.cameras.is_empty() {
            return Err(invalid("cameras must name at least one camera"));
        }

        if self.camera.cameras.iter().any(|name| name.trim().is_empty()) {
            return Err(invalid("camera names cannot be empty"));
        }

        if self.polling.interval_ms == 0 || self.polling.interval_ms > 1000 {
            return Err(invalid("interval_ms must be between 1 and 1000"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "log level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Settings handed to the polling loop.
    #[must_use]
    pub fn polling_settings(&self) -> PollingSettings {
        PollingSettings {
            move_speed: self.camera.move_speed,
            debug_enabled: self.polling.debug_enabled,
            controller_id: self.controller.controller_id,
            deadzone: Deadzone::new(self.controller.stick_deadzone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[controller]
controller_id = 1

[camera]
move_speed = 25
cameras = ["Camera", "Camera.001"]

[polling]
debug_enabled = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.controller.controller_id, 1);
        assert_eq!(config.camera.move_speed, 25);
        assert_eq!(config.camera.cameras.len(), 2);
        assert!(config.polling.debug_enabled);
        assert_eq!(config.polling.interval_ms, 20);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.camera.move_speed, 10);
        assert_eq!(config.controller.stick_deadzone, 5000);
        assert!(config.polling.start_enabled);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/pad-camera.toml");
        assert!(matches!(result, Err(PadCameraError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml("[camera\nmove_speed = ");
        assert!(matches!(result, Err(PadCameraError::Config(_))));
    }

    #[test]
    fn test_out_of_range_value_in_file() {
        let result = Config::from_toml("[camera]\nmove_speed = 0\n");
        assert!(matches!(result, Err(PadCameraError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_move_speed_bounds() {
        assert!(validate_move_speed(0).is_err());
        assert!(validate_move_speed(1).is_ok());
        assert!(validate_move_speed(100).is_ok());
        assert!(validate_move_speed(101).is_err());
    }

    #[test]
    fn test_stick_deadzone_negative() {
        let mut config = Config::default();
        config.controller.stick_deadzone = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stick_deadzone_too_high() {
        let mut config = Config::default();
        config.controller.stick_deadzone = 32768;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rescan_interval_zero() {
        let mut config = Config::default();
        config.controller.rescan_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_focal_length_bounds() {
        let mut config = Config::default();
        config.camera.focal_length = 0;
        assert!(config.validate().is_err());
        config.camera.focal_length = 5001;
        assert!(config.validate().is_err());
        config.camera.focal_length = 5000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_cameras() {
        let mut config = Config::default();
        config.camera.cameras.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_camera_name() {
        let mut config = Config::default();
        config.camera.cameras.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_bounds() {
        let mut config = Config::default();
        config.polling.interval_ms = 0;
        assert!(config.validate().is_err());
        config.polling.interval_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in LOG_LEVELS {
            let mut config = Config::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Log level {} should be valid", level);
        }
    }

    #[test]
    fn test_polling_settings() {
        let mut config = Config::default();
        config.camera.move_speed = 42;
        config.controller.controller_id = 2;
        config.controller.stick_deadzone = 1000;
        config.polling.debug_enabled = true;

        let settings = config.polling_settings();
        assert_eq!(settings.move_speed, 42);
        assert_eq!(settings.controller_id, 2);
        assert_eq!(settings.deadzone.threshold(), 1000);
        assert!(settings.debug_enabled);
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_stick_deadzone(), 5000);
        assert_eq!(default_rescan_interval_ms(), 1000);
        assert_eq!(default_move_speed(), 10);
        assert_eq!(default_focal_length(), 50);
        assert_eq!(default_cameras(), vec!["Camera".to_string()]);
        assert_eq!(default_interval_ms(), 20);
        assert_eq!(default_start_enabled(), true);
        assert_eq!(default_log_level(), "info");
    }
}
