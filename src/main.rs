//! # Pad Camera
//!
//! Drive a camera rig with a gamepad.
//!
//! Reads the controller through evdev at a fixed rate and applies the
//! derived camera intents to an in-process [`CameraRig`].

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pad_camera::backend::evdev::EvdevBackend;
use pad_camera::backend::latest::LatestSampleBackend;
use pad_camera::config::{Config, LoggingConfig};
use pad_camera::host::CameraRig;
use pad_camera::polling::{ControlMessage, PollingLoop};

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Rolling log file prefix inside `logging.log_dir`
const LOG_FILE_PREFIX: &str = "pad-camera.log";

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (defaults when the file is absent)
///    - Set up logging
///    - Start the evdev backend on its worker thread
///
/// 2. **Main Loop**
///    - Poll the controller every `polling.interval_ms`
///    - Apply intents to the camera rig
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration file exists but is invalid, or the
/// backend worker cannot be started. A missing controller is not an error.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let (config, loaded) = load_config(Path::new(&path))?;

    let _guard = init_logging(&config.logging);

    info!("Pad Camera v{} starting...", env!("CARGO_PKG_VERSION"));
    if loaded {
        info!("Loaded configuration from {}", path);
    } else {
        warn!("No configuration at {}, using defaults", path);
    }

    let rescan = Duration::from_millis(config.controller.rescan_interval_ms);
    let evdev = if config.controller.device_path.is_empty() {
        EvdevBackend::new(rescan)
    } else {
        EvdevBackend::with_device_path(&config.controller.device_path, rescan)
    };

    let period = Duration::from_millis(config.polling.interval_ms);
    let backend = LatestSampleBackend::spawn(evdev, config.controller.controller_id, period)
        .context("Failed to start controller backend")?;

    let mut rig = CameraRig::new(config.camera.cameras.iter().cloned());
    rig.set_focal_length(config.camera.focal_length)?;

    let mut polling = PollingLoop::new(backend, rig, config.polling_settings());

    let (tx, rx) = mpsc::channel(16);
    if config.polling.start_enabled {
        tx.send(ControlMessage::Start).await?;
    }

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down..."),
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
        let _ = tx.send(ControlMessage::Shutdown).await;
    });

    info!("Polling controller every {} ms", config.polling.interval_ms);
    info!("Press Ctrl+C to exit");

    polling.run(period, rx).await;

    let counts = polling.consumer().counts();
    info!(
        "Session totals: {} renders, {} camera-to-view, {} redraws",
        counts.renders, counts.camera_to_view, counts.redraws
    );

    Ok(())
}

/// Load `path`, or defaults when it does not exist.
///
/// Returns the configuration and whether it came from the file.
fn load_config(path: &Path) -> Result<(Config, bool)> {
    if !path.exists() {
        return Ok((Config::default(), false));
    }
    let config = Config::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok((config, true))
}

/// Console logging, plus a daily rolling file when `log_dir` is set.
///
/// `RUST_LOG` takes precedence over the configured level. The returned
/// guard flushes the file writer and must outlive the run.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Some(guard)
}
