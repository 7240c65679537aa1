//! # Evdev Backend
//!
//! Reads gamepads through the Linux evdev interface and reports them in the
//! XInput sample layout.
//!
//! ## Controller Detection
//!
//! Every `/dev/input/event*` device exposing a south face button and an
//! analog stick counts as a gamepad. Gamepads are sorted by device path and
//! the controller id indexes that list.
//!
//! ## Axis Layouts
//!
//! | Input | xpad (Xbox) | DualSense |
//! |-------|-------------|-----------|
//! | Left Stick | ABS_X / ABS_Y | ABS_X / ABS_Y |
//! | Right Stick | ABS_RX / ABS_RY | ABS_Z / ABS_RZ |
//! | Triggers | ABS_Z / ABS_RZ | ABS_RX / ABS_RY |
//! | D-Pad | ABS_HAT0X / ABS_HAT0Y | ABS_HAT0X / ABS_HAT0Y |
//!
//! evdev Y axes grow downward; XInput Y axes grow upward, so both stick Y
//! values are inverted.
//!
//! ## Reading State
//!
//! Each poll reads the key and axis state with a single ioctl each instead
//! of consuming the event queue, so it never blocks and never lags behind.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use evdev::{AbsoluteAxisType, Device, Key};
use tracing::{debug, info, warn};

use super::DeviceBackend;
use crate::controller::state::ButtonId;
use crate::controller::RawSample;
use crate::error::{PadCameraError, Result};

/// Sony vendor ID; DualSense and DualShock use the alternate axis layout.
const SONY_VENDOR_ID: u16 = 0x054c;

/// Input directory scanned for event devices.
const INPUT_DIR: &str = "/dev/input";

/// Key code to button table.
///
/// Face buttons follow the kernel gamepad layout (west/north are X/Y).
const KEY_MAP: [(Key, ButtonId); 12] = [
    (Key::BTN_SOUTH, ButtonId::A),
    (Key::BTN_EAST, ButtonId::B),
    (Key::BTN_WEST, ButtonId::X),
    (Key::BTN_NORTH, ButtonId::Y),
    (Key::BTN_TL, ButtonId::Lb),
    (Key::BTN_TR, ButtonId::Rb),
    (Key::BTN_START, ButtonId::Menu),
    (Key::BTN_SELECT, ButtonId::View),
    (Key::BTN_DPAD_UP, ButtonId::DpadUp),
    (Key::BTN_DPAD_DOWN, ButtonId::DpadDown),
    (Key::BTN_DPAD_LEFT, ButtonId::DpadLeft),
    (Key::BTN_DPAD_RIGHT, ButtonId::DpadRight),
];

/// Which axes carry the right stick and the triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisLayout {
    Xpad,
    DualSense,
}

impl AxisLayout {
    fn for_vendor(vendor: u16) -> Self {
        if vendor == SONY_VENDOR_ID {
            AxisLayout::DualSense
        } else {
            AxisLayout::Xpad
        }
    }

    /// (right stick X, right stick Y, left trigger, right trigger)
    fn axes(self) -> [AbsoluteAxisType; 4] {
        match self {
            AxisLayout::Xpad => [
                AbsoluteAxisType::ABS_RX,
                AbsoluteAxisType::ABS_RY,
                AbsoluteAxisType::ABS_Z,
                AbsoluteAxisType::ABS_RZ,
            ],
            AxisLayout::DualSense => [
                AbsoluteAxisType::ABS_Z,
                AbsoluteAxisType::ABS_RZ,
                AbsoluteAxisType::ABS_RX,
                AbsoluteAxisType::ABS_RY,
            ],
        }
    }
}

/// Value and range of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct AxisReading {
    value: i32,
    minimum: i32,
    maximum: i32,
}

/// An opened gamepad.
struct Gamepad {
    device: Device,
    path: PathBuf,
    layout: AxisLayout,
}

/// Device backend over Linux evdev gamepads.
///
/// Keeps the selected gamepad open between polls. When it disappears the
/// handle is dropped and the input directory is rescanned, at most once per
/// rescan interval.
pub struct EvdevBackend {
    gamepad: Option<Gamepad>,
    controller_id: Option<u32>,
    device_path: Option<PathBuf>,
    rescan_interval: Duration,
    last_scan: Option<Instant>,
}

impl std::fmt::Debug for EvdevBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevBackend")
            .field("path", &self.gamepad.as_ref().map(|g| &g.path))
            .field("controller_id", &self.controller_id)
            .field("rescan_interval", &self.rescan_interval)
            .finish_non_exhaustive()
    }
}

impl EvdevBackend {
    /// Creates a backend that scans `/dev/input` for gamepads.
    ///
    /// Nothing is opened until the first poll.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use pad_camera::backend::DeviceBackend;
    /// use pad_camera::backend::evdev::EvdevBackend;
    ///
    /// let mut backend = EvdevBackend::new(Duration::from_secs(1));
    /// match backend.poll(0) {
    ///     Ok(sample) => println!("buttons: 0x{:04x}", sample.buttons),
    ///     Err(e) => println!("{}", e),
    /// }
    /// ```
    #[must_use]
    pub fn new(rescan_interval: Duration) -> Self {
        Self {
            gamepad: None,
            controller_id: None,
            device_path: None,
            rescan_interval,
            last_scan: None,
        }
    }

    /// Creates a backend bound to one device path instead of scanning.
    ///
    /// The controller id is ignored in this mode.
    #[must_use]
    pub fn with_device_path<P: AsRef<Path>>(path: P, rescan_interval: Duration) -> Self {
        Self {
            device_path: Some(path.as_ref().to_path_buf()),
            ..Self::new(rescan_interval)
        }
    }

    /// Path of the currently open gamepad, if any.
    #[must_use]
    pub fn device_path(&self) -> Option<&Path> {
        self.gamepad.as_ref().map(|g| g.path.as_path())
    }

    fn acquire(&mut self, controller_id: u32) -> Result<()> {
        if self.controller_id != Some(controller_id) {
            // switching controllers always rescans immediately
            self.gamepad = None;
            self.last_scan = None;
            self.controller_id = Some(controller_id);
        }

        if self.gamepad.is_some() {
            return Ok(());
        }

        if let Some(last) = self.last_scan {
            if last.elapsed() < self.rescan_interval {
                return Err(PadCameraError::DeviceUnavailable(
                    "No controller detected".to_string(),
                ));
            }
        }
        self.last_scan = Some(Instant::now());

        let gamepad = match &self.device_path {
            Some(path) => open_gamepad(path)?,
            None => find_gamepad(controller_id)?,
        };

        info!(
            "Found controller {} at: {} ({})",
            controller_id,
            gamepad.path.display(),
            gamepad.device.name().unwrap_or("unnamed")
        );
        self.gamepad = Some(gamepad);
        Ok(())
    }
}

impl DeviceBackend for EvdevBackend {
    fn poll(&mut self, controller_id: u32) -> Result<RawSample> {
        self.acquire(controller_id)?;

        let gamepad = self.gamepad.as_ref().ok_or_else(|| {
            PadCameraError::DeviceUnavailable("No controller detected".to_string())
        })?;

        match read_sample(gamepad) {
            Ok(sample) => Ok(sample),
            Err(e) => {
                warn!("Lost controller at {}: {}", gamepad.path.display(), e);
                self.gamepad = None;
                Err(e)
            }
        }
    }
}

/// Scan the input directory and open the `controller_id`-th gamepad.
fn find_gamepad(controller_id: u32) -> Result<Gamepad> {
    let input_dir = Path::new(INPUT_DIR);

    let mut paths: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .map_err(|e| {
            PadCameraError::DeviceUnavailable(format!("Failed to read {}: {}", INPUT_DIR, e))
        })?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with("event"))
                .unwrap_or(false)
        })
        .collect();

    // Sorted for deterministic controller ids when several are connected
    paths.sort();

    let mut index = 0u32;
    for path in paths {
        match Device::open(&path) {
            Ok(device) => {
                if !is_gamepad(&device) {
                    continue;
                }
                if index == controller_id {
                    let layout = AxisLayout::for_vendor(device.input_id().vendor());
                    return Ok(Gamepad {
                        device,
                        path,
                        layout,
                    });
                }
                index += 1;
            }
            Err(e) => {
                // Permission denied or other errors - skip device
                debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Err(PadCameraError::DeviceUnavailable(format!(
        "No controller at index {} ({} found)",
        controller_id, index
    )))
}

/// Open a configured device path, checking it is a gamepad.
fn open_gamepad(path: &Path) -> Result<Gamepad> {
    let device = Device::open(path).map_err(|e| {
        PadCameraError::DeviceUnavailable(format!("Failed to open {}: {}", path.display(), e))
    })?;

    if !is_gamepad(&device) {
        return Err(PadCameraError::DeviceUnavailable(format!(
            "{} is not a gamepad",
            path.display()
        )));
    }

    let layout = AxisLayout::for_vendor(device.input_id().vendor());
    Ok(Gamepad {
        device,
        path: path.to_path_buf(),
        layout,
    })
}

fn is_gamepad(device: &Device) -> bool {
    let has_face_button = device
        .supported_keys()
        .map(|keys| keys.contains(Key::BTN_SOUTH))
        .unwrap_or(false);
    let has_stick = device
        .supported_absolute_axes()
        .map(|axes| axes.contains(AbsoluteAxisType::ABS_X) && axes.contains(AbsoluteAxisType::ABS_Y))
        .unwrap_or(false);
    has_face_button && has_stick
}

/// Read key and axis state and assemble an XInput-layout sample.
fn read_sample(gamepad: &Gamepad) -> Result<RawSample> {
    let keys = gamepad.device.get_key_state().map_err(|e| {
        PadCameraError::DeviceUnavailable(format!("Failed to read key state: {}", e))
    })?;
    let abs = gamepad.device.get_abs_state().map_err(|e| {
        PadCameraError::DeviceUnavailable(format!("Failed to read axis state: {}", e))
    })?;

    let axis = |code: AbsoluteAxisType| {
        let info = &abs[code.0 as usize];
        AxisReading {
            value: info.value,
            minimum: info.minimum,
            maximum: info.maximum,
        }
    };

    let mut buttons = KEY_MAP
        .iter()
        .filter(|(key, _)| keys.contains(*key))
        .fold(0u16, |mask, (_, button)| mask | button.mask());
    buttons |= hat_mask(
        axis(AbsoluteAxisType::ABS_HAT0X).value,
        axis(AbsoluteAxisType::ABS_HAT0Y).value,
    );

    let [right_x, right_y, left_trigger, right_trigger] = gamepad.layout.axes();

    Ok(RawSample {
        buttons,
        left_trigger: scale_trigger(axis(left_trigger)),
        right_trigger: scale_trigger(axis(right_trigger)),
        thumb_lx: scale_stick(axis(AbsoluteAxisType::ABS_X)),
        thumb_ly: invert(scale_stick(axis(AbsoluteAxisType::ABS_Y))),
        thumb_rx: scale_stick(axis(right_x)),
        thumb_ry: invert(scale_stick(axis(right_y))),
    })
}

/// D-pad bits from hat axes (-1 = left/up, 1 = right/down).
fn hat_mask(hat_x: i32, hat_y: i32) -> u16 {
    let mut mask = 0;
    if hat_x < 0 {
        mask |= ButtonId::DpadLeft.mask();
    } else if hat_x > 0 {
        mask |= ButtonId::DpadRight.mask();
    }
    if hat_y < 0 {
        mask |= ButtonId::DpadUp.mask();
    } else if hat_y > 0 {
        mask |= ButtonId::DpadDown.mask();
    }
    mask
}

/// Rescale a stick axis from its reported range to the signed 16-bit range.
fn scale_stick(reading: AxisReading) -> i16 {
    let span = i64::from(reading.maximum) - i64::from(reading.minimum);
    if span <= 0 {
        return 0;
    }
    let offset = i64::from(reading.value) - i64::from(reading.minimum);
    let scaled = offset * 65535 / span - 32768;
    scaled.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Rescale a trigger axis from its reported range to 0-255.
fn scale_trigger(reading: AxisReading) -> u8 {
    let span = i64::from(reading.maximum) - i64::from(reading.minimum);
    if span <= 0 {
        return 0;
    }
    let offset = i64::from(reading.value) - i64::from(reading.minimum);
    (offset * 255 / span).clamp(0, 255) as u8
}

/// Flip a Y axis between evdev (down positive) and XInput (up positive).
fn invert(value: i16) -> i16 {
    // -i16::MIN overflows; saturate to the top of the range
    value.checked_neg().unwrap_or(i16::MAX)
}
