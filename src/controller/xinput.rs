//! # XInput Sample Decoder
//!
//! Decodes raw gamepad reports in the XInput `XINPUT_GAMEPAD` layout into a
//! normalized [`ControllerState`].
//!
//! ## Report Layout
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0 | 2 | `wButtons` | Button bitmask (little-endian) |
//! | 2 | 1 | `bLeftTrigger` | Left trigger, 0-255 |
//! | 3 | 1 | `bRightTrigger` | Right trigger, 0-255 |
//! | 4 | 2 | `sThumbLX` | Left stick X, signed |
//! | 6 | 2 | `sThumbLY` | Left stick Y, signed, up positive |
//! | 8 | 2 | `sThumbRX` | Right stick X, signed |
//! | 10 | 2 | `sThumbRY` | Right stick Y, signed, up positive |
//!
//! [`RawSample::parse`] is for backends that receive this report as bytes.
//! The evdev backend reads typed key and axis state instead and builds a
//! [`RawSample`] directly, so it never produces a truncated report.

use bytes::Buf;

use super::state::{ButtonSet, ControllerState, Stick};
use crate::error::{PadCameraError, Result};

/// Size of an `XINPUT_GAMEPAD` report in bytes.
pub const REPORT_SIZE: usize = 12;

/// One raw sample as reported by a device backend.
///
/// Field values are passed through untouched; interpretation happens in
/// [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

impl RawSample {
    /// Parse a little-endian `XINPUT_GAMEPAD` report.
    ///
    /// Trailing bytes beyond [`REPORT_SIZE`] are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` if the report is truncated. The polling
    /// loop treats that the same as a missing controller and skips the tick.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_camera::controller::xinput::RawSample;
    ///
    /// let report = [0x00, 0x10, 0, 255, 0, 0, 0, 0, 0x20, 0x4E, 0, 0];
    /// let raw = RawSample::parse(&report)?;
    /// assert_eq!(raw.buttons, 0x1000);
    /// assert_eq!(raw.right_trigger, 255);
    /// assert_eq!(raw.thumb_rx, 20000);
    /// # Ok::<(), pad_camera::error::PadCameraError>(())
    /// ```
    pub fn parse(report: &[u8]) -> Result<Self> {
        if report.len() < REPORT_SIZE {
            return Err(PadCameraError::DeviceUnavailable(format!(
                "Report too short: expected {} bytes, got {}",
                REPORT_SIZE,
                report.len()
            )));
        }

        let mut buf = &report[..REPORT_SIZE];
        Ok(Self {
            buttons: buf.get_u16_le(),
            left_trigger: buf.get_u8(),
            right_trigger: buf.get_u8(),
            thumb_lx: buf.get_i16_le(),
            thumb_ly: buf.get_i16_le(),
            thumb_rx: buf.get_i16_le(),
            thumb_ry: buf.get_i16_le(),
        })
    }
}

/// Decode a raw sample into a normalized controller state.
///
/// Pure and total: every known button bit maps to exactly one button,
/// unknown bits are dropped.
///
/// # Examples
///
/// ```
/// use pad_camera::controller::state::ButtonId;
/// use pad_camera::controller::xinput::{decode, RawSample};
///
/// let raw = RawSample { buttons: 0x1000 | 0x0100, ..RawSample::default() };
/// let state = decode(&raw);
/// assert!(state.is_held(ButtonId::A));
/// assert!(state.is_held(ButtonId::Lb));
/// ```
#[must_use]
pub fn decode(raw: &RawSample) -> ControllerState {
    ControllerState {
        buttons: ButtonSet::from_mask(raw.buttons),
        left_trigger: raw.left_trigger,
        right_trigger: raw.right_trigger,
        stick_left: Stick::new(raw.thumb_lx, raw.thumb_ly),
        stick_right: Stick::new(raw.thumb_rx, raw.thumb_ry),
    }
}
