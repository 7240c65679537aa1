//! # Deadzone Module
//!
//! Removes analog stick noise near center.
//!
//! Raw sticks report small non-zero values at rest, which would make the
//! camera drift while the controller sits idle. Any axis value whose
//! magnitude is at or below the threshold is replaced with exactly zero;
//! everything outside passes through unchanged (no rescaling), so the
//! filter is idempotent.
//!
//! ## Usage
//!
//! ```
//! use pad_camera::controller::deadzone::{filter, DEFAULT_STICK_DEADZONE};
//!
//! assert_eq!(filter(5000, DEFAULT_STICK_DEADZONE), 0);
//! assert_eq!(filter(5001, DEFAULT_STICK_DEADZONE), 5001);
//! ```

use super::state::Stick;

/// Default stick deadzone in raw axis units.
pub const DEFAULT_STICK_DEADZONE: i32 = 5000;

/// Largest meaningful threshold; anything above filters every value.
pub const MAX_STICK_DEADZONE: i32 = i16::MAX as i32;

/// Returns 0 if `|value| <= threshold`, else `value`.
#[must_use]
pub fn filter(value: i16, threshold: i32) -> i16 {
    // widen first: i16::MIN has no positive counterpart
    if i32::from(value).abs() <= threshold {
        0
    } else {
        value
    }
}

/// Per-axis deadzone applied independently to both stick components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadzone {
    threshold: i32,
}

impl Default for Deadzone {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_STICK_DEADZONE,
        }
    }
}

impl Deadzone {
    /// Creates a deadzone with the given threshold, clamped to 0..=32767.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_camera::controller::deadzone::Deadzone;
    ///
    /// let dz = Deadzone::new(-10);
    /// assert_eq!(dz.threshold(), 0);
    /// ```
    #[must_use]
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold: threshold.clamp(0, MAX_STICK_DEADZONE),
        }
    }

    #[must_use]
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Filters a single axis value.
    #[inline]
    #[must_use]
    pub fn apply(&self, value: i16) -> i16 {
        filter(value, self.threshold)
    }

    /// Filters both axes of a stick.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_camera::controller::deadzone::Deadzone;
    /// use pad_camera::controller::state::Stick;
    ///
    /// let dz = Deadzone::default();
    /// assert_eq!(dz.apply_stick(Stick::new(300, -20000)), Stick::new(0, -20000));
    /// ```
    #[must_use]
    pub fn apply_stick(&self, stick: Stick) -> Stick {
        Stick::new(self.apply(stick.x), self.apply(stick.y))
    }
}

/// Converts a raw stick axis value to -1.0..1.0 by dividing by 32768.
#[inline]
#[must_use]
pub fn normalize_axis(value: i16) -> f32 {
    f32::from(value) / 32768.0
}

/// Converts a raw trigger value to 0.0..=1.0.
#[inline]
#[must_use]
pub fn normalize_trigger(value: u8) -> f32 {
    f32::from(value) / 255.0
}
