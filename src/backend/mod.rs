//! # Device Backend Module
//!
//! Trait abstraction over the gamepad transport, so the polling loop can be
//! driven by real hardware or by a test double.
//!
//! This module provides:
//! - [`DeviceBackend`]: the polling contract every transport satisfies
//! - [`evdev::EvdevBackend`]: Linux input devices via evdev
//! - [`latest::LatestSampleBackend`]: single-slot handoff for slow transports

pub mod evdev;
pub mod latest;

use crate::controller::RawSample;
use crate::error::Result;

/// Source of raw controller samples.
///
/// `poll` is called once per tick from the polling loop and must return
/// within the tick budget. A transport that can block should be wrapped in
/// [`latest::LatestSampleBackend`].
#[cfg_attr(test, mockall::automock)]
pub trait DeviceBackend: Send {
    /// Read the current sample for `controller_id`.
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` when no controller is connected at that
    /// index or the read fails. This is a steady condition, not a failure to
    /// retry: the next tick simply polls again.
    fn poll(&mut self, controller_id: u32) -> Result<RawSample>;
}

impl<B: DeviceBackend + ?Sized> DeviceBackend for Box<B> {
    fn poll(&mut self, controller_id: u32) -> Result<RawSample> {
        (**self).poll(controller_id)
    }
}
