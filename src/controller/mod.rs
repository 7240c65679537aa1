//! # Controller Module
//!
//! Gamepad sample processing.
//!
//! This module handles:
//! - Decoding raw XInput-layout reports into a normalized state
//! - Applying the stick deadzone
//! - Detecting button press/release edges between samples
//! - Mapping state to camera-control intents

pub mod action_mapper;
pub mod deadzone;
pub mod edge;
pub mod state;
pub mod xinput;

pub use action_mapper::{ActionIntent, ActionMapper, CameraDelta, DiscreteAction};
pub use state::{ButtonId, ButtonSet, ControllerState, Stick};
pub use xinput::RawSample;
