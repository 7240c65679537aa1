//! # Pad Camera Library
//!
//! Drive a 3D application's camera with a gamepad.
//!
//! This library samples a controller at a fixed rate, derives button-press
//! edges and deadzone-filtered stick axes, and maps them to camera-control
//! intents (dolly, pan, rotate, roll, camera cycling, focal-length profiles,
//! render) for a host consumer to apply.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod polling;
pub mod profile;
