//! # Edge Detector
//!
//! Turns level-triggered buttons into edge events by comparing consecutive
//! samples.
//!
//! A held button reads as pressed on every tick; only the tick where it goes
//! from released to pressed counts as a press. Without a previous sample
//! (first tick after acquiring a controller) nothing is reported, so holding
//! a button across a reconnect never fires an action.

use super::state::{ButtonSet, ControllerState};

/// Buttons pressed in `current` that were not pressed in `previous`.
///
/// Returns the empty set when there is no previous sample.
///
/// # Examples
///
/// ```
/// use pad_camera::controller::edge::new_presses;
/// use pad_camera::controller::state::{ButtonId, ButtonSet, ControllerState};
///
/// let prev = ControllerState::default();
/// let cur = ControllerState {
///     buttons: ButtonSet::from_iter([ButtonId::A]),
///     ..ControllerState::default()
/// };
///
/// assert!(new_presses(Some(&prev), &cur).contains(ButtonId::A));
/// assert!(new_presses(None, &cur).is_empty());
/// ```
#[must_use]
pub fn new_presses(previous: Option<&ControllerState>, current: &ControllerState) -> ButtonSet {
    match previous {
        Some(previous) => current.buttons.difference(previous.buttons),
        None => ButtonSet::empty(),
    }
}

/// Buttons pressed in `previous` that are released in `current`.
///
/// Returns the empty set when there is no previous sample.
#[must_use]
pub fn new_releases(previous: Option<&ControllerState>, current: &ControllerState) -> ButtonSet {
    match previous {
        Some(previous) => previous.buttons.difference(current.buttons),
        None => ButtonSet::empty(),
    }
}

/// Press and release edges between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub pressed: ButtonSet,
    pub released: ButtonSet,
}

impl Edges {
    #[must_use]
    pub fn between(previous: Option<&ControllerState>, current: &ControllerState) -> Self {
        Self {
            pressed: new_presses(previous, current),
            released: new_releases(previous, current),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty() && self.released.is_empty()
    }
}
