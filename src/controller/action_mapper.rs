//! # Action Mapper Module
//!
//! Maps controller state to camera-control intents for the host.
//!
//! ## Discrete Actions
//!
//! Fired once on the tick a button goes down, in this fixed order:
//!
//! | Button | Action |
//! |--------|--------|
//! | A | View through camera |
//! | X | Camera to view |
//! | B | Camera to view selected |
//! | Y | Render |
//! | D-Pad Left | Previous camera |
//! | D-Pad Right | Next camera |
//! | D-Pad Up | Previous profile |
//! | D-Pad Down | Next profile |
//!
//! ## Continuous Adjustment
//!
//! Computed every tick from held state, scaled by `move_speed * 0.1`:
//!
//! | Input | Output |
//! |-------|--------|
//! | RT / LT | Dolly forward / back |
//! | LB / RB | Roll +/- (additive when both held) |
//! | Right Stick X | Yaw |
//! | Right Stick Y | Pitch |
//! | Left Stick | Pan |
//!
//! ## Usage
//!
//! ```
//! use pad_camera::controller::action_mapper::{ActionIntent, ActionMapper, DiscreteAction};
//! use pad_camera::controller::state::{ButtonId, ButtonSet, ControllerState};
//!
//! let mut mapper = ActionMapper::new();
//! mapper.tick(ControllerState::default(), 10.0);
//!
//! let pressed = ControllerState {
//!     buttons: ButtonSet::from_iter([ButtonId::Y]),
//!     ..ControllerState::default()
//! };
//! let intents = mapper.tick(pressed, 10.0);
//!
//! assert_eq!(intents[0], ActionIntent::Discrete(DiscreteAction::Render));
//! assert!(matches!(intents[1], ActionIntent::Continuous(_)));
//! ```

use std::fmt;

use super::deadzone::{normalize_axis, normalize_trigger, Deadzone};
use super::edge::new_presses;
use super::state::{ButtonId, ControllerState};

/// Converts the configured speed (1-100) into per-tick units.
pub const SPEED_SCALE: f32 = 0.1;
/// Trigger contribution to dolly.
pub const DOLLY_FACTOR: f32 = 0.5;
/// Roll per tick while a bumper is held.
pub const ROLL_FACTOR: f32 = 0.01;
/// Right stick contribution to yaw and pitch.
pub const ROTATE_FACTOR: f32 = 0.005;
/// Left stick contribution to pan.
pub const PAN_FACTOR: f32 = 0.2;

/// One-shot camera action fired on a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscreteAction {
    ViewCamera,
    CameraToView,
    CameraToViewSelected,
    Render,
    CycleCameraPrev,
    CycleCameraNext,
    ProfilePrev,
    ProfileNext,
}

impl fmt::Display for DiscreteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscreteAction::ViewCamera => "view camera",
            DiscreteAction::CameraToView => "camera to view",
            DiscreteAction::CameraToViewSelected => "camera to view selected",
            DiscreteAction::Render => "render",
            DiscreteAction::CycleCameraPrev => "previous camera",
            DiscreteAction::CycleCameraNext => "next camera",
            DiscreteAction::ProfilePrev => "previous profile",
            DiscreteAction::ProfileNext => "next profile",
        };
        f.write_str(name)
    }
}

/// Button to action table, in emission order.
pub const ACTION_PRIORITY: [(ButtonId, DiscreteAction); 8] = [
    (ButtonId::A, DiscreteAction::ViewCamera),
    (ButtonId::X, DiscreteAction::CameraToView),
    (ButtonId::B, DiscreteAction::CameraToViewSelected),
    (ButtonId::Y, DiscreteAction::Render),
    (ButtonId::DpadLeft, DiscreteAction::CycleCameraPrev),
    (ButtonId::DpadRight, DiscreteAction::CycleCameraNext),
    (ButtonId::DpadUp, DiscreteAction::ProfilePrev),
    (ButtonId::DpadDown, DiscreteAction::ProfileNext),
];

/// One tick's worth of camera movement, already deadzone-filtered and scaled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraDelta {
    /// Movement along the world Z axis.
    pub dolly: f32,
    /// Rotation about the camera's local Z axis.
    pub yaw: f32,
    /// Rotation about the camera's local X axis.
    pub pitch: f32,
    /// Rotation about the camera's local Y axis.
    pub roll: f32,
    /// Offset along the camera's local X and Z axes.
    pub pan: (f32, f32),
}

impl CameraDelta {
    /// True when applying this delta would change nothing.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dolly == 0.0
            && self.yaw == 0.0
            && self.pitch == 0.0
            && self.roll == 0.0
            && self.pan.0 == 0.0
            && self.pan.1 == 0.0
    }
}

/// Output unit handed to the host consumer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionIntent {
    Discrete(DiscreteAction),
    Continuous(CameraDelta),
}

/// Stateful mapper from controller samples to action intents.
///
/// Holds the previous sample for edge detection. Not thread-safe; owned by
/// the polling session.
#[derive(Debug, Clone, Default)]
pub struct ActionMapper {
    previous_state: Option<ControllerState>,
    deadzone: Deadzone,
}

impl ActionMapper {
    /// Creates a mapper with the default stick deadzone and no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_deadzone(deadzone: Deadzone) -> Self {
        Self {
            previous_state: None,
            deadzone,
        }
    }

    #[must_use]
    pub fn previous_state(&self) -> Option<&ControllerState> {
        self.previous_state.as_ref()
    }

    #[must_use]
    pub fn deadzone(&self) -> Deadzone {
        self.deadzone
    }

    /// Forgets the previous sample so the next tick is a fresh acquisition.
    pub fn reset(&mut self) {
        self.previous_state = None;
    }

    /// Maps one sample to intents and remembers it for the next tick.
    ///
    /// Returns discrete actions for newly pressed buttons in
    /// [`ACTION_PRIORITY`] order, followed by exactly one
    /// [`ActionIntent::Continuous`], even when every field is zero.
    ///
    /// `move_speed` is expected to be positive; it is validated at the
    /// configuration boundary, not here.
    pub fn tick(&mut self, current: ControllerState, move_speed: f32) -> Vec<ActionIntent> {
        let pressed = new_presses(self.previous_state.as_ref(), &current);

        let mut intents: Vec<ActionIntent> = ACTION_PRIORITY
            .iter()
            .filter(|(button, _)| pressed.contains(*button))
            .map(|(_, action)| ActionIntent::Discrete(*action))
            .collect();

        intents.push(ActionIntent::Continuous(self.camera_delta(&current, move_speed)));

        self.previous_state = Some(current);
        intents
    }

    /// Computes the continuous movement for the held state.
    #[must_use]
    pub fn camera_delta(&self, state: &ControllerState, move_speed: f32) -> CameraDelta {
        let speed = move_speed * SPEED_SCALE;

        let dolly = speed
            * (normalize_trigger(state.right_trigger) * DOLLY_FACTOR
                - normalize_trigger(state.left_trigger) * DOLLY_FACTOR);

        let mut roll_direction = 0.0;
        if state.is_held(ButtonId::Lb) {
            roll_direction += 1.0;
        }
        if state.is_held(ButtonId::Rb) {
            roll_direction -= 1.0;
        }
        let roll = speed * ROLL_FACTOR * roll_direction;

        let right = self.deadzone.apply_stick(state.stick_right);
        let left = self.deadzone.apply_stick(state.stick_left);

        let yaw = -normalize_axis(right.x) * speed * ROTATE_FACTOR;
        let pitch = -normalize_axis(right.y) * speed * ROTATE_FACTOR;
        let pan = (
            normalize_axis(left.x) * speed * PAN_FACTOR,
            -normalize_axis(left.y) * speed * PAN_FACTOR,
        );

        CameraDelta {
            dolly,
            yaw,
            pitch,
            roll,
            pan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::state::{ButtonSet, Stick};

    const EPS: f32 = 1e-6;

    fn state_with(buttons: &[ButtonId]) -> ControllerState {
        ControllerState {
            buttons: buttons.iter().copied().collect(),
            ..ControllerState::default()
        }
    }

    fn continuous(intents: &[ActionIntent]) -> CameraDelta {
        match intents.last() {
            Some(ActionIntent::Continuous(delta)) => *delta,
            other => panic!("expected trailing continuous intent, got {:?}", other),
        }
    }

    /// Mapper that has already seen an idle sample.
    fn primed() -> ActionMapper {
        let mut mapper = ActionMapper::new();
        mapper.tick(ControllerState::default(), 10.0);
        mapper
    }

    #[test]
    fn test_first_tick_emits_only_continuous() {
        let mut mapper = ActionMapper::new();
        let intents = mapper.tick(state_with(&[ButtonId::A, ButtonId::Y]), 10.0);

        assert_eq!(intents.len(), 1);
        assert!(continuous(&intents).is_zero());
        assert!(mapper.previous_state().is_some());
    }

    #[test]
    fn test_simultaneous_presses_in_priority_order() {
        let mut mapper = primed();
        let intents = mapper.tick(state_with(&[ButtonId::X, ButtonId::A]), 10.0);

        assert_eq!(intents.len(), 3);
        assert_eq!(intents[0], ActionIntent::Discrete(DiscreteAction::ViewCamera));
        assert_eq!(intents[1], ActionIntent::Discrete(DiscreteAction::CameraToView));
        assert!(matches!(intents[2], ActionIntent::Continuous(_)));
    }

    #[test]
    fn test_all_mapped_buttons_at_once() {
        let mut mapper = primed();
        let all: Vec<ButtonId> = ACTION_PRIORITY.iter().map(|(b, _)| *b).collect();
        let intents = mapper.tick(state_with(&all), 10.0);

        let discrete: Vec<DiscreteAction> = intents
            .iter()
            .filter_map(|intent| match intent {
                ActionIntent::Discrete(action) => Some(*action),
                ActionIntent::Continuous(_) => None,
            })
            .collect();

        assert_eq!(
            discrete,
            vec![
                DiscreteAction::ViewCamera,
                DiscreteAction::CameraToView,
                DiscreteAction::CameraToViewSelected,
                DiscreteAction::Render,
                DiscreteAction::CycleCameraPrev,
                DiscreteAction::CycleCameraNext,
                DiscreteAction::ProfilePrev,
                DiscreteAction::ProfileNext,
            ]
        );
        assert_eq!(intents.len(), 9);
    }

    #[test]
    fn test_held_button_does_not_repeat() {
        let mut mapper = primed();
        let held = state_with(&[ButtonId::Y]);

        assert_eq!(mapper.tick(held, 10.0).len(), 2);
        assert_eq!(mapper.tick(held, 10.0).len(), 1);
        assert_eq!(mapper.tick(held, 10.0).len(), 1);
    }

    #[test]
    fn test_unmapped_buttons_emit_nothing() {
        let mut mapper = primed();
        let intents = mapper.tick(state_with(&[ButtonId::Menu, ButtonId::View]), 10.0);
        assert_eq!(intents.len(), 1);
    }

    #[test]
    fn test_reset_suppresses_next_presses() {
        let mut mapper = primed();
        mapper.reset();
        assert!(mapper.previous_state().is_none());

        let intents = mapper.tick(state_with(&[ButtonId::A]), 10.0);
        assert_eq!(intents.len(), 1);
    }

    #[test]
    fn test_dolly_right_trigger() {
        let mut mapper = primed();
        let state = ControllerState {
            right_trigger: 255,
            ..ControllerState::default()
        };
        let delta = continuous(&mapper.tick(state, 10.0));
        assert!((delta.dolly - 0.5).abs() < EPS);
    }

    #[test]
    fn test_dolly_left_trigger() {
        let mut mapper = primed();
        let state = ControllerState {
            left_trigger: 255,
            ..ControllerState::default()
        };
        let delta = continuous(&mapper.tick(state, 10.0));
        assert!((delta.dolly + 0.5).abs() < EPS);
    }

    #[test]
    fn test_dolly_triggers_cancel() {
        let mapper = ActionMapper::new();
        let state = ControllerState {
            left_trigger: 255,
            right_trigger: 255,
            ..ControllerState::default()
        };
        assert_eq!(mapper.camera_delta(&state, 10.0).dolly, 0.0);
    }

    #[test]
    fn test_yaw_from_right_stick() {
        let mapper = ActionMapper::new();
        let state = ControllerState {
            stick_right: Stick::new(20000, 0),
            ..ControllerState::default()
        };
        let delta = mapper.camera_delta(&state, 10.0);

        assert!((delta.yaw - (-20000.0 / 32768.0 * 0.005)).abs() < EPS);
        assert!((delta.yaw + 0.00305).abs() < 1e-5);
        assert_eq!(delta.pitch, 0.0);
        assert_eq!(delta.pan, (0.0, 0.0));
    }

    #[test]
    fn test_pitch_from_right_stick() {
        let mapper = ActionMapper::new();
        let state = ControllerState {
            stick_right: Stick::new(0, -16384),
            ..ControllerState::default()
        };
        let delta = mapper.camera_delta(&state, 10.0);

        assert!((delta.pitch - 0.5 * 0.005).abs() < EPS);
        assert_eq!(delta.yaw, 0.0);
    }

    #[test]
    fn test_pan_from_left_stick() {
        let mapper = ActionMapper::new();
        let state = ControllerState {
            stick_left: Stick::new(16384, 16384),
            ..ControllerState::default()
        };
        let delta = mapper.camera_delta(&state, 10.0);

        assert!((delta.pan.0 - 0.1).abs() < EPS);
        assert!((delta.pan.1 + 0.1).abs() < EPS);
    }

    #[test]
    fn test_sticks_inside_deadzone_are_zero() {
        let mapper = ActionMapper::new();
        let state = ControllerState {
            stick_left: Stick::new(5000, -5000),
            stick_right: Stick::new(-4999, 1200),
            ..ControllerState::default()
        };
        assert!(mapper.camera_delta(&state, 100.0).is_zero());
    }

    #[test]
    fn test_custom_deadzone() {
        let mapper = ActionMapper::with_deadzone(Deadzone::new(0));
        let state = ControllerState {
            stick_right: Stick::new(100, 0),
            ..ControllerState::default()
        };
        assert!(mapper.camera_delta(&state, 10.0).yaw < 0.0);
    }

    #[test]
    fn test_roll_bumpers() {
        let mapper = ActionMapper::new();

        let lb = mapper.camera_delta(&state_with(&[ButtonId::Lb]), 10.0);
        assert!((lb.roll - 0.01).abs() < EPS);

        let rb = mapper.camera_delta(&state_with(&[ButtonId::Rb]), 10.0);
        assert!((rb.roll + 0.01).abs() < EPS);

        // Additive: both held cancel out
        let both = mapper.camera_delta(&state_with(&[ButtonId::Lb, ButtonId::Rb]), 10.0);
        assert_eq!(both.roll, 0.0);
    }

    #[test]
    fn test_move_speed_scales_linearly() {
        let mapper = ActionMapper::new();
        let state = ControllerState {
            right_trigger: 255,
            ..ControllerState::default()
        };
        let slow = mapper.camera_delta(&state, 1.0);
        let fast = mapper.camera_delta(&state, 100.0);

        assert!((slow.dolly - 0.05).abs() < EPS);
        assert!((fast.dolly - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_idle_delta_is_zero() {
        let mapper = ActionMapper::new();
        let delta = mapper.camera_delta(&ControllerState::default(), 10.0);
        assert!(delta.is_zero());
        assert_eq!(delta, CameraDelta::default());
    }

    #[test]
    fn test_priority_table_covers_distinct_buttons() {
        let buttons: ButtonSet = ACTION_PRIORITY.iter().map(|(b, _)| *b).collect();
        assert_eq!(buttons.len(), ACTION_PRIORITY.len());
    }
}
