//! # Controller State Module
//!
//! The normalized, immutable snapshot of one controller sample.
//!
//! ## Buttons
//!
//! Buttons form a closed set, each tied to one bit of the XInput
//! `wButtons` mask:
//!
//! | Button | Mask |
//! |--------|------|
//! | D-Pad Up | `0x0001` |
//! | D-Pad Down | `0x0002` |
//! | D-Pad Left | `0x0004` |
//! | D-Pad Right | `0x0008` |
//! | Menu | `0x0010` |
//! | View | `0x0020` |
//! | LB | `0x0100` |
//! | RB | `0x0200` |
//! | A | `0x1000` |
//! | B | `0x2000` |
//! | X | `0x4000` |
//! | Y | `0x8000` |

use std::fmt;

/// Gamepad button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ButtonId {
    A,
    B,
    X,
    Y,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Menu,
    View,
    Lb,
    Rb,
}

impl ButtonId {
    /// Every button, in bit order.
    pub const ALL: [ButtonId; 12] = [
        ButtonId::DpadUp,
        ButtonId::DpadDown,
        ButtonId::DpadLeft,
        ButtonId::DpadRight,
        ButtonId::Menu,
        ButtonId::View,
        ButtonId::Lb,
        ButtonId::Rb,
        ButtonId::A,
        ButtonId::B,
        ButtonId::X,
        ButtonId::Y,
    ];

    /// XInput `wButtons` bit for this button.
    #[must_use]
    pub const fn mask(self) -> u16 {
        match self {
            ButtonId::DpadUp => 0x0001,
            ButtonId::DpadDown => 0x0002,
            ButtonId::DpadLeft => 0x0004,
            ButtonId::DpadRight => 0x0008,
            ButtonId::Menu => 0x0010,
            ButtonId::View => 0x0020,
            ButtonId::Lb => 0x0100,
            ButtonId::Rb => 0x0200,
            ButtonId::A => 0x1000,
            ButtonId::B => 0x2000,
            ButtonId::X => 0x4000,
            ButtonId::Y => 0x8000,
        }
    }

    /// Name as printed in the debug dump.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ButtonId::A => "A",
            ButtonId::B => "B",
            ButtonId::X => "X",
            ButtonId::Y => "Y",
            ButtonId::DpadUp => "DPAD_UP",
            ButtonId::DpadDown => "DPAD_DOWN",
            ButtonId::DpadLeft => "DPAD_LEFT",
            ButtonId::DpadRight => "DPAD_RIGHT",
            ButtonId::Menu => "MENU",
            ButtonId::View => "VIEW",
            ButtonId::Lb => "LB",
            ButtonId::Rb => "RB",
        }
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unordered set of buttons, stored as the bits of a known-button mask.
///
/// Only bits belonging to a [`ButtonId`] are ever set.
///
/// # Examples
///
/// ```
/// use pad_camera::controller::state::{ButtonId, ButtonSet};
///
/// let held = ButtonSet::from_iter([ButtonId::A, ButtonId::X]);
/// let before = ButtonSet::from_iter([ButtonId::A]);
/// let pressed = held.difference(before);
///
/// assert!(pressed.contains(ButtonId::X));
/// assert_eq!(pressed.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonSet(u16);

impl ButtonSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from a raw mask, dropping bits with no [`ButtonId`].
    #[must_use]
    pub fn from_mask(mask: u16) -> Self {
        ButtonId::ALL
            .iter()
            .filter(|button| mask & button.mask() != 0)
            .copied()
            .collect()
    }

    /// Mask of the contained buttons.
    #[must_use]
    pub const fn mask(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, button: ButtonId) -> bool {
        self.0 & button.mask() != 0
    }

    pub fn insert(&mut self, button: ButtonId) {
        self.0 |= button.mask();
    }

    pub fn remove(&mut self, button: ButtonId) {
        self.0 &= !button.mask();
    }

    /// Buttons in `self` that are not in `other`.
    #[must_use]
    pub const fn difference(self, other: ButtonSet) -> ButtonSet {
        ButtonSet(self.0 & !other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the contained buttons in bit order.
    pub fn iter(self) -> impl Iterator<Item = ButtonId> {
        ButtonId::ALL
            .into_iter()
            .filter(move |button| self.contains(*button))
    }
}

impl FromIterator<ButtonId> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = ButtonId>>(iter: I) -> Self {
        let mut set = ButtonSet::empty();
        for button in iter {
            set.insert(button);
        }
        set
    }
}

impl fmt::Display for ButtonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, button) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", button)?;
        }
        f.write_str("]")
    }
}

/// Raw analog stick position, signed 16-bit per axis. Positive Y is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stick {
    pub x: i16,
    pub y: i16,
}

impl Stick {
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// Normalized snapshot of a controller at one tick.
///
/// Triggers are 0-255 by construction; sticks keep the device's raw
/// [-32768, 32767] range.
///
/// # Examples
///
/// ```
/// use pad_camera::controller::state::{ButtonId, ControllerState};
///
/// let state = ControllerState::default();
/// assert!(state.buttons.is_empty());
/// assert!(!state.is_held(ButtonId::Lb));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerState {
    pub buttons: ButtonSet,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub stick_left: Stick,
    pub stick_right: Stick,
}

impl ControllerState {
    #[must_use]
    pub fn is_held(&self, button: ButtonId) -> bool {
        self.buttons.contains(button)
    }

    /// Human-readable multi-line dump shown when debug output is enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_camera::controller::state::ControllerState;
    ///
    /// let dump = ControllerState::default().debug_dump();
    /// assert!(dump.starts_with("Buttons: []"));
    /// ```
    #[must_use]
    pub fn debug_dump(&self) -> String {
        format!(
            "Buttons: {}\nLT: {}, RT: {}\nThumbLX: {}, ThumbLY: {}\nThumbRX: {}, ThumbRY: {}",
            self.buttons,
            self.left_trigger,
            self.right_trigger,
            self.stick_left.x,
            self.stick_left.y,
            self.stick_right.x,
            self.stick_right.y,
        )
    }
}
