//! # Camera Profiles
//!
//! Named focal-length presets cycled with the D-pad.
//!
//! | Profile | Name | Focal Length |
//! |---------|------|--------------|
//! | `Fisheye` | Fisheye Madness | 10 mm |
//! | `Architect` | Architect's Dream | 18 mm |
//! | `Street` | Street Classic | 24 mm |
//! | `Cinema` | Everyday Cinema | 35 mm |
//! | `Portrait` | Portrait Standard | 50 mm |
//! | `Closeup` | Soft Close-Up | 85 mm |
//! | `Telescope` | Telescope Feel | 135 mm |

use std::collections::HashMap;
use std::fmt;

/// Focal-length preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraProfile {
    Fisheye,
    Architect,
    Street,
    Cinema,
    #[default]
    Portrait,
    Closeup,
    Telescope,
}

impl CameraProfile {
    /// Every profile, in cycling order.
    pub const ALL: [CameraProfile; 7] = [
        CameraProfile::Fisheye,
        CameraProfile::Architect,
        CameraProfile::Street,
        CameraProfile::Cinema,
        CameraProfile::Portrait,
        CameraProfile::Closeup,
        CameraProfile::Telescope,
    ];

    /// Stable identifier, e.g. `"PORTRAIT"`.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            CameraProfile::Fisheye => "FISHEYE",
            CameraProfile::Architect => "ARCHITECT",
            CameraProfile::Street => "STREET",
            CameraProfile::Cinema => "CINEMA",
            CameraProfile::Portrait => "PORTRAIT",
            CameraProfile::Closeup => "CLOSEUP",
            CameraProfile::Telescope => "TELESCOPE",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CameraProfile::Fisheye => "Fisheye Madness",
            CameraProfile::Architect => "Architect's Dream",
            CameraProfile::Street => "Street Classic",
            CameraProfile::Cinema => "Everyday Cinema",
            CameraProfile::Portrait => "Portrait Standard",
            CameraProfile::Closeup => "Soft Close-Up",
            CameraProfile::Telescope => "Telescope Feel",
        }
    }

    /// Focal length in millimetres.
    #[must_use]
    pub const fn focal_length(self) -> u32 {
        match self {
            CameraProfile::Fisheye => 10,
            CameraProfile::Architect => 18,
            CameraProfile::Street => 24,
            CameraProfile::Cinema => 35,
            CameraProfile::Portrait => 50,
            CameraProfile::Closeup => 85,
            CameraProfile::Telescope => 135,
        }
    }

    /// Looks a profile up by its identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|profile| profile.id() == id)
    }

    /// Steps `direction` places through [`CameraProfile::ALL`], wrapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_camera::profile::CameraProfile;
    ///
    /// assert_eq!(CameraProfile::Portrait.cycle(1), CameraProfile::Closeup);
    /// assert_eq!(CameraProfile::Fisheye.cycle(-1), CameraProfile::Telescope);
    /// ```
    #[must_use]
    pub fn cycle(self, direction: i32) -> Self {
        let len = Self::ALL.len() as i32;
        let index = Self::ALL
            .iter()
            .position(|profile| *profile == self)
            .unwrap_or(0) as i32;
        Self::ALL[(index + direction).rem_euclid(len) as usize]
    }
}

impl fmt::Display for CameraProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} mm)", self.name(), self.focal_length())
    }
}

/// Per-camera profile assignment, keyed by camera name.
///
/// Cameras without an entry use [`CameraProfile::default`].
#[derive(Debug, Clone, Default)]
pub struct ProfileBook {
    profiles: HashMap<String, CameraProfile>,
}

impl ProfileBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile of `camera`, defaulting to Portrait when none was set.
    #[must_use]
    pub fn get(&self, camera: &str) -> CameraProfile {
        self.profiles.get(camera).copied().unwrap_or_default()
    }

    pub fn set(&mut self, camera: &str, profile: CameraProfile) {
        self.profiles.insert(camera.to_string(), profile);
    }

    /// Advances `camera`'s profile by `direction` and returns the new one.
    pub fn cycle(&mut self, camera: &str, direction: i32) -> CameraProfile {
        let next = self.get(camera).cycle(direction);
        self.set(camera, next);
        next
    }
}
