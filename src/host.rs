//! # Host Module
//!
//! The consumer side of the pipeline: the contract a host application
//! implements to receive intents, plus [`CameraRig`], a self-contained host
//! that keeps a list of cameras and applies intents to them.
//!
//! ## Camera Rig Behavior
//!
//! - Cameras are kept sorted by name; if none is active the first becomes
//!   active on demand
//! - D-pad left/right cycle the active camera, wrapping at both ends
//! - D-pad up/down cycle the active camera's focal-length profile
//! - A toggles viewing through the active camera; X does nothing while
//!   viewing through it
//! - Continuous deltas move the active camera: dolly along world Z, pan
//!   along the camera's local X/Z axes, yaw/pitch/roll on its Euler angles
//! - Actions needing a camera only warn when the rig has none

use tracing::{debug, info, warn};

use crate::controller::action_mapper::{ActionIntent, CameraDelta, DiscreteAction};
use crate::error::{PadCameraError, Result};
use crate::profile::{CameraProfile, ProfileBook};

/// Smallest focal length the rig accepts, in millimetres.
pub const FOCAL_LENGTH_MIN: u32 = 1;
/// Largest focal length the rig accepts, in millimetres.
pub const FOCAL_LENGTH_MAX: u32 = 5000;

/// Lifecycle and status events sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    PollingStarted,
    PollingStopped,
    /// Sent once per loss-of-controller episode.
    ControllerUnavailable,
}

/// Receiver of the derived action stream.
///
/// Called only from the task driving the polling loop.
#[cfg_attr(test, mockall::automock)]
pub trait HostConsumer {
    /// Apply one tick's intents, in order. Called exactly once per
    /// successful tick.
    fn apply(&mut self, intents: &[ActionIntent]);

    fn notify(&mut self, notification: Notification);

    /// Replace the on-screen debug text. An empty string clears it.
    fn show_debug(&mut self, text: &str);

    /// Visual state may have changed; refresh views.
    fn request_redraw(&mut self);
}

/// Camera position and orientation.
///
/// `rotation` holds XYZ Euler angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub location: [f32; 3],
    pub rotation: [f32; 3],
}

impl Pose {
    /// Rotates a camera-local vector into world space.
    #[must_use]
    pub fn to_world(&self, local: [f32; 3]) -> [f32; 3] {
        let [x, y, z] = local;
        let (sx, cx) = self.rotation[0].sin_cos();
        let (sy, cy) = self.rotation[1].sin_cos();
        let (sz, cz) = self.rotation[2].sin_cos();

        // Rx
        let (y, z) = (y * cx - z * sx, y * sx + z * cx);
        // Ry
        let (x, z) = (x * cy + z * sy, -x * sy + z * cy);
        // Rz
        let (x, y) = (x * cz - y * sz, x * sz + y * cz);

        [x, y, z]
    }

    /// Moves and turns the pose by one tick's delta.
    ///
    /// Yaw, pitch and roll are added straight onto the Euler angles. That
    /// matches turning about the camera's local axes only while a single
    /// axis changes; combined rotations drift from a true local rotation.
    fn apply(&mut self, delta: &CameraDelta) {
        self.location[2] += delta.dolly;

        self.rotation[0] += delta.pitch;
        self.rotation[1] += delta.roll;
        self.rotation[2] += delta.yaw;

        let offset = self.to_world([delta.pan.0, 0.0, delta.pan.1]);
        for (axis, step) in self.location.iter_mut().zip(offset) {
            *axis += step;
        }
    }
}

/// One camera in the rig.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    pub pose: Pose,
    pub focal_length: u32,
}

impl Camera {
    fn new(name: String) -> Self {
        Self {
            name,
            pose: Pose::default(),
            focal_length: CameraProfile::default().focal_length(),
        }
    }
}

/// Counters for the one-shot view and render actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionCounts {
    pub camera_to_view: u32,
    pub camera_to_view_selected: u32,
    pub renders: u32,
    pub redraws: u64,
}

/// Self-contained host: a set of cameras driven by the intent stream.
#[derive(Debug, Clone, Default)]
pub struct CameraRig {
    cameras: Vec<Camera>,
    active: Option<usize>,
    profiles: ProfileBook,
    viewing_through_camera: bool,
    counts: ActionCounts,
    debug_text: String,
    controller_lost: bool,
}

impl CameraRig {
    /// Creates a rig with the given camera names. No camera is active yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_camera::host::CameraRig;
    ///
    /// let mut rig = CameraRig::new(["Camera.001", "Camera"]);
    /// assert_eq!(rig.cameras()[0].name, "Camera");
    /// assert_eq!(rig.ensure_camera().map(|c| c.name.as_str()), Some("Camera"));
    /// ```
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cameras: Vec<Camera> = names.into_iter().map(|n| Camera::new(n.into())).collect();
        cameras.sort_by(|a, b| a.name.cmp(&b.name));
        cameras.dedup_by(|a, b| a.name == b.name);

        Self {
            cameras,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    #[must_use]
    pub fn active_camera(&self) -> Option<&Camera> {
        self.active.and_then(|index| self.cameras.get(index))
    }

    #[must_use]
    pub fn active_profile(&self) -> Option<CameraProfile> {
        self.active_camera().map(|camera| self.profiles.get(&camera.name))
    }

    #[must_use]
    pub fn counts(&self) -> ActionCounts {
        self.counts
    }

    #[must_use]
    pub fn is_viewing_through_camera(&self) -> bool {
        self.viewing_through_camera
    }

    #[must_use]
    pub fn debug_text(&self) -> &str {
        &self.debug_text
    }

    /// Returns the active camera, activating the first one if none is.
    pub fn ensure_camera(&mut self) -> Option<&Camera> {
        self.ensure_index().map(|index| &self.cameras[index])
    }

    fn ensure_index(&mut self) -> Option<usize> {
        if self.cameras.is_empty() {
            return None;
        }
        Some(*self.active.get_or_insert(0))
    }

    /// Sets the active camera's focal length by hand.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` outside 1-5000 mm, or when there is no
    /// camera to adjust.
    pub fn set_focal_length(&mut self, millimetres: u32) -> Result<()> {
        if !(FOCAL_LENGTH_MIN..=FOCAL_LENGTH_MAX).contains(&millimetres) {
            return Err(PadCameraError::InvalidConfiguration(format!(
                "focal_length must be between {} and {}",
                FOCAL_LENGTH_MIN, FOCAL_LENGTH_MAX
            )));
        }
        let index = self.ensure_index().ok_or_else(|| {
            PadCameraError::InvalidConfiguration("no camera to set focal length on".to_string())
        })?;
        self.cameras[index].focal_length = millimetres;
        Ok(())
    }

    fn apply_discrete(&mut self, action: DiscreteAction) {
        match action {
            DiscreteAction::ViewCamera => {
                if self.ensure_index().is_some() {
                    self.viewing_through_camera = !self.viewing_through_camera;
                    if self.viewing_through_camera {
                        info!("Viewing through camera");
                    } else {
                        info!("Left camera view");
                    }
                } else {
                    warn!("No camera available for 'View Camera' (A button)");
                }
            }
            DiscreteAction::CameraToView => match self.ensure_index() {
                Some(_) if self.viewing_through_camera => {
                    debug!("Already viewing through camera, skipping 'Camera to View'");
                }
                Some(_) => self.counts.camera_to_view += 1,
                None => warn!("No camera available for 'Camera to View' (X button)"),
            },
            DiscreteAction::CameraToViewSelected => {
                if self.ensure_index().is_some() {
                    self.counts.camera_to_view_selected += 1;
                } else {
                    warn!("No camera available for 'Camera to View Selected' (B button)");
                }
            }
            DiscreteAction::Render => {
                if self.ensure_index().is_some() {
                    self.counts.renders += 1;
                    info!("Render requested");
                } else {
                    warn!("No camera available for rendering (Y button)");
                }
            }
            DiscreteAction::CycleCameraPrev => self.cycle_camera(-1),
            DiscreteAction::CycleCameraNext => self.cycle_camera(1),
            DiscreteAction::ProfilePrev => self.cycle_profile(-1),
            DiscreteAction::ProfileNext => self.cycle_profile(1),
        }
    }

    fn cycle_camera(&mut self, direction: i32) {
        if self.cameras.is_empty() {
            warn!("No cameras available to cycle through");
            return;
        }
        let len = self.cameras.len() as i32;
        let current = self.active.unwrap_or(0) as i32;
        let next = (current + direction).rem_euclid(len) as usize;
        self.active = Some(next);
        info!("Switched to camera: {}", self.cameras[next].name);
    }

    fn cycle_profile(&mut self, direction: i32) {
        let Some(index) = self.ensure_index() else {
            warn!("No camera available to change profile");
            return;
        };
        let camera = &mut self.cameras[index];
        let profile = self.profiles.cycle(&camera.name, direction);
        camera.focal_length = profile.focal_length();
        info!("Switched to profile: {}", profile);
    }

    fn apply_delta(&mut self, delta: &CameraDelta) {
        if delta.is_zero() {
            return;
        }
        if let Some(index) = self.ensure_index() {
            self.cameras[index].pose.apply(delta);
        }
    }
}

impl HostConsumer for CameraRig {
    fn apply(&mut self, intents: &[ActionIntent]) {
        for intent in intents {
            match intent {
                ActionIntent::Discrete(action) => self.apply_discrete(*action),
                ActionIntent::Continuous(delta) => self.apply_delta(delta),
            }
        }
    }

    fn notify(&mut self, notification: Notification) {
        match notification {
            Notification::PollingStarted => {
                self.controller_lost = false;
                info!("Controller polling started");
            }
            Notification::PollingStopped => {
                self.debug_text.clear();
                info!("Controller polling stopped");
            }
            Notification::ControllerUnavailable => {
                self.controller_lost = true;
                warn!("No controller detected");
            }
        }
    }

    fn show_debug(&mut self, text: &str) {
        if !text.is_empty() {
            debug!("Controller state:\n{}", text);
        }
        self.debug_text.clear();
        self.debug_text.push_str(text);
    }

    fn request_redraw(&mut self) {
        if self.controller_lost {
            info!("Controller connected");
            self.controller_lost = false;
        }
        self.counts.redraws += 1;
    }
}
