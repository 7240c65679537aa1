//! # Polling Loop Module
//!
//! Drives the pipeline at a fixed tick rate and owns its lifecycle.
//!
//! ## States
//!
//! | State | Session | Ticks |
//! |-------|---------|-------|
//! | `Stopped` | none | ignored |
//! | `Running` | one [`PollingSession`] | poll, decode, map, forward |
//!
//! Starting allocates a fresh session (no previous sample, no pending
//! "controller unavailable" report). Stopping drops it and is idempotent.
//!
//! ## Tick
//!
//! 1. Poll the backend for the session's controller
//! 2. Unavailable: notify the host once per episode and forget the previous
//!    sample, so a reconnect is a fresh acquisition
//! 3. Sample: decode, map to intents, hand them to the host in one call,
//!    send the debug dump if enabled, request a redraw
//!
//! ## Control
//!
//! Configuration changes reach the loop as [`ControlMessage`]s rather than
//! side effects of setters. [`PollingLoop::run`] multiplexes those messages
//! with the tick timer on a single task.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::backend::DeviceBackend;
use crate::config::validate_move_speed;
use crate::controller::deadzone::Deadzone;
use crate::controller::xinput::decode;
use crate::controller::ActionMapper;
use crate::error::Result;
use crate::host::{HostConsumer, Notification};

/// Default tick period.
pub const TICK_INTERVAL: Duration = Duration::from_millis(20);

/// Lifecycle state of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Host-adjustable settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollingSettings {
    /// Camera speed, 1-100.
    pub move_speed: u32,
    pub debug_enabled: bool,
    pub controller_id: u32,
    pub deadzone: Deadzone,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            move_speed: 10,
            debug_enabled: false,
            controller_id: 0,
            deadzone: Deadzone::default(),
        }
    }
}

/// Per-run state, alive only while the loop is running.
#[derive(Debug)]
pub struct PollingSession {
    controller_id: u32,
    mapper: ActionMapper,
    no_controller_reported: bool,
}

impl PollingSession {
    fn new(controller_id: u32, deadzone: Deadzone) -> Self {
        Self {
            controller_id,
            mapper: ActionMapper::with_deadzone(deadzone),
            no_controller_reported: false,
        }
    }

    #[must_use]
    pub fn controller_id(&self) -> u32 {
        self.controller_id
    }

    #[must_use]
    pub fn mapper(&self) -> &ActionMapper {
        &self.mapper
    }

    #[must_use]
    pub fn no_controller_reported(&self) -> bool {
        self.no_controller_reported
    }
}

/// Host request delivered to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    Start,
    Stop,
    /// Start if stopped, stop if running.
    Toggle,
    SetMoveSpeed(u32),
    SetDebug(bool),
    /// Select another controller; a running session restarts fresh.
    SetControllerId(u32),
    /// Stop and leave [`PollingLoop::run`].
    Shutdown,
}

/// Whether [`PollingLoop::run`] keeps going after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The loop is stopped; nothing was polled.
    Idle,
    /// No controller this tick.
    Unavailable,
    /// Intents were forwarded; holds how many.
    Applied(usize),
}

/// Fixed-rate controller polling state machine.
///
/// Owns the backend, the host consumer and, while running, the session.
/// Dropping the loop stops it.
pub struct PollingLoop<B: DeviceBackend, C: HostConsumer> {
    backend: B,
    consumer: C,
    settings: PollingSettings,
    session: Option<PollingSession>,
}

impl<B: DeviceBackend, C: HostConsumer> std::fmt::Debug for PollingLoop<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingLoop")
            .field("settings", &self.settings)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<B: DeviceBackend, C: HostConsumer> PollingLoop<B, C> {
    /// Creates a stopped loop.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_camera::backend::DeviceBackend;
    /// use pad_camera::controller::RawSample;
    /// use pad_camera::error::Result;
    /// use pad_camera::host::CameraRig;
    /// use pad_camera::polling::{LoopState, PollingLoop, PollingSettings, TickOutcome};
    ///
    /// struct Idle;
    /// impl DeviceBackend for Idle {
    ///     fn poll(&mut self, _controller_id: u32) -> Result<RawSample> {
    ///         Ok(RawSample::default())
    ///     }
    /// }
    ///
    /// let mut polling = PollingLoop::new(Idle, CameraRig::new(["Camera"]), PollingSettings::default());
    /// assert_eq!(polling.state(), LoopState::Stopped);
    ///
    /// polling.start();
    /// assert_eq!(polling.tick(), TickOutcome::Applied(1));
    /// ```
    pub fn new(backend: B, consumer: C, settings: PollingSettings) -> Self {
        Self {
            backend,
            consumer,
            settings,
            session: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        if self.session.is_some() {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> &PollingSettings {
        &self.settings
    }

    #[must_use]
    pub fn session(&self) -> Option<&PollingSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Stopped → Running with a fresh session.
    ///
    /// Returns `false` if the loop was already running.
    pub fn start(&mut self) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.session = Some(self.fresh_session());
        info!(
            "Controller polling started (controller {})",
            self.settings.controller_id
        );
        self.consumer.notify(Notification::PollingStarted);
        true
    }

    /// Running → Stopped, releasing the session.
    ///
    /// Returns `false` if the loop was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.session.take().is_none() {
            return false;
        }
        info!("Controller polling stopped");
        if self.settings.debug_enabled {
            self.consumer.show_debug("");
        }
        self.consumer.notify(Notification::PollingStopped);
        true
    }

    fn fresh_session(&self) -> PollingSession {
        PollingSession::new(self.settings.controller_id, self.settings.deadzone)
    }

    /// Run one polling cycle.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };

        match self.backend.poll(session.controller_id) {
            Err(e) => {
                if !session.no_controller_reported {
                    warn!("Controller {} unavailable: {}", session.controller_id, e);
                    self.consumer.notify(Notification::ControllerUnavailable);
                    session.no_controller_reported = true;
                }
                session.mapper.reset();
                TickOutcome::Unavailable
            }
            Ok(raw) => {
                if session.no_controller_reported {
                    info!("Controller {} reconnected", session.controller_id);
                    session.no_controller_reported = false;
                }

                let state = decode(&raw);
                let intents = session
                    .mapper
                    .tick(state, self.settings.move_speed as f32);

                self.consumer.apply(&intents);
                if self.settings.debug_enabled {
                    self.consumer.show_debug(&state.debug_dump());
                }
                self.consumer.request_redraw();

                TickOutcome::Applied(intents.len())
            }
        }
    }

    /// Apply a control message.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an out-of-range move speed; the
    /// loop state is left unchanged.
    pub fn handle(&mut self, message: ControlMessage) -> Result<Flow> {
        debug!("Control message: {:?}", message);
        match message {
            ControlMessage::Start => {
                self.start();
            }
            ControlMessage::Stop => {
                self.stop();
            }
            ControlMessage::Toggle => {
                if !self.stop() {
                    self.start();
                }
            }
            ControlMessage::SetMoveSpeed(move_speed) => {
                validate_move_speed(move_speed)?;
                self.settings.move_speed = move_speed;
            }
            ControlMessage::SetDebug(enabled) => {
                if self.settings.debug_enabled && !enabled {
                    self.consumer.show_debug("");
                }
                self.settings.debug_enabled = enabled;
            }
            ControlMessage::SetControllerId(controller_id) => {
                self.settings.controller_id = controller_id;
                if self.session.is_some() {
                    info!("Switching to controller {}", controller_id);
                    self.session = Some(self.fresh_session());
                }
            }
            ControlMessage::Shutdown => {
                self.stop();
                return Ok(Flow::Shutdown);
            }
        }
        Ok(Flow::Continue)
    }

    /// Drive the loop until `Shutdown` or until every sender is dropped.
    ///
    /// The tick timer lives only inside this call and ticks only while the
    /// loop is running; the loop is stopped on every exit path.
    pub async fn run(&mut self, period: Duration, mut control: mpsc::Receiver<ControlMessage>) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                message = control.recv() => {
                    let Some(message) = message else {
                        debug!("Control channel closed");
                        break;
                    };
                    let was_running = self.is_running();
                    match self.handle(message) {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Shutdown) => break,
                        Err(e) => warn!("Rejected {:?}: {}", message, e),
                    }
                    if !was_running && self.is_running() {
                        // first tick one period after start
                        ticker.reset();
                    }
                }

                _ = ticker.tick(), if self.is_running() => {
                    self.tick();
                }
            }
        }

        self.stop();
    }
}

impl<B: DeviceBackend, C: HostConsumer> Drop for PollingLoop<B, C> {
    fn drop(&mut self) {
        self.stop();
    }
}
