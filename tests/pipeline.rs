//! End-to-end pipeline tests: raw XInput reports in, camera rig state out.

use std::collections::VecDeque;
use std::time::Duration;

use pad_camera::backend::DeviceBackend;
use pad_camera::controller::xinput::REPORT_SIZE;
use pad_camera::controller::RawSample;
use pad_camera::error::{PadCameraError, Result};
use pad_camera::host::CameraRig;
use pad_camera::polling::{ControlMessage, PollingLoop, PollingSettings, TickOutcome};
use pad_camera::profile::CameraProfile;
use tokio::sync::mpsc;

const DPAD_UP: u16 = 0x0001;
const DPAD_RIGHT: u16 = 0x0008;
const A: u16 = 0x1000;
const Y: u16 = 0x8000;

#[derive(Default, Clone, Copy)]
struct Report {
    buttons: u16,
    left_trigger: u8,
    right_trigger: u8,
    thumbs: [i16; 4],
}

impl Report {
    fn buttons(buttons: u16) -> Self {
        Self {
            buttons,
            ..Self::default()
        }
    }

    fn to_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(REPORT_SIZE);
        bytes.extend_from_slice(&self.buttons.to_le_bytes());
        bytes.push(self.left_trigger);
        bytes.push(self.right_trigger);
        for thumb in self.thumbs {
            bytes.extend_from_slice(&thumb.to_le_bytes());
        }
        bytes
    }
}

/// Parses scripted wire reports; `None` or an empty script is an unplugged pad.
struct WireScript {
    reports: VecDeque<Option<Vec<u8>>>,
}

impl WireScript {
    fn new(reports: Vec<Option<Report>>) -> Self {
        Self {
            reports: reports
                .into_iter()
                .map(|report| report.map(Report::to_bytes))
                .collect(),
        }
    }
}

impl DeviceBackend for WireScript {
    fn poll(&mut self, _controller_id: u32) -> Result<RawSample> {
        match self.reports.pop_front().flatten() {
            Some(bytes) => RawSample::parse(&bytes),
            None => Err(PadCameraError::DeviceUnavailable("unplugged".to_string())),
        }
    }
}

fn pipeline(reports: Vec<Option<Report>>) -> PollingLoop<WireScript, CameraRig> {
    PollingLoop::new(
        WireScript::new(reports),
        CameraRig::new(["Camera.001", "Camera"]),
        PollingSettings::default(),
    )
}

#[test]
fn test_buttons_drive_camera_rig() {
    let mut polling = pipeline(vec![
        Some(Report::default()),
        Some(Report::buttons(A)),
        Some(Report {
            buttons: A,
            right_trigger: 255,
            ..Report::default()
        }),
        Some(Report::buttons(DPAD_RIGHT)),
        Some(Report::buttons(DPAD_RIGHT | DPAD_UP)),
    ]);
    polling.start();

    assert_eq!(polling.tick(), TickOutcome::Applied(1));
    assert!(polling.consumer().active_camera().is_none());

    assert_eq!(polling.tick(), TickOutcome::Applied(2));
    assert!(polling.consumer().is_viewing_through_camera());
    assert_eq!(polling.consumer().active_camera().unwrap().name, "Camera");

    // held A does not fire again; full right trigger dollies +0.5
    assert_eq!(polling.tick(), TickOutcome::Applied(1));
    let z = polling.consumer().active_camera().unwrap().pose.location[2];
    assert!((z - 0.5).abs() < 1e-5);

    polling.tick();
    assert_eq!(polling.consumer().active_camera().unwrap().name, "Camera.001");

    polling.tick();
    assert_eq!(polling.consumer().active_profile(), Some(CameraProfile::Cinema));
    assert_eq!(polling.consumer().active_camera().unwrap().focal_length, 35);

    assert_eq!(polling.consumer().counts().redraws, 5);
}

#[test]
fn test_sticks_outside_deadzone_rotate() {
    let mut polling = pipeline(vec![Some(Report {
        // LX inside the deadzone, RX outside
        thumbs: [4000, 0, 20000, 0],
        ..Report::default()
    })]);
    polling.start();
    polling.tick();

    let rig = polling.consumer();
    let pose = rig.active_camera().unwrap().pose;
    assert!((pose.rotation[2] + 0.003_051_76).abs() < 1e-6);
    assert_eq!(pose.location, [0.0, 0.0, 0.0]);
}

#[test]
fn test_reconnect_with_button_held_is_silent() {
    let mut polling = pipeline(vec![
        Some(Report::default()),
        Some(Report::buttons(Y)),
        None,
        None,
        Some(Report::buttons(Y)),
    ]);
    polling.start();
    for _ in 0..5 {
        polling.tick();
    }
    assert_eq!(polling.consumer().counts().renders, 1);
    assert_eq!(polling.consumer().counts().redraws, 3);
}

#[test]
fn test_short_report_is_unavailable() {
    struct Truncated;

    impl DeviceBackend for Truncated {
        fn poll(&mut self, _controller_id: u32) -> Result<RawSample> {
            RawSample::parse(&[0u8; REPORT_SIZE - 1])
        }
    }

    let mut polling = PollingLoop::new(Truncated, CameraRig::new(["Camera"]), PollingSettings::default());
    polling.start();
    assert_eq!(polling.tick(), TickOutcome::Unavailable);
    assert_eq!(polling.consumer().counts().redraws, 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_with_live_speed_change() {
    let reports = std::iter::once(Some(Report::default()))
        .chain(std::iter::repeat(Some(Report {
            right_trigger: 255,
            ..Report::default()
        })))
        .take(50)
        .collect();
    let mut polling = pipeline(reports);
    let (tx, rx) = mpsc::channel(8);

    let driver = async {
        polling.run(Duration::from_millis(20), rx).await;
    };
    let script = async {
        tx.send(ControlMessage::SetMoveSpeed(100)).await.unwrap();
        tx.send(ControlMessage::Start).await.unwrap();
        tokio::time::sleep(Duration::from_millis(70)).await;
        tx.send(ControlMessage::Shutdown).await.unwrap();
    };
    tokio::join!(driver, script);

    assert!(!polling.is_running());
    assert_eq!(polling.settings().move_speed, 100);

    // every tick after the first dollies 5.0 at full speed
    let ticks = polling.consumer().counts().redraws;
    assert!(ticks >= 2);
    let z = polling.consumer().active_camera().unwrap().pose.location[2];
    assert!((z - 5.0 * (ticks - 1) as f32).abs() < 1e-3);
}
