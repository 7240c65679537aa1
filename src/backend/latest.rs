//! # Latest-Sample Handoff
//!
//! Runs a backend that may block on a dedicated worker thread and hands its
//! newest sample to the polling loop through a single slot.
//!
//! The slot is a `tokio::sync::watch` channel: the worker overwrites it on
//! every read and the polling loop only ever sees the most recent value.
//! Nothing queues, so a slow consumer gets stale data rather than a growing
//! backlog.
//!
//! Each published sample is tagged with the controller id it was read for.
//! After a controller switch, samples still tagged with the old id are
//! reported as unavailable until the worker has read the new controller.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use super::DeviceBackend;
use crate::controller::RawSample;
use crate::error::{PadCameraError, Result};

/// Slot contents: the controller id a read was made for, and its result.
type Tagged = (u32, Option<RawSample>);

/// Backend adapter that polls `inner` on a worker thread.
///
/// Dropping the adapter stops and joins the worker.
pub struct LatestSampleBackend {
    latest: watch::Receiver<Tagged>,
    controller_id: Arc<AtomicU32>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for LatestSampleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestSampleBackend")
            .field("controller_id", &self.controller_id.load(Ordering::Relaxed))
            .field("running", &self.worker.is_some())
            .finish_non_exhaustive()
    }
}

impl LatestSampleBackend {
    /// Spawn a worker polling `inner` every `interval` for `controller_id`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the worker thread cannot be spawned.
    pub fn spawn<B>(mut inner: B, controller_id: u32, interval: Duration) -> Result<Self>
    where
        B: DeviceBackend + 'static,
    {
        let (tx, rx) = watch::channel((controller_id, None));
        let shared_id = Arc::new(AtomicU32::new(controller_id));
        let stop = Arc::new(AtomicBool::new(false));

        let worker_id = Arc::clone(&shared_id);
        let worker_stop = Arc::clone(&stop);

        let worker = std::thread::Builder::new()
            .name("pad-camera-backend".to_string())
            .spawn(move || {
                info!("Backend worker started");
                while !worker_stop.load(Ordering::Acquire) {
                    let id = worker_id.load(Ordering::Acquire);
                    let sample = match inner.poll(id) {
                        Ok(sample) => Some(sample),
                        Err(e) => {
                            debug!("Backend worker poll failed: {}", e);
                            None
                        }
                    };
                    tx.send_replace((id, sample));
                    std::thread::sleep(interval);
                }
                info!("Backend worker stopped");
            })?;

        Ok(Self {
            latest: rx,
            controller_id: shared_id,
            stop,
            worker: Some(worker),
        })
    }

    /// Stop the worker and wait for it to exit. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                debug!("Backend worker panicked");
            }
        }
    }
}

impl DeviceBackend for LatestSampleBackend {
    fn poll(&mut self, controller_id: u32) -> Result<RawSample> {
        let previous = self.controller_id.swap(controller_id, Ordering::AcqRel);
        if previous != controller_id {
            debug!("Backend worker switching to controller {}", controller_id);
        }

        if self.worker.is_none() {
            return Err(PadCameraError::DeviceUnavailable(
                "Backend worker stopped".to_string(),
            ));
        }

        let (read_for, sample) = *self.latest.borrow_and_update();
        if read_for != controller_id {
            return Err(PadCameraError::DeviceUnavailable(format!(
                "Waiting for controller {}",
                controller_id
            )));
        }

        sample.ok_or_else(|| PadCameraError::DeviceUnavailable("No controller detected".to_string()))
    }
}

impl Drop for LatestSampleBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}
