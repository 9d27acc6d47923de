use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::camera::backend::{CameraBackend, CameraHandle};
use crate::camera::error::{CameraError, Result};
use crate::camera::types::{CameraDevice, DeviceId, RawImage};

const DUMMY_DEVICE_ID: &str = "dummy:test:camera-001";
const DUMMY_DEVICE_LABEL: &str = "Dummy Test Camera";

/// A simulated camera backend for testing without real hardware.
///
/// Produces synthetic gradient frames at a fixed size. Enforces exclusive
/// ownership: a second `open` while a handle is live fails with
/// `DeviceUnavailable`, matching what a busy real device reports.
///
/// Enable via `DUMMY_CAMERA=1` environment variable.
pub struct DummyBackend {
    width: u32,
    height: u32,
    /// Set while a handle is live. Shared with the handle so that dropping
    /// the handle releases the device.
    held: Arc<AtomicBool>,
    /// Counts every successful open, for ownership assertions in tests.
    opens: Arc<AtomicU64>,
    /// When true, `read_image` reports `NoFrameAvailable` — simulates a
    /// device that is open but has not delivered its first sample.
    starved: Arc<AtomicBool>,
}

impl DummyBackend {
    /// Create a new backend producing frames of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            held: Arc::new(AtomicBool::new(false)),
            opens: Arc::new(AtomicU64::new(0)),
            starved: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the dummy camera is enabled via environment variable.
    pub fn is_enabled() -> bool {
        std::env::var("DUMMY_CAMERA").is_ok_and(|v| v == "1" || v == "true")
    }

    /// The stable device ID for the dummy camera.
    pub fn device_id() -> DeviceId {
        DeviceId::new(DUMMY_DEVICE_ID)
    }

    /// Whether a handle is currently live.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Relaxed)
    }

    /// Total number of successful opens so far.
    pub fn open_count(&self) -> u64 {
        self.opens.load(Ordering::Relaxed)
    }

    /// Simulate a device that produces no frames.
    pub fn set_starved(&self, starved: bool) {
        self.starved.store(starved, Ordering::Relaxed);
    }
}

impl CameraBackend for DummyBackend {
    fn enumerate_devices(&self) -> Result<Vec<CameraDevice>> {
        Ok(vec![CameraDevice {
            id: Self::device_id(),
            label: DUMMY_DEVICE_LABEL.to_string(),
        }])
    }

    fn open(&self, id: &DeviceId) -> Result<Box<dyn CameraHandle>> {
        if id != &Self::device_id() {
            return Err(CameraError::DeviceUnavailable(format!(
                "no such device: {id}"
            )));
        }
        if self.held.swap(true, Ordering::SeqCst) {
            return Err(CameraError::DeviceUnavailable(format!("device busy: {id}")));
        }
        self.opens.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(DummyHandle {
            id: id.clone(),
            width: self.width,
            height: self.height,
            reads: 0,
            held: Arc::clone(&self.held),
            starved: Arc::clone(&self.starved),
        }))
    }
}

/// Open handle to the dummy camera. Releases the device on drop.
struct DummyHandle {
    id: DeviceId,
    width: u32,
    height: u32,
    reads: u64,
    held: Arc<AtomicBool>,
    starved: Arc<AtomicBool>,
}

impl CameraHandle for DummyHandle {
    fn device_id(&self) -> &DeviceId {
        &self.id
    }

    fn read_image(&mut self) -> Result<RawImage> {
        if self.starved.load(Ordering::Relaxed) {
            return Err(CameraError::NoFrameAvailable);
        }
        self.reads += 1;
        Ok(RawImage {
            data: gradient_rgb(self.width, self.height, self.reads as u8),
            width: self.width,
            height: self.height,
            timestamp_us: self.reads * 33_333,
        })
    }
}

impl Drop for DummyHandle {
    fn drop(&mut self) {
        self.held.store(false, Ordering::SeqCst);
    }
}

/// Synthetic RGB gradient, varied per frame via `phase` so consecutive
/// frames differ.
fn gradient_rgb(width: u32, height: u32, phase: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x % 256) as u8);
            data.push((y % 256) as u8);
            data.push(phase);
        }
    }
    data
}
