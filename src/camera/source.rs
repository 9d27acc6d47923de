use std::sync::Arc;

use tracing::{debug, info};

use crate::camera::backend::{CameraBackend, CameraHandle};
use crate::camera::error::{CameraError, Result};
use crate::camera::types::{DeviceId, RawImage};

/// Owns the handle to the selected capture device.
///
/// At most one handle is held between a successful `connect` and the
/// matching `disconnect`. Connecting while already connected releases the
/// old handle first, so switching devices can never hold two at once.
pub struct CaptureSource {
    backend: Arc<dyn CameraBackend>,
    handle: Option<Box<dyn CameraHandle>>,
}

impl CaptureSource {
    /// Create a disconnected source over the given backend.
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            backend,
            handle: None,
        }
    }

    /// Acquire exclusive access to the named device.
    ///
    /// Any previously held handle is released before the new open is
    /// attempted. On failure no handle is retained.
    pub fn connect(&mut self, id: &DeviceId) -> Result<()> {
        self.disconnect();
        let handle = self.backend.open(id)?;
        info!("capture device connected: {id}");
        self.handle = Some(handle);
        Ok(())
    }

    /// Read the most recent raw image from the connected device.
    ///
    /// Returns `NoFrameAvailable` when the device has not produced one yet,
    /// and `DeviceUnavailable` when no device is connected at all.
    pub fn current_image(&mut self) -> Result<RawImage> {
        match self.handle.as_mut() {
            Some(handle) => handle.read_image(),
            None => Err(CameraError::DeviceUnavailable(
                "no device connected".to_string(),
            )),
        }
    }

    /// Release the device. Idempotent — a no-op when already disconnected.
    pub fn disconnect(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("capture device disconnected: {}", handle.device_id());
        }
    }

    /// Whether a device handle is currently held.
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// The ID of the connected device, if any.
    pub fn connected_device(&self) -> Option<DeviceId> {
        self.handle.as_ref().map(|h| h.device_id().clone())
    }
}
