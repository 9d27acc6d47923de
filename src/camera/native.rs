//! Native webcam backend built on `nokhwa`.
//!
//! Device IDs take the form `native:<index>`, where the index is the
//! platform camera index reported by enumeration.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::info;

use crate::camera::backend::{CameraBackend, CameraHandle};
use crate::camera::error::{CameraError, Result};
use crate::camera::types::{CameraDevice, DeviceId, RawImage};

const ID_PREFIX: &str = "native:";

/// Camera backend using the platform capture API via nokhwa.
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }

    fn parse_index(id: &DeviceId) -> Result<u32> {
        id.as_str()
            .strip_prefix(ID_PREFIX)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CameraError::DeviceUnavailable(format!("no such device: {id}")))
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for NativeBackend {
    fn enumerate_devices(&self) -> Result<Vec<CameraDevice>> {
        let cameras = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| CameraError::Enumeration(e.to_string()))?;
        Ok(cameras
            .into_iter()
            .map(|info| CameraDevice {
                id: DeviceId::new(format!("{ID_PREFIX}{}", info.index())),
                label: info.human_name(),
            })
            .collect())
    }

    fn open(&self, id: &DeviceId) -> Result<Box<dyn CameraHandle>> {
        let index = Self::parse_index(id)?;
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;
        info!("native camera stream opened: {id}");
        Ok(Box::new(NativeHandle {
            id: id.clone(),
            camera,
        }))
    }
}

/// Open native camera. The stream is stopped when the handle drops.
struct NativeHandle {
    id: DeviceId,
    camera: Camera,
}

impl CameraHandle for NativeHandle {
    fn device_id(&self) -> &DeviceId {
        &self.id
    }

    fn read_image(&mut self) -> Result<RawImage> {
        let buffer = self
            .camera
            .frame()
            .map_err(|_| CameraError::NoFrameAvailable)?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|_| CameraError::NoFrameAvailable)?;
        let (width, height) = (decoded.width(), decoded.height());
        Ok(RawImage {
            data: decoded.into_raw(),
            width,
            height,
            timestamp_us: 0,
        })
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}
