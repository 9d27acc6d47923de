use crate::camera::error::Result;
use crate::camera::types::{CameraDevice, DeviceId, RawImage};

/// Platform-agnostic camera backend trait.
///
/// Implemented per-platform (nokhwa behind the `native` feature, a simulated
/// backend for tests). Provides device enumeration and exclusive opening.
pub trait CameraBackend: Send + Sync {
    /// Enumerate all currently connected camera devices.
    fn enumerate_devices(&self) -> Result<Vec<CameraDevice>>;

    /// Open a device for exclusive capture.
    ///
    /// Returns `DeviceUnavailable` if the device is unknown, busy, or access
    /// is denied. The returned handle owns the device until dropped.
    fn open(&self, id: &DeviceId) -> Result<Box<dyn CameraHandle>>;
}

/// An exclusively held, open capture device.
///
/// Dropping the handle releases the device.
pub trait CameraHandle: Send {
    /// The device this handle was opened for.
    fn device_id(&self) -> &DeviceId;

    /// Read the most recent image from the device.
    ///
    /// Returns `NoFrameAvailable` until the device has delivered its first
    /// sample.
    fn read_image(&mut self) -> Result<RawImage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::error::CameraError;

    /// Mock backend for testing trait contract.
    struct MockBackend {
        devices: Vec<CameraDevice>,
    }

    struct MockHandle {
        id: DeviceId,
    }

    impl CameraHandle for MockHandle {
        fn device_id(&self) -> &DeviceId {
            &self.id
        }

        fn read_image(&mut self) -> Result<RawImage> {
            Err(CameraError::NoFrameAvailable)
        }
    }

    impl CameraBackend for MockBackend {
        fn enumerate_devices(&self) -> Result<Vec<CameraDevice>> {
            Ok(self.devices.clone())
        }

        fn open(&self, id: &DeviceId) -> Result<Box<dyn CameraHandle>> {
            if self.devices.iter().any(|d| &d.id == id) {
                Ok(Box::new(MockHandle { id: id.clone() }))
            } else {
                Err(CameraError::DeviceUnavailable(id.to_string()))
            }
        }
    }

    #[test]
    fn mock_backend_enumerate_returns_devices() {
        let backend = MockBackend {
            devices: vec![CameraDevice {
                id: DeviceId::new("test:id"),
                label: "Test Camera".to_string(),
            }],
        };

        let devices = backend.enumerate_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].label, "Test Camera");
    }

    #[test]
    fn mock_backend_open_unknown_device_fails() {
        let backend = MockBackend { devices: vec![] };
        let result = backend.open(&DeviceId::new("unknown"));
        assert!(matches!(result, Err(CameraError::DeviceUnavailable(_))));
    }

    #[test]
    fn mock_handle_reports_device_id() {
        let backend = MockBackend {
            devices: vec![CameraDevice {
                id: DeviceId::new("test:id"),
                label: "Test Camera".to_string(),
            }],
        };
        let handle = backend.open(&DeviceId::new("test:id")).unwrap();
        assert_eq!(handle.device_id().as_str(), "test:id");
    }

    #[test]
    fn trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn CameraBackend>>();
    }
}
