use serde::Serialize;
use std::fmt;

/// Stable camera identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new `DeviceId` from a raw string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the inner string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discovered camera device.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDevice {
    pub id: DeviceId,
    pub label: String,
}

/// One raw image read from an open device.
///
/// Pixel data is tightly packed RGB24. `timestamp_us` is the device's
/// capture timestamp in microseconds; some drivers report 0 for every
/// sample, so consumers must not rely on it for ordering.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp_us: u64,
}

impl RawImage {
    /// Whether the image carries any pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_creation_and_equality() {
        let id1 = DeviceId::new("dummy:camera-001");
        let id2 = DeviceId::new("dummy:camera-001");
        let id3 = DeviceId::new("dummy:camera-002");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn device_id_display_matches_inner() {
        let id = DeviceId::new("native:0");
        assert_eq!(id.to_string(), "native:0");
        assert_eq!(id.as_str(), "native:0");
    }

    #[test]
    fn camera_device_serialises_to_json() {
        let device = CameraDevice {
            id: DeviceId::new("test"),
            label: "Test Cam".to_string(),
        };
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["id"], "test");
        assert_eq!(json["label"], "Test Cam");
    }

    #[test]
    fn raw_image_empty_detection() {
        let empty = RawImage {
            data: vec![],
            width: 0,
            height: 0,
            timestamp_us: 0,
        };
        assert!(empty.is_empty());

        let full = RawImage {
            data: vec![0u8; 12],
            width: 2,
            height: 2,
            timestamp_us: 100,
        };
        assert!(!full.is_empty());
    }
}
