use thiserror::Error;

/// Camera subsystem errors.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The device could not be opened: not found, busy, or permission denied.
    /// Fatal to the pipeline session.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device is open but has not delivered an image yet. Callers treat
    /// this as "skip this tick", not as a failure.
    #[error("no frame available from device")]
    NoFrameAvailable,

    #[error("device enumeration failed: {0}")]
    Enumeration(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CameraError>;
