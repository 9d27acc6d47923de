//! Live frame pipeline linking a local capture device to a remote
//! transformation service.
//!
//! Frames are pulled from a camera on a periodic tick, encoded, sent to
//! the service one at a time, and the returned images are displayed
//! newest-first. Capture, transform, and display run at independent
//! rates; the pipeline bounds buffering by skipping ticks while a round
//! trip is outstanding and drops frames rather than stalling when one
//! fails.

pub mod camera;
pub mod config;
pub mod pipeline;
pub mod remote;

pub use camera::backend::{CameraBackend, CameraHandle};
pub use camera::error::CameraError;
pub use camera::source::CaptureSource;
pub use camera::types::{CameraDevice, DeviceId, RawImage};
pub use config::PipelineConfig;
pub use pipeline::controller::{PipelineController, SessionState};
pub use pipeline::sampler::{Frame, FrameSampler, SampleError};
pub use pipeline::sink::{ProcessedResult, RenderSink};
pub use pipeline::stats::StatsSnapshot;
pub use remote::control::{CameraInventory, CommandStatus, ControlApi, RemoteCamera};
pub use remote::error::{ControlError, TransformError};
pub use remote::transform::{HttpTransformClient, TransformClient};
