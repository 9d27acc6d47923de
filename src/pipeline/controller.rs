use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::camera::backend::CameraBackend;
use crate::camera::error::CameraError;
use crate::camera::source::CaptureSource;
use crate::camera::types::DeviceId;
use crate::config::PipelineConfig;
use crate::pipeline::sampler::{Frame, FrameSampler, SampleError};
use crate::pipeline::sink::RenderSink;
use crate::pipeline::stats::{PipelineStats, StatsSnapshot};
use crate::remote::transform::TransformClient;

/// Pipeline session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingSource,
    Running,
    Stopped,
    Failed,
}

/// Drives the tick loop and owns the session state machine.
///
/// The controller is the only component with scheduling authority: it is
/// the sole caller of the capture source's and sink's lifecycle methods,
/// and it enforces single-flight on the transform client — when a round
/// trip is still outstanding, the tick is skipped rather than queued.
///
/// Sequence numbers are scoped to one session: `start` resets the counter
/// and bumps a session generation, so a round trip still in flight from a
/// previous session resolves against a stale generation and its result is
/// discarded instead of reaching the sink.
pub struct PipelineController {
    source: CaptureSource,
    sampler: FrameSampler,
    client: Arc<dyn TransformClient>,
    sink: Arc<RenderSink>,
    stats: Arc<Mutex<PipelineStats>>,
    state: SessionState,
    next_sequence: u64,
    generation: Arc<AtomicU64>,
    in_flight: Arc<AtomicBool>,
}

impl PipelineController {
    /// Create an idle controller over the given backend and transform
    /// client.
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        client: Arc<dyn TransformClient>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            source: CaptureSource::new(backend),
            sampler: FrameSampler::new(config.jpeg_quality, config.transmit_max_width),
            client,
            sink: Arc::new(RenderSink::new()),
            stats: Arc::new(Mutex::new(PipelineStats::new())),
            state: SessionState::Idle,
            next_sequence: 0,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Connect the named device and begin a new session.
    ///
    /// Any prior session is torn down first: starting while `Running`
    /// behaves like a device switch, releasing the device and clearing the
    /// display so the new session's sequence numbering begins against an
    /// empty sink. On `DeviceUnavailable` the session moves to `Failed`
    /// and no device handle is retained.
    pub fn start(&mut self, device_id: &DeviceId) -> Result<(), CameraError> {
        self.stop();
        self.state = SessionState::AwaitingSource;
        match self.source.connect(device_id) {
            Ok(()) => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                self.next_sequence = 0;
                *self.stats.lock() = PipelineStats::new();
                self.state = SessionState::Running;
                info!("pipeline session started on {device_id}");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                warn!("pipeline start failed: {e}");
                Err(e)
            }
        }
    }

    /// Stop the session: release the device, then clear the display.
    ///
    /// Both steps run unconditionally and are idempotent, so repeated or
    /// overlapping stops never leak the device handle. A transform round
    /// trip still in flight is allowed to complete; the generation bump
    /// routes its result away from the sink.
    pub fn stop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.source.disconnect();
        self.sink.clear();
        if matches!(
            self.state,
            SessionState::Running | SessionState::AwaitingSource
        ) {
            info!("pipeline session stopped");
            self.state = SessionState::Stopped;
        }
    }

    /// Re-select the capture device: stop, then start with the new one.
    /// The disconnect is never skipped, even when the new connect fails.
    pub fn switch_device(&mut self, device_id: &DeviceId) -> Result<(), CameraError> {
        self.stop();
        self.start(device_id)
    }

    /// One iteration of the scheduling cycle. Only meaningful while
    /// `Running`; issues at most one non-blocking transform request and
    /// returns.
    pub fn tick(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        if self.in_flight.load(Ordering::Acquire) {
            // Single-flight: the outstanding round trip is the backpressure
            self.stats.lock().record_skip();
            return;
        }

        let sequence = self.next_sequence + 1;
        let frame = match self.sampler.sample(&mut self.source, sequence) {
            Ok(frame) => frame,
            Err(SampleError::Camera(CameraError::NoFrameAvailable)) => {
                self.stats.lock().record_skip();
                return;
            }
            Err(SampleError::Camera(e @ CameraError::DeviceUnavailable(_))) => {
                warn!("capture device lost mid-session: {e}");
                self.source.disconnect();
                self.state = SessionState::Failed;
                return;
            }
            Err(SampleError::Camera(e)) => {
                warn!("capture read failed: {e}");
                self.stats.lock().record_skip();
                return;
            }
            Err(e @ SampleError::EncodingFailed(_)) => {
                warn!("dropping frame {sequence}: {e}");
                self.stats.lock().record_encoding_failure();
                return;
            }
        };

        self.next_sequence = sequence;
        self.stats.lock().record_sample();
        self.in_flight.store(true, Ordering::Release);
        self.spawn_round_trip(frame);
    }

    /// Send one frame to the transform service on a background task and
    /// route the response to the sink when it still belongs to the current
    /// session.
    fn spawn_round_trip(&self, frame: Frame) {
        let client = Arc::clone(&self.client);
        let sink = Arc::clone(&self.sink);
        let stats = Arc::clone(&self.stats);
        let in_flight = Arc::clone(&self.in_flight);
        let generation = Arc::clone(&self.generation);
        let started_generation = generation.load(Ordering::SeqCst);
        let sequence = frame.sequence;
        let captured_at = frame.captured_at;

        tokio::spawn(async move {
            match client.send(frame).await {
                Ok(result) => {
                    if generation.load(Ordering::SeqCst) != started_generation {
                        debug!("discarding result seq={sequence}: session is gone");
                        stats.lock().record_stale();
                    } else if sink.accept(result) {
                        stats.lock().record_displayed(captured_at.elapsed());
                    } else {
                        stats.lock().record_stale();
                    }
                }
                Err(e) => {
                    // One dropped frame; the next tick is the retry
                    warn!("transform failed for seq={sequence}: {e}");
                    stats.lock().record_failure();
                }
            }
            in_flight.store(false, Ordering::Release);
        });
    }

    /// Drive ticks off a periodic timer until the session leaves `Running`
    /// or `shutdown` fires. Missed ticks are skipped, not bunched.
    pub async fn run(
        &mut self,
        tick_interval: Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        let mut ticker = interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.state != SessionState::Running {
                        break;
                    }
                    self.tick();
                }
                _ = shutdown.changed() => {
                    self.stop();
                    break;
                }
            }
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a transform round trip is outstanding right now.
    pub fn has_request_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Whether a capture device handle is currently held.
    pub fn holds_device(&self) -> bool {
        self.source.is_connected()
    }

    /// The render sink this session displays through.
    pub fn sink(&self) -> Arc<RenderSink> {
        Arc::clone(&self.sink)
    }

    /// Snapshot of session statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.lock().snapshot()
    }
}
