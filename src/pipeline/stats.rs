use serde::Serialize;
use std::time::{Duration, Instant};

/// Collects statistics for one pipeline session.
pub struct PipelineStats {
    frames_sampled: u64,
    ticks_skipped: u64,
    encoding_failures: u64,
    transform_failures: u64,
    stale_discards: u64,
    results_displayed: u64,
    start_time: Instant,
    last_round_trip: Option<Duration>,
}

/// Snapshot of pipeline stats for serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub frames_sampled: u64,
    pub ticks_skipped: u64,
    pub encoding_failures: u64,
    pub transform_failures: u64,
    pub stale_discards: u64,
    pub results_displayed: u64,
    pub display_fps: f64,
    pub round_trip_ms: Option<f64>,
}

impl PipelineStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            frames_sampled: 0,
            ticks_skipped: 0,
            encoding_failures: 0,
            transform_failures: 0,
            stale_discards: 0,
            results_displayed: 0,
            start_time: Instant::now(),
            last_round_trip: None,
        }
    }

    /// Record a frame sampled and handed to the transform client.
    pub fn record_sample(&mut self) {
        self.frames_sampled += 1;
    }

    /// Record a tick skipped because a request was still in flight or the
    /// device had no frame yet.
    pub fn record_skip(&mut self) {
        self.ticks_skipped += 1;
    }

    /// Record a frame dropped because it could not be encoded.
    pub fn record_encoding_failure(&mut self) {
        self.encoding_failures += 1;
    }

    /// Record a failed transform round trip.
    pub fn record_failure(&mut self) {
        self.transform_failures += 1;
    }

    /// Record a result discarded as stale by the sink or by a session
    /// generation mismatch.
    pub fn record_stale(&mut self) {
        self.stale_discards += 1;
    }

    /// Record a result installed for display, with its round-trip latency.
    pub fn record_displayed(&mut self, round_trip: Duration) {
        self.results_displayed += 1;
        self.last_round_trip = Some(round_trip);
    }

    /// Displayed results per second since the session started.
    pub fn display_fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.results_displayed as f64 / elapsed
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_sampled: self.frames_sampled,
            ticks_skipped: self.ticks_skipped,
            encoding_failures: self.encoding_failures,
            transform_failures: self.transform_failures,
            stale_discards: self.stale_discards,
            results_displayed: self.results_displayed,
            display_fps: self.display_fps(),
            round_trip_ms: self.last_round_trip.map(|d| d.as_secs_f64() * 1000.0),
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialises_with_zero_values() {
        let stats = PipelineStats::new();
        let snap = stats.snapshot();
        assert_eq!(snap.frames_sampled, 0);
        assert_eq!(snap.ticks_skipped, 0);
        assert_eq!(snap.encoding_failures, 0);
        assert_eq!(snap.transform_failures, 0);
        assert_eq!(snap.results_displayed, 0);
        assert!(snap.round_trip_ms.is_none());
    }

    #[test]
    fn counters_increment() {
        let mut stats = PipelineStats::new();
        stats.record_sample();
        stats.record_sample();
        stats.record_skip();
        stats.record_encoding_failure();
        stats.record_failure();
        stats.record_stale();
        stats.record_displayed(Duration::from_millis(42));

        let snap = stats.snapshot();
        assert_eq!(snap.frames_sampled, 2);
        assert_eq!(snap.ticks_skipped, 1);
        assert_eq!(snap.encoding_failures, 1);
        assert_eq!(snap.transform_failures, 1);
        assert_eq!(snap.stale_discards, 1);
        assert_eq!(snap.results_displayed, 1);
        assert!((snap.round_trip_ms.unwrap() - 42.0).abs() < 1.0);
    }

    #[test]
    fn display_fps_is_positive_after_displays() {
        let mut stats = PipelineStats::new();
        for _ in 0..10 {
            stats.record_displayed(Duration::from_millis(5));
        }
        std::thread::sleep(Duration::from_millis(20));
        assert!(stats.display_fps() > 0.0);
    }

    #[test]
    fn snapshot_serialises_to_camel_case() {
        let stats = PipelineStats::new();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert!(json["framesSampled"].is_number());
        assert!(json["ticksSkipped"].is_number());
        assert!(json["encodingFailures"].is_number());
        assert!(json["staleDiscards"].is_number());
        assert!(json["roundTripMs"].is_null());
    }
}
